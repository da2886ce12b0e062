//! Fixed layouts of the program-owned accounts the client reads.
//!
//! Every account starts with an 8 byte discriminator region that is skipped.
//! Data shorter than a layout's minimum is reported as `MalformedAccount`.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::encoding::{self, ByteReader};
use crate::error::{Result, SdkError};
use crate::params::{CreateTokenParams, HookType};

const DISCRIMINATOR_LEN: usize = 8;

fn body<'a>(address: &Pubkey, data: &'a [u8], min_len: usize) -> Result<&'a [u8]> {
    if data.len() < min_len {
        return Err(SdkError::MalformedAccount {
            address: *address,
            expected: min_len,
            actual: data.len(),
        });
    }
    Ok(&data[DISCRIMINATOR_LEN..])
}

fn deserialize<T: BorshDeserialize>(address: &Pubkey, mut body: &[u8]) -> Result<T> {
    T::deserialize(&mut body).map_err(|e| SdkError::InvalidAccountData {
        address: *address,
        reason: e.to_string(),
    })
}

fn with_discriminator(discriminator: [u8; 8], layout: &impl BorshSerialize) -> Result<Vec<u8>> {
    let mut data = discriminator.to_vec();
    borsh::to_writer(&mut data, layout)
        .map_err(|e| SdkError::InvalidParameter(format!("cannot serialize account layout: {e}")))?;
    Ok(data)
}

#[derive(BorshSerialize, BorshDeserialize)]
struct KycRecordLayout {
    user: [u8; 32],
    is_verified: u8,
    kyc_level: u8,
    verified_at: i64,
    updated_at: i64,
    transfer_count: u64,
}

/// Per-user KYC state kept by the kyc hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRecord {
    pub user: Pubkey,
    pub is_verified: bool,
    pub kyc_level: u8,
    pub verified_at: i64,
    pub updated_at: i64,
    pub transfer_count: u64,
}

impl ComplianceRecord {
    pub const DISCRIMINATOR: [u8; 8] = [60, 42, 41, 19, 198, 74, 18, 101];
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 1 + 1 + 8 + 8 + 8;

    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self> {
        let layout: KycRecordLayout = deserialize(address, body(address, data, Self::LEN)?)?;
        Ok(Self {
            user: Pubkey::new_from_array(layout.user),
            is_verified: layout.is_verified == 1,
            kyc_level: layout.kyc_level,
            verified_at: layout.verified_at,
            updated_at: layout.updated_at,
            transfer_count: layout.transfer_count,
        })
    }

    pub fn to_account_data(&self) -> Result<Vec<u8>> {
        with_discriminator(
            Self::DISCRIMINATOR,
            &KycRecordLayout {
                user: self.user.to_bytes(),
                is_verified: self.is_verified as u8,
                kyc_level: self.kyc_level,
                verified_at: self.verified_at,
                updated_at: self.updated_at,
                transfer_count: self.transfer_count,
            },
        )
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct WhitelistRecordLayout {
    mint: [u8; 32],
    authority: [u8; 32],
    is_active: u8,
    entry_count: u32,
    updated_at: i64,
}

/// Per-mint whitelist kept by the whitelist hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistRecord {
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub is_active: bool,
    pub entry_count: u32,
    pub updated_at: i64,
}

impl WhitelistRecord {
    pub const DISCRIMINATOR: [u8; 8] = [212, 112, 61, 182, 76, 232, 45, 46];
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 32 + 1 + 4 + 8;

    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self> {
        let layout: WhitelistRecordLayout = deserialize(address, body(address, data, Self::LEN)?)?;
        Ok(Self {
            mint: Pubkey::new_from_array(layout.mint),
            authority: Pubkey::new_from_array(layout.authority),
            is_active: layout.is_active == 1,
            entry_count: layout.entry_count,
            updated_at: layout.updated_at,
        })
    }

    pub fn to_account_data(&self) -> Result<Vec<u8>> {
        with_discriminator(
            Self::DISCRIMINATOR,
            &WhitelistRecordLayout {
                mint: self.mint.to_bytes(),
                authority: self.authority.to_bytes(),
                is_active: self.is_active as u8,
                entry_count: self.entry_count,
                updated_at: self.updated_at,
            },
        )
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
struct PoolLayout {
    token_a_mint: [u8; 32],
    token_b_mint: [u8; 32],
    reserve_a: u64,
    reserve_b: u64,
    fee_rate_bps: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDescriptor {
    pub address: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub fee_rate_bps: u16,
}

impl PoolDescriptor {
    pub const DISCRIMINATOR: [u8; 8] = [241, 154, 109, 4, 17, 177, 109, 188];
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 32 + 8 + 8 + 2;

    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self> {
        let layout: PoolLayout = deserialize(address, body(address, data, Self::LEN)?)?;
        Ok(Self {
            address: *address,
            token_a: Pubkey::new_from_array(layout.token_a_mint),
            token_b: Pubkey::new_from_array(layout.token_b_mint),
            reserve_a: layout.reserve_a,
            reserve_b: layout.reserve_b,
            fee_rate_bps: layout.fee_rate_bps,
        })
    }

    pub fn to_account_data(&self) -> Result<Vec<u8>> {
        with_discriminator(
            Self::DISCRIMINATOR,
            &PoolLayout {
                token_a_mint: self.token_a.to_bytes(),
                token_b_mint: self.token_b.to_bytes(),
                reserve_a: self.reserve_a,
                reserve_b: self.reserve_b,
                fee_rate_bps: self.fee_rate_bps,
            },
        )
    }

    /// Spot price of token_a in token_b, ignoring decimals
    pub fn spot_price(&self) -> Option<f64> {
        (self.reserve_a > 0).then(|| self.reserve_b as f64 / self.reserve_a as f64)
    }
}

/// Metadata the token layer stores next to every mint it created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfoRecord {
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub hook_program: Option<Pubkey>,
    pub total_supply: u64,
    pub is_verified: bool,
}

impl TokenInfoRecord {
    pub const DISCRIMINATOR: [u8; 8] = [109, 162, 52, 125, 77, 166, 37, 202];
    /// Both strings empty
    pub const MIN_LEN: usize = DISCRIMINATOR_LEN + 32 + 32 + 1 + 1 + 1 + 32 + 8 + 1;

    pub fn decode(address: &Pubkey, data: &[u8]) -> Result<Self> {
        let body = body(address, data, Self::MIN_LEN)?;
        let invalid = |e: SdkError| SdkError::InvalidAccountData {
            address: *address,
            reason: e.to_string(),
        };

        let mut reader = ByteReader::new(body);
        let mint = reader.read_pubkey().map_err(invalid)?;
        let authority = reader.read_pubkey().map_err(invalid)?;
        let fields = reader.read_token_fields().map_err(invalid)?;
        let is_verified = reader.read_u8().map_err(invalid)? == 1;

        Ok(Self {
            mint,
            authority,
            name: fields.name,
            symbol: fields.symbol,
            decimals: fields.decimals,
            hook_program: fields.hook_program,
            total_supply: fields.total_supply,
            is_verified,
        })
    }

    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        data.extend_from_slice(self.mint.as_ref());
        data.extend_from_slice(self.authority.as_ref());

        let params = CreateTokenParams {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            total_supply: self.total_supply,
            hook_type: HookType::None,
        };
        let fields = encoding::encode_create_token(&params, self.hook_program.as_ref());
        // same field sequence as the create-token payload, minus its tag
        data.extend_from_slice(&fields[1..]);
        data.push(self.is_verified as u8);
        data
    }
}
