//! Instruction payload encoders.
//!
//! Layouts are little-endian, strings carry a one byte length prefix and every
//! payload starts with the receiving program's discriminator.

use solana_sdk::pubkey::Pubkey;

use crate::constants::{
    ADD_LIQUIDITY_DISCRIMINATOR, CREATE_KYC_RECORD_DISCRIMINATOR, CREATE_POOL_DISCRIMINATOR,
    CREATE_TOKEN_DISCRIMINATOR, INITIALIZE_KYC_SYSTEM_DISCRIMINATOR, MAX_TOKEN_NAME_LEN,
    MAX_TOKEN_SYMBOL_LEN, PRICE_SCALE, SWAP_DISCRIMINATOR, UPDATE_KYC_STATUS_DISCRIMINATOR,
};
use crate::error::{Result, SdkError};
use crate::params::{
    AddLiquidityParams, CreateKycRecordParams, CreateTokenParams, SwapParams,
    UpdateKycStatusParams,
};

/// Longest prefix of `value` that fits in `max_len` bytes without splitting a character.
pub fn truncate_utf8(value: &str, max_len: usize) -> &str {
    if value.len() <= max_len {
        return value;
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

fn push_string(data: &mut Vec<u8>, value: &str, max_len: usize) {
    let value = truncate_utf8(value, max_len.min(u8::MAX as usize));
    data.push(value.len() as u8);
    data.extend_from_slice(value.as_bytes());
}

/// `hook_program` is the program registered for `params.hook_type`, or `None`.
pub fn encode_create_token(params: &CreateTokenParams, hook_program: Option<&Pubkey>) -> Vec<u8> {
    let mut data = CREATE_TOKEN_DISCRIMINATOR.to_vec();

    push_string(&mut data, &params.name, MAX_TOKEN_NAME_LEN);
    push_string(&mut data, &params.symbol, MAX_TOKEN_SYMBOL_LEN);
    data.push(params.decimals);
    match hook_program {
        Some(program) => data.extend_from_slice(program.as_ref()),
        None => data.extend_from_slice(&[0u8; 32]),
    }
    data.extend_from_slice(&params.total_supply.to_le_bytes());

    data
}

/// Decoded create-token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTokenData {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub hook_program: Option<Pubkey>,
    pub total_supply: u64,
}

pub fn decode_create_token(data: &[u8]) -> Result<CreateTokenData> {
    let body = data
        .strip_prefix(&CREATE_TOKEN_DISCRIMINATOR[..])
        .ok_or_else(|| SdkError::Decode("not a create-token instruction".into()))?;
    let mut reader = ByteReader::new(body);
    let decoded = reader.read_token_fields()?;
    reader.finish()?;
    Ok(decoded)
}

/// Converts a decimal price into the amm's 9 decimal fixed point.
pub fn scale_price(price: f64) -> Result<u64> {
    let scaled = (price * PRICE_SCALE).round();
    if !scaled.is_finite() || scaled < 1.0 || scaled > u64::MAX as f64 {
        return Err(SdkError::InvalidParameter(format!(
            "price {price} is out of range"
        )));
    }
    Ok(scaled as u64)
}

pub fn encode_create_pool(scaled_price: u64) -> Vec<u8> {
    let mut data = CREATE_POOL_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&scaled_price.to_le_bytes());
    data
}

pub fn encode_swap(params: &SwapParams) -> Vec<u8> {
    let mut data = SWAP_DISCRIMINATOR.to_vec();

    data.extend_from_slice(&params.amount_in.to_le_bytes());
    data.extend_from_slice(&params.minimum_amount_out.to_le_bytes());
    data.push(params.a_to_b as u8);

    data
}

pub fn encode_add_liquidity(params: &AddLiquidityParams) -> Vec<u8> {
    let mut data = ADD_LIQUIDITY_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&params.amount_a.to_le_bytes());
    data.extend_from_slice(&params.amount_b.to_le_bytes());
    data
}

pub fn encode_initialize_kyc_system() -> Vec<u8> {
    INITIALIZE_KYC_SYSTEM_DISCRIMINATOR.to_vec()
}

pub fn encode_create_kyc_record(params: &CreateKycRecordParams) -> Vec<u8> {
    let mut data = CREATE_KYC_RECORD_DISCRIMINATOR.to_vec();
    data.push(params.kyc_level);
    data
}

pub fn encode_update_kyc_status(params: &UpdateKycStatusParams) -> Vec<u8> {
    let mut data = UPDATE_KYC_STATUS_DISCRIMINATOR.to_vec();
    data.push(params.is_verified as u8);
    data.push(params.kyc_level);
    data
}

/// Cursor over little-endian fields; running out of bytes is a decode error.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.data.len());
        let Some(end) = end else {
            return Err(SdkError::Decode(format!(
                "needed {len} bytes at offset {}, {} remain",
                self.offset,
                self.data.len() - self.offset
            )));
        };
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    pub(crate) fn read_pubkey(&mut self) -> Result<Pubkey> {
        self.take_array().map(Pubkey::new_from_array)
    }

    /// Zeroed key means "none"
    pub(crate) fn read_optional_pubkey(&mut self) -> Result<Option<Pubkey>> {
        let key = self.read_pubkey()?;
        Ok((key != Pubkey::default()).then_some(key))
    }

    pub(crate) fn read_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| SdkError::Decode(e.to_string()))
    }

    /// The create-token field sequence, shared with the token info record.
    pub(crate) fn read_token_fields(&mut self) -> Result<CreateTokenData> {
        Ok(CreateTokenData {
            name: self.read_string()?,
            symbol: self.read_string()?,
            decimals: self.read_u8()?,
            hook_program: self.read_optional_pubkey()?,
            total_supply: self.read_u64()?,
        })
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if self.offset != self.data.len() {
            return Err(SdkError::Decode(format!(
                "{} trailing bytes",
                self.data.len() - self.offset
            )));
        }
        Ok(())
    }
}
