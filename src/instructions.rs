use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::{system_program, sysvar};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use crate::account_metas::{
    AmmAddLiquidity, AmmCreatePool, AmmSwap, KycCreateRecord, KycInitializeSystem,
    KycUpdateStatus, TokenLayerCreateToken,
};
use crate::config::{ProgramName, ProgramRegistry};
use crate::encoding;
use crate::error::Result;
use crate::params::{
    AddLiquidityParams, CreateKycRecordParams, CreateTokenParams, HookType, PoolCreateParams,
    SwapParams, UpdateKycStatusParams,
};
use crate::pda;

/// Builds one instruction per HookSwap operation.
///
/// Builders validate parameters, derive addresses and encode payloads. Nothing
/// here touches the network.
#[derive(Debug, Clone)]
pub struct InstructionBuilder {
    programs: ProgramRegistry,
}

impl InstructionBuilder {
    pub fn new(programs: ProgramRegistry) -> Self {
        Self { programs }
    }

    pub fn programs(&self) -> &ProgramRegistry {
        &self.programs
    }

    /// Program enforcing the given hook, `None` for plain tokens
    pub fn hook_program(&self, hook_type: HookType) -> Result<Option<Pubkey>> {
        match hook_type {
            HookType::None => Ok(None),
            HookType::Kyc => self.programs.resolve(ProgramName::KycHook).map(Some),
            HookType::Whitelist => self.programs.resolve(ProgramName::WhitelistHook).map(Some),
        }
    }

    /// Create a Token-2022 mint with an optional transfer hook
    ///
    /// # Arguments
    /// * `params` - Token metadata and supply
    /// * `mint` - Address of the fresh mint keypair, which must co-sign
    /// * `payer` - Fee payer and mint authority
    pub fn create_token(
        &self,
        params: &CreateTokenParams,
        mint: &Pubkey,
        payer: &Pubkey,
    ) -> Result<Instruction> {
        params.validate()?;
        let program_id = self.programs.resolve(ProgramName::TokenLayer)?;
        let hook_program = self.hook_program(params.hook_type)?;
        let (token_info, _) = pda::token_info(&program_id, mint)?;

        let data = encoding::encode_create_token(params, hook_program.as_ref());
        log::debug!("create_token data: {}", hex::encode(&data));

        Ok(Instruction {
            program_id,
            accounts: TokenLayerCreateToken {
                token_info,
                mint: *mint,
                payer: *payer,
                system_program: system_program::ID,
                token_program: spl_token_2022::ID,
                rent: sysvar::rent::ID,
            }
            .into(),
            data,
        })
    }

    /// Create a pool for the ordered pair `(token_a, token_b)`
    pub fn create_pool(&self, params: &PoolCreateParams, payer: &Pubkey) -> Result<Instruction> {
        params.validate()?;
        let program_id = self.programs.resolve(ProgramName::Amm)?;
        let (pool, _) = pda::pool(&program_id, &params.token_a, &params.token_b)?;
        let (amm_config, _) = pda::amm_config(&program_id)?;

        let data = encoding::encode_create_pool(encoding::scale_price(params.initial_price)?);

        Ok(Instruction {
            program_id,
            accounts: AmmCreatePool {
                pool,
                amm_config,
                token_mint_a: params.token_a,
                token_mint_b: params.token_b,
                payer: *payer,
                system_program: system_program::ID,
            }
            .into(),
            data,
        })
    }

    pub fn swap(&self, params: &SwapParams, user: &Pubkey) -> Result<Instruction> {
        params.validate()?;
        let program_id = self.programs.resolve(ProgramName::Amm)?;
        let vaults = PairAccounts::derive(&program_id, &params.token_a, &params.token_b, user)?;

        Ok(Instruction {
            program_id,
            accounts: AmmSwap {
                pool: vaults.pool,
                token_mint_a: params.token_a,
                token_mint_b: params.token_b,
                user_token_account_a: vaults.user_a,
                user_token_account_b: vaults.user_b,
                pool_token_account_a: vaults.pool_a,
                pool_token_account_b: vaults.pool_b,
                user: *user,
                token_program: spl_token_2022::ID,
            }
            .into(),
            data: encoding::encode_swap(params),
        })
    }

    pub fn add_liquidity(&self, params: &AddLiquidityParams, user: &Pubkey) -> Result<Instruction> {
        params.validate()?;
        let program_id = self.programs.resolve(ProgramName::Amm)?;
        let vaults = PairAccounts::derive(&program_id, &params.token_a, &params.token_b, user)?;

        Ok(Instruction {
            program_id,
            accounts: AmmAddLiquidity {
                pool: vaults.pool,
                token_mint_a: params.token_a,
                token_mint_b: params.token_b,
                user_token_account_a: vaults.user_a,
                user_token_account_b: vaults.user_b,
                pool_token_account_a: vaults.pool_a,
                pool_token_account_b: vaults.pool_b,
                user: *user,
                token_program: spl_token_2022::ID,
            }
            .into(),
            data: encoding::encode_add_liquidity(params),
        })
    }

    /// Idempotent creation of `owner`'s Token-2022 accounts for `mints`
    pub fn create_user_token_accounts(
        &self,
        payer: &Pubkey,
        owner: &Pubkey,
        mints: &[Pubkey],
    ) -> Vec<Instruction> {
        mints
            .iter()
            .map(|mint| {
                create_associated_token_account_idempotent(payer, owner, mint, &spl_token_2022::ID)
            })
            .collect()
    }

    pub fn initialize_kyc_system(&self, authority: &Pubkey) -> Result<Instruction> {
        let program_id = self.programs.resolve(ProgramName::KycHook)?;
        let (kyc_system, _) = pda::kyc_system(&program_id)?;

        Ok(Instruction {
            program_id,
            accounts: KycInitializeSystem {
                kyc_system,
                authority: *authority,
                system_program: system_program::ID,
            }
            .into(),
            data: encoding::encode_initialize_kyc_system(),
        })
    }

    pub fn create_kyc_record(
        &self,
        params: &CreateKycRecordParams,
        authority: &Pubkey,
    ) -> Result<Instruction> {
        let program_id = self.programs.resolve(ProgramName::KycHook)?;
        let (kyc_system, _) = pda::kyc_system(&program_id)?;
        let (kyc_record, _) = pda::kyc_record(&program_id, &params.user)?;

        Ok(Instruction {
            program_id,
            accounts: KycCreateRecord {
                kyc_record,
                kyc_system,
                user: params.user,
                authority: *authority,
                system_program: system_program::ID,
            }
            .into(),
            data: encoding::encode_create_kyc_record(params),
        })
    }

    pub fn update_kyc_status(
        &self,
        params: &UpdateKycStatusParams,
        authority: &Pubkey,
    ) -> Result<Instruction> {
        let program_id = self.programs.resolve(ProgramName::KycHook)?;
        let (kyc_system, _) = pda::kyc_system(&program_id)?;
        let (kyc_record, _) = pda::kyc_record(&program_id, &params.user)?;

        Ok(Instruction {
            program_id,
            accounts: KycUpdateStatus {
                kyc_record,
                kyc_system,
                authority: *authority,
            }
            .into(),
            data: encoding::encode_update_kyc_status(params),
        })
    }
}

/// Pool address plus the four token accounts a swap or deposit moves funds between
struct PairAccounts {
    pool: Pubkey,
    user_a: Pubkey,
    user_b: Pubkey,
    pool_a: Pubkey,
    pool_b: Pubkey,
}

impl PairAccounts {
    fn derive(amm: &Pubkey, mint_a: &Pubkey, mint_b: &Pubkey, user: &Pubkey) -> Result<Self> {
        let token_program = spl_token_2022::ID;
        let (pool, _) = pda::pool(amm, mint_a, mint_b)?;

        Ok(Self {
            pool,
            user_a: pda::associated_token_account(user, mint_a, &token_program)?,
            user_b: pda::associated_token_account(user, mint_b, &token_program)?,
            pool_a: pda::associated_token_account(&pool, mint_a, &token_program)?,
            pool_b: pda::associated_token_account(&pool, mint_b, &token_program)?,
        })
    }
}
