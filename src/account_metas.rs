// Account lists in the exact order each program reads them

use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

pub(crate) struct TokenLayerCreateToken {
    pub token_info: Pubkey,
    pub mint: Pubkey,
    pub payer: Pubkey,
    pub system_program: Pubkey,
    pub token_program: Pubkey,
    pub rent: Pubkey,
}

impl From<TokenLayerCreateToken> for Vec<AccountMeta> {
    fn from(accounts: TokenLayerCreateToken) -> Self {
        vec![
            AccountMeta::new(accounts.token_info, false),
            AccountMeta::new(accounts.mint, true),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new_readonly(accounts.system_program, false),
            AccountMeta::new_readonly(accounts.token_program, false),
            AccountMeta::new_readonly(accounts.rent, false),
        ]
    }
}

pub(crate) struct AmmCreatePool {
    pub pool: Pubkey,
    pub amm_config: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub payer: Pubkey,
    pub system_program: Pubkey,
}

impl From<AmmCreatePool> for Vec<AccountMeta> {
    fn from(accounts: AmmCreatePool) -> Self {
        vec![
            AccountMeta::new(accounts.pool, false),
            AccountMeta::new(accounts.amm_config, false),
            AccountMeta::new_readonly(accounts.token_mint_a, false),
            AccountMeta::new_readonly(accounts.token_mint_b, false),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new_readonly(accounts.system_program, false),
        ]
    }
}

pub(crate) struct AmmSwap {
    pub pool: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub user_token_account_a: Pubkey,
    pub user_token_account_b: Pubkey,
    pub pool_token_account_a: Pubkey,
    pub pool_token_account_b: Pubkey,
    pub user: Pubkey,
    pub token_program: Pubkey,
}

impl From<AmmSwap> for Vec<AccountMeta> {
    fn from(accounts: AmmSwap) -> Self {
        vec![
            AccountMeta::new(accounts.pool, false),
            AccountMeta::new_readonly(accounts.token_mint_a, false),
            AccountMeta::new_readonly(accounts.token_mint_b, false),
            AccountMeta::new(accounts.user_token_account_a, false),
            AccountMeta::new(accounts.user_token_account_b, false),
            AccountMeta::new(accounts.pool_token_account_a, false),
            AccountMeta::new(accounts.pool_token_account_b, false),
            AccountMeta::new_readonly(accounts.user, true),
            AccountMeta::new_readonly(accounts.token_program, false),
        ]
    }
}

pub(crate) struct AmmAddLiquidity {
    pub pool: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub user_token_account_a: Pubkey,
    pub user_token_account_b: Pubkey,
    pub pool_token_account_a: Pubkey,
    pub pool_token_account_b: Pubkey,
    pub user: Pubkey,
    pub token_program: Pubkey,
}

impl From<AmmAddLiquidity> for Vec<AccountMeta> {
    fn from(accounts: AmmAddLiquidity) -> Self {
        vec![
            AccountMeta::new(accounts.pool, false),
            AccountMeta::new_readonly(accounts.token_mint_a, false),
            AccountMeta::new_readonly(accounts.token_mint_b, false),
            AccountMeta::new(accounts.user_token_account_a, false),
            AccountMeta::new(accounts.user_token_account_b, false),
            AccountMeta::new(accounts.pool_token_account_a, false),
            AccountMeta::new(accounts.pool_token_account_b, false),
            AccountMeta::new(accounts.user, true),
            AccountMeta::new_readonly(accounts.token_program, false),
        ]
    }
}

pub(crate) struct KycInitializeSystem {
    pub kyc_system: Pubkey,
    pub authority: Pubkey,
    pub system_program: Pubkey,
}

impl From<KycInitializeSystem> for Vec<AccountMeta> {
    fn from(accounts: KycInitializeSystem) -> Self {
        vec![
            AccountMeta::new(accounts.kyc_system, false),
            AccountMeta::new(accounts.authority, true),
            AccountMeta::new_readonly(accounts.system_program, false),
        ]
    }
}

pub(crate) struct KycCreateRecord {
    pub kyc_record: Pubkey,
    pub kyc_system: Pubkey,
    pub user: Pubkey,
    pub authority: Pubkey,
    pub system_program: Pubkey,
}

impl From<KycCreateRecord> for Vec<AccountMeta> {
    fn from(accounts: KycCreateRecord) -> Self {
        vec![
            AccountMeta::new(accounts.kyc_record, false),
            AccountMeta::new(accounts.kyc_system, false),
            AccountMeta::new_readonly(accounts.user, false),
            AccountMeta::new(accounts.authority, true),
            AccountMeta::new_readonly(accounts.system_program, false),
        ]
    }
}

pub(crate) struct KycUpdateStatus {
    pub kyc_record: Pubkey,
    pub kyc_system: Pubkey,
    pub authority: Pubkey,
}

impl From<KycUpdateStatus> for Vec<AccountMeta> {
    fn from(accounts: KycUpdateStatus) -> Self {
        vec![
            AccountMeta::new(accounts.kyc_record, false),
            AccountMeta::new_readonly(accounts.kyc_system, false),
            AccountMeta::new_readonly(accounts.authority, true),
        ]
    }
}
