use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

pub const SOL_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");
pub const SOL_SYMBOL: &str = "SOL";
pub const SOL_NAME: &str = "Solana";
pub const SOL_DECIMALS: u8 = 9;

pub const UNKNOWN_TOKEN_SYMBOL: &str = "UNKNOWN";
pub const UNKNOWN_TOKEN_NAME: &str = "Unknown Token";

// SEEDS
pub const TOKEN_INFO_SEED: &[u8] = b"token_info";
pub const AMM_CONFIG_SEED: &[u8] = b"amm_config";
pub const POOL_SEED: &[u8] = b"pool";
pub const KYC_SYSTEM_SEED: &[u8] = b"kyc_system";
pub const KYC_RECORD_SEED: &[u8] = b"kyc_record";
pub const HOOK_REGISTRY_SEED: &[u8] = b"hook_registry";
pub const WHITELIST_SEED: &[u8] = b"whitelist";
pub const EXTRA_ACCOUNT_METAS_SEED: &[u8] = b"extra-account-metas";

// DISCRIMINATORS
// token layer and kyc hook use single byte tags, the amm is an anchor program
pub const CREATE_TOKEN_DISCRIMINATOR: [u8; 1] = [0x01];
pub const CREATE_POOL_DISCRIMINATOR: [u8; 8] = [233, 146, 209, 142, 207, 104, 64, 188];
pub const SWAP_DISCRIMINATOR: [u8; 8] = [248, 198, 158, 145, 225, 117, 135, 200];
pub const ADD_LIQUIDITY_DISCRIMINATOR: [u8; 8] = [181, 157, 89, 67, 143, 182, 52, 72];
pub const INITIALIZE_KYC_SYSTEM_DISCRIMINATOR: [u8; 1] = [0x20];
pub const CREATE_KYC_RECORD_DISCRIMINATOR: [u8; 1] = [0x21];
pub const UPDATE_KYC_STATUS_DISCRIMINATOR: [u8; 1] = [0x22];

// FIELD BUDGETS
pub const MAX_TOKEN_NAME_LEN: usize = 50;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 10;

/// Prices are sent to the amm as fixed point with 9 decimals
pub const PRICE_SCALE: f64 = 1_000_000_000.0;

// COMPUTE BUDGETS
pub const CREATE_TOKEN_COMPUTE_UNITS: u32 = 200_000;
pub const CREATE_TOKEN_COMPUTE_UNIT_PRICE: u64 = 1;
pub const CREATE_POOL_COMPUTE_UNITS: u32 = 200_000;
pub const SWAP_COMPUTE_UNITS: u32 = 300_000;
pub const ADD_LIQUIDITY_COMPUTE_UNITS: u32 = 300_000;
pub const KYC_COMPUTE_UNITS: u32 = 100_000;

/// Flat signature fee used for cost estimates
pub const BASE_FEE_LAMPORTS: u64 = 5_000;
pub const MINT_ACCOUNT_SIZE: usize = 82;
pub const TOKEN_ACCOUNT_SIZE: usize = 165;
pub const TOKEN_INFO_ACCOUNT_SIZE: usize = 500;
