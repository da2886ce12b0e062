//! Program derived addresses used by the HookSwap programs.
//!
//! Every helper funnels into [`derive`], which runs the ledger's own bump search
//! (255 down to 0, first off-curve hash wins) so the client and the programs agree
//! on addresses byte for byte.

use solana_sdk::pubkey::{MAX_SEED_LEN, MAX_SEEDS, Pubkey};

use crate::constants::{
    AMM_CONFIG_SEED, EXTRA_ACCOUNT_METAS_SEED, HOOK_REGISTRY_SEED, KYC_RECORD_SEED,
    KYC_SYSTEM_SEED, POOL_SEED, TOKEN_INFO_SEED, WHITELIST_SEED,
};
use crate::error::{Result, SdkError};

/// Derive `(address, bump)` for `seeds` under `program_id`.
///
/// # Errors
/// * `InvalidSeeds` when there are more than 15 seeds or one is longer than 32 bytes
/// * `AddressSpaceExhausted` when no bump yields an off-curve address
pub fn derive(program_id: &Pubkey, seeds: &[&[u8]]) -> Result<(Pubkey, u8)> {
    // the bump occupies the last seed slot
    if seeds.len() >= MAX_SEEDS {
        return Err(SdkError::InvalidSeeds(format!(
            "{} seeds given, at most {} allowed",
            seeds.len(),
            MAX_SEEDS - 1
        )));
    }
    if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(SdkError::InvalidSeeds(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    Pubkey::try_find_program_address(seeds, program_id).ok_or(SdkError::AddressSpaceExhausted {
        program_id: *program_id,
    })
}

/// Per-mint metadata record kept by the token layer
pub fn token_info(token_layer: &Pubkey, mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(token_layer, &[TOKEN_INFO_SEED, mint.as_ref()])
}

pub fn amm_config(amm: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(amm, &[AMM_CONFIG_SEED])
}

/// Pool for an ordered pair. `(a, b)` and `(b, a)` are different pools.
pub fn pool(amm: &Pubkey, mint_a: &Pubkey, mint_b: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(amm, &[POOL_SEED, mint_a.as_ref(), mint_b.as_ref()])
}

pub fn kyc_system(kyc_hook: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(kyc_hook, &[KYC_SYSTEM_SEED])
}

pub fn kyc_record(kyc_hook: &Pubkey, user: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(kyc_hook, &[KYC_RECORD_SEED, user.as_ref()])
}

pub fn hook_registry(registry_program: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(registry_program, &[HOOK_REGISTRY_SEED])
}

pub fn whitelist(whitelist_hook: &Pubkey, mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(whitelist_hook, &[WHITELIST_SEED, mint.as_ref()])
}

/// Validation account a transfer hook program reads its extra metas from
pub fn extra_account_metas(hook_program: &Pubkey, mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(hook_program, &[EXTRA_ACCOUNT_METAS_SEED, mint.as_ref()])
}

/// Associated token account. Works for off-curve owners such as pool addresses.
pub fn associated_token_account(
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Result<Pubkey> {
    derive(
        &spl_associated_token_account::ID,
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
    )
    .map(|(address, _)| address)
}
