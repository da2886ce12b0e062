mod common;

use assert_matches::assert_matches;
use common::*;
use hookswap_sdk::{
    ComplianceRecord, HookClassification, KeypairWallet, PoolDescriptor, SdkError, TokenBalance,
    TokenInfoRecord, WatchOnlyWallet, pda,
};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

fn kyc_record(user: Pubkey, is_verified: bool) -> ComplianceRecord {
    ComplianceRecord {
        user,
        is_verified,
        kyc_level: 1,
        verified_at: 1_700_000_000,
        updated_at: 1_700_000_000,
        transfer_count: 0,
    }
}

#[tokio::test]
async fn never_created_record_is_not_found() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, WatchOnlyWallet::new(Pubkey::new_unique()));
    let user = Pubkey::new_unique();

    assert_eq!(sdk.get_kyc_record(&user).await.unwrap(), None);
    assert!(!sdk.check_compliance_status(&user).await.unwrap());
}

#[tokio::test]
async fn undersized_record_is_malformed() {
    let user = Pubkey::new_unique();
    let (address, _) = pda::kyc_record(&KYC_HOOK, &user).unwrap();
    let rpc = MockRpc::new().with(|state| {
        let data = kyc_record(user, true).to_account_data().unwrap();
        state
            .accounts
            .insert(address, owned_account(KYC_HOOK, data[..40].to_vec()));
    });
    let sdk = sdk(&rpc, WatchOnlyWallet::new(Pubkey::new_unique()));

    assert_matches!(
        sdk.get_kyc_record(&user).await,
        Err(SdkError::MalformedAccount { expected: 66, actual: 40, address: a }) if a == address
    );
    assert_matches!(
        sdk.check_compliance_status(&user).await,
        Err(SdkError::MalformedAccount { .. })
    );
}

#[tokio::test]
async fn compliance_status_follows_verified_flag() {
    let verified = Pubkey::new_unique();
    let pending = Pubkey::new_unique();
    let rpc = MockRpc::new().with(|state| {
        for (user, flag) in [(verified, true), (pending, false)] {
            let (address, _) = pda::kyc_record(&KYC_HOOK, &user).unwrap();
            let data = kyc_record(user, flag).to_account_data().unwrap();
            state.accounts.insert(address, owned_account(KYC_HOOK, data));
        }
    });
    let sdk = sdk(&rpc, WatchOnlyWallet::new(Pubkey::new_unique()));

    assert!(sdk.check_compliance_status(&verified).await.unwrap());
    assert!(!sdk.check_compliance_status(&pending).await.unwrap());
    assert_eq!(
        sdk.get_kyc_record(&verified).await.unwrap(),
        Some(kyc_record(verified, true))
    );
}

#[tokio::test]
async fn balance_reads_are_idempotent() {
    let wallet = Pubkey::new_unique();
    let rpc = MockRpc::new().with(|state| {
        state.balances.insert(wallet, 2_500_000_000);
    });
    let sdk = sdk(&rpc, WatchOnlyWallet::new(wallet));

    let first = sdk.get_balance(&wallet).await.unwrap();
    let second = sdk.get_balance(&wallet).await.unwrap();
    assert_eq!(first, 2_500_000_000);
    assert_eq!(first, second);
    assert_eq!(rpc.state.lock().unwrap().balance_queries, 2);
    assert_eq!(sdk.get_balance(&Pubkey::new_unique()).await.unwrap(), 0);
}

#[tokio::test]
async fn pool_is_absent_until_created() {
    let token_a = Pubkey::new_unique();
    let token_b = Pubkey::new_unique();
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, WatchOnlyWallet::new(Pubkey::new_unique()));
    assert_eq!(sdk.get_pool(&token_a, &token_b).await.unwrap(), None);

    let (address, _) = pda::pool(&AMM, &token_a, &token_b).unwrap();
    let pool = PoolDescriptor {
        address,
        token_a,
        token_b,
        reserve_a: 10_000,
        reserve_b: 25_000,
        fee_rate_bps: 30,
    };
    rpc.with(|state| {
        state
            .accounts
            .insert(address, owned_account(AMM, pool.to_account_data().unwrap()));
    });

    assert_eq!(sdk.get_pool(&token_a, &token_b).await.unwrap(), Some(pool));
    // pair order is part of the address
    assert_eq!(sdk.get_pool(&token_b, &token_a).await.unwrap(), None);
}

#[tokio::test]
async fn token_accounts_are_classified_by_hook() {
    let owner = Keypair::new();
    let kyc_mint = Pubkey::new_unique();
    let whitelist_mint = Pubkey::new_unique();
    let foreign_hook_mint = Pubkey::new_unique();
    let foreign_hook = Pubkey::new_unique();
    let legacy_mint = Pubkey::new_unique();

    let rpc = MockRpc::new().with(|state| {
        state.accounts.insert(kyc_mint, token_2022_mint(6, Some(KYC_HOOK)));
        state
            .accounts
            .insert(whitelist_mint, token_2022_mint(9, Some(WHITELIST_HOOK)));
        state
            .accounts
            .insert(foreign_hook_mint, token_2022_mint(9, Some(foreign_hook)));

        let (info_address, _) = pda::token_info(&TOKEN_LAYER, &kyc_mint).unwrap();
        let mut info = TokenInfoRecord {
            mint: kyc_mint,
            authority: Pubkey::new_unique(),
            name: "Compliant Dollar".into(),
            symbol: "CUSD".into(),
            decimals: 6,
            hook_program: Some(KYC_HOOK),
            total_supply: 1_000_000_000,
            is_verified: true,
        }
        .to_account_data();
        info.resize(500, 0);
        state
            .accounts
            .insert(info_address, owned_account(TOKEN_LAYER, info));

        let balance = |mint: Pubkey, amount: u64, decimals: u8, token_program: Pubkey| {
            TokenBalance {
                address: Pubkey::new_unique(),
                mint,
                amount,
                decimals,
                token_program,
            }
        };
        state.token_balances = vec![
            balance(legacy_mint, 5, 0, spl_token::ID),
            balance(kyc_mint, 1_500_000, 6, spl_token_2022::ID),
            balance(whitelist_mint, 7, 9, spl_token_2022::ID),
            balance(foreign_hook_mint, 0, 9, spl_token_2022::ID),
        ];
    });
    let sdk = sdk(&rpc, KeypairWallet::new(owner));

    let tokens = sdk.get_user_token_accounts().await.unwrap();
    assert_eq!(tokens.len(), 4);

    let by_mint = |mint: Pubkey| tokens.iter().find(|t| t.mint == mint).unwrap();

    let kyc = by_mint(kyc_mint);
    assert_eq!(kyc.hook, HookClassification::Kyc);
    assert_eq!(kyc.symbol, "CUSD");
    assert_eq!(kyc.name, "Compliant Dollar");
    assert!(kyc.is_verified);
    assert_eq!(kyc.ui_amount(), Decimal::new(15, 1));

    let whitelisted = by_mint(whitelist_mint);
    assert_eq!(whitelisted.hook, HookClassification::Whitelist);
    assert_eq!(whitelisted.symbol, "UNKNOWN");
    assert_eq!(whitelisted.name, "Unknown Token");
    assert!(!whitelisted.is_verified);

    assert_eq!(
        by_mint(foreign_hook_mint).hook,
        HookClassification::Unknown(foreign_hook)
    );
    let legacy = by_mint(legacy_mint);
    assert_eq!(legacy.hook, HookClassification::None);
    assert_eq!(legacy.token_program, spl_token::ID);
}

#[tokio::test]
async fn owner_without_tokens_gets_empty_list() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    assert!(sdk.get_user_token_accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn plain_token_2022_mint_has_no_hook() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let mint = Pubkey::new_unique();

    assert_eq!(
        sdk.reader().classify_hook(&mint, &token_2022_mint(6, None)),
        HookClassification::None
    );
}
