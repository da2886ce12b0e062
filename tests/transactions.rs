mod common;

use std::io::ErrorKind;
use std::time::Duration;

use assert_matches::assert_matches;
use common::*;
use hookswap_sdk::{
    CreateTokenParams, Disconnected, HookType, KeypairWallet, MAX_CONSECUTIVE_POLL_FAILURES,
    PoolCreateParams, RetryPolicy,
    SdkError, SignatureState, SimulationOutcome, SubmitPolicy, SwapParams, WatchOnlyWallet,
};
use solana_sdk::compute_budget;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::system_instruction;
use solana_sdk::transaction::TransactionError;

fn token_params() -> CreateTokenParams {
    CreateTokenParams {
        name: "Test Token".into(),
        symbol: "TEST".into(),
        decimals: 9,
        total_supply: 1_000_000_000,
        hook_type: HookType::Kyc,
    }
}

fn fast() -> SubmitPolicy {
    SubmitPolicy::default().with_poll_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn create_token_is_signed_by_wallet_and_fresh_mint() {
    let rpc = MockRpc::new();
    let payer = Keypair::new();
    let payer_key = payer.pubkey();
    let sdk = sdk(&rpc, KeypairWallet::new(payer));

    let created = sdk.create_token(&token_params()).await.unwrap();

    let sent = rpc.sent();
    assert_eq!(sent.len(), 1);
    let tx = &sent[0];
    assert_eq!(tx.message.account_keys[0], payer_key);
    assert!(tx.message.account_keys.contains(&created.mint));
    assert_eq!(tx.signatures.len(), 2);
    assert!(tx.is_signed());
    assert!(tx.verify().is_ok());
    assert_eq!(tx.signatures[0], created.signature);

    // compute limit and price, then the token layer instruction
    assert_eq!(tx.message.instructions.len(), 3);
    let program_of = |index: usize| {
        tx.message.account_keys[tx.message.instructions[index].program_id_index as usize]
    };
    assert_eq!(program_of(0), compute_budget::id());
    assert_eq!(program_of(1), compute_budget::id());
    assert_eq!(program_of(2), TOKEN_LAYER);
    assert_eq!(rpc.state.lock().unwrap().simulations, 1);
}

#[tokio::test]
async fn every_create_token_uses_a_new_mint() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));

    let first = sdk.create_token(&token_params()).await.unwrap();
    let second = sdk.create_token(&token_params()).await.unwrap();
    assert_ne!(first.mint, second.mint);
}

#[tokio::test]
async fn invalid_token_params_never_reach_the_network() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));

    let mut params = token_params();
    params.symbol = "TOOLONGSYMB".into();
    let err = sdk.create_token(&params).await.unwrap_err();
    assert_matches!(err, SdkError::TokenCreation(_));
    assert_matches!(err.root_cause(), SdkError::InvalidParameter(_));
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn aged_anchor_is_expired_not_failed() {
    let rpc = MockRpc::new().with(|state| {
        state.status = None;
        state.block_height = 100;
        state.last_valid_block_height = 110;
        state.block_height_step = 5;
    });
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let ix = system_instruction::transfer(&sdk.wallet_address().unwrap(), &Pubkey::new_unique(), 1);

    let err = sdk
        .orchestrator()
        .submit(&[ix], &[], &fast())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        SdkError::TransactionExpired { last_valid_block_height: 110, .. }
    );
    assert!(err.is_outcome_unknown());
    assert_eq!(rpc.sent().len(), 1);
}

#[tokio::test]
async fn late_landing_found_in_history_is_confirmed() {
    let rpc = MockRpc::new().with(|state| {
        state.status = None;
        state.history_status = Some(confirmed());
        state.block_height = 200;
        state.last_valid_block_height = 150;
    });
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let ix = system_instruction::transfer(&sdk.wallet_address().unwrap(), &Pubkey::new_unique(), 1);

    let signature = sdk.orchestrator().submit(&[ix], &[], &fast()).await.unwrap();
    assert_eq!(rpc.sent()[0].signatures[0], signature);
}

#[tokio::test]
async fn ledger_rejection_is_failed() {
    let rpc = MockRpc::new().with(|state| {
        state.status = Some(SignatureState {
            confirmed: false,
            slot: 43,
            err: Some(TransactionError::InstructionError(2, InstructionError::Custom(6001))),
        });
    });
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));

    let err = sdk
        .execute_swap(&SwapParams {
            token_a: Pubkey::new_unique(),
            token_b: Pubkey::new_unique(),
            amount_in: 1_000,
            minimum_amount_out: 900,
            a_to_b: true,
        })
        .await
        .unwrap_err();
    assert_matches!(err, SdkError::Swap(_));
    assert_matches!(
        err.root_cause(),
        SdkError::TransactionFailed { signature: Some(_), .. }
    );
    assert!(!err.is_outcome_unknown());
}

#[tokio::test]
async fn confirmation_timeout_stops_watching() {
    let rpc = MockRpc::new().with(|state| state.status = None);
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let ix = system_instruction::transfer(&sdk.wallet_address().unwrap(), &Pubkey::new_unique(), 1);

    let policy = fast().with_confirmation_timeout(Duration::from_millis(20));
    let err = sdk.orchestrator().submit(&[ix], &[], &policy).await.unwrap_err();
    assert_matches!(err, SdkError::ConfirmationTimedOut { .. });
}

fn failing_simulation() -> SimulationOutcome {
    SimulationOutcome {
        err: Some(TransactionError::InstructionError(0, InstructionError::Custom(6000))),
        logs: vec!["Program log: pool already exists".into()],
        units_consumed: Some(4_200),
    }
}

#[tokio::test]
async fn simulation_failure_aborts_by_default() {
    let rpc = MockRpc::new().with(|state| state.simulation = failing_simulation());
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));

    let err = sdk
        .create_pool(&PoolCreateParams {
            token_a: Pubkey::new_unique(),
            token_b: Pubkey::new_unique(),
            initial_price: 1.5,
        })
        .await
        .unwrap_err();
    assert_matches!(err, SdkError::PoolCreation(_));
    assert_matches!(
        err.root_cause(),
        SdkError::SimulationFailed { logs, units_consumed: Some(4_200), .. } if logs.len() == 1
    );
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn simulation_failure_can_be_overridden() {
    let rpc = MockRpc::new().with(|state| state.simulation = failing_simulation());
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let instructions = sdk
        .create_pool_ix(&PoolCreateParams {
            token_a: Pubkey::new_unique(),
            token_b: Pubkey::new_unique(),
            initial_price: 1.5,
        })
        .unwrap();

    let policy = fast().allow_simulation_failure();
    sdk.orchestrator()
        .submit(&instructions, &[], &policy)
        .await
        .unwrap();
    assert_eq!(rpc.sent().len(), 1);
}

#[tokio::test]
async fn no_wallet_is_wallet_not_ready() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, Disconnected);

    assert_matches!(
        sdk.get_user_token_accounts().await,
        Err(SdkError::WalletNotReady(_))
    );
    let err = sdk.create_token(&token_params()).await.unwrap_err();
    assert_matches!(err.root_cause(), SdkError::WalletNotReady(_));
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn watch_only_wallet_cannot_submit() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, WatchOnlyWallet::new(Pubkey::new_unique()));

    let err = sdk.create_token(&token_params()).await.unwrap_err();
    assert_matches!(err.root_cause(), SdkError::WalletNotReady(_));
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn swap_prepends_idempotent_token_accounts() {
    let rpc = MockRpc::new();
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let params = SwapParams {
        token_a: Pubkey::new_unique(),
        token_b: Pubkey::new_unique(),
        amount_in: 1_000,
        minimum_amount_out: 990,
        a_to_b: false,
    };

    let instructions = sdk.swap_ix(&params).unwrap();
    assert_eq!(instructions.len(), 3);
    assert_eq!(instructions[0].program_id, spl_associated_token_account::ID);
    assert_eq!(instructions[1].program_id, spl_associated_token_account::ID);
    assert_eq!(instructions[2].program_id, AMM);

    sdk.execute_swap(&params).await.unwrap();
    // compute limit + two account creations + swap
    assert_eq!(rpc.sent()[0].message.instructions.len(), 4);
}

#[tokio::test]
async fn transport_failure_is_retried_for_token_creation() {
    let rpc = MockRpc::new().with(|state| {
        state.send_error = Some(transport_error(ErrorKind::TimedOut));
    });
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()))
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(1)));

    let created = sdk.create_token(&token_params()).await.unwrap();
    let sent = rpc.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].message.account_keys.contains(&created.mint));
    assert_eq!(rpc.state.lock().unwrap().send_attempts, 2);
}

fn swap_params() -> SwapParams {
    SwapParams {
        token_a: Pubkey::new_unique(),
        token_b: Pubkey::new_unique(),
        amount_in: 1_000,
        minimum_amount_out: 900,
        a_to_b: true,
    }
}

#[tokio::test]
async fn flaky_status_poll_does_not_resubmit_swap() {
    let rpc = MockRpc::new().with(|state| state.status_errors = 1);
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()))
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(1)));

    let signature = sdk.execute_swap(&swap_params()).await.unwrap();
    let sent = rpc.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].signatures[0], signature);
}

#[tokio::test]
async fn swap_lost_in_transit_is_unknown_and_not_resubmitted() {
    let rpc = MockRpc::new().with(|state| {
        state.send_error = Some(transport_error(ErrorKind::TimedOut));
    });
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()))
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(1)));

    let err = sdk.execute_swap(&swap_params()).await.unwrap_err();
    assert_matches!(err.root_cause(), SdkError::SendUnconfirmed { .. });
    assert!(err.is_outcome_unknown());
    assert!(!err.is_transient());
    assert_eq!(rpc.state.lock().unwrap().send_attempts, 1);
}

#[tokio::test]
async fn unreachable_status_gives_up_as_timed_out() {
    let rpc = MockRpc::new().with(|state| {
        state.status_errors = MAX_CONSECUTIVE_POLL_FAILURES as usize;
    });
    let sdk = sdk(&rpc, KeypairWallet::new(Keypair::new()));
    let ix = system_instruction::transfer(&sdk.wallet_address().unwrap(), &Pubkey::new_unique(), 1);

    let err = sdk.orchestrator().submit(&[ix], &[], &fast()).await.unwrap_err();
    assert_matches!(
        err,
        SdkError::ConfirmationTimedOut { signature } if signature == rpc.sent()[0].signatures[0]
    );
    assert!(err.is_outcome_unknown());
}

#[tokio::test]
async fn reconcile_reads_history() {
    let rpc = MockRpc::new().with(|state| {
        state.status = None;
        state.history_status = Some(confirmed());
    });
    let sdk = sdk(&rpc, Disconnected);

    let found = sdk
        .reconcile(&solana_sdk::signature::Signature::default())
        .await
        .unwrap();
    assert_eq!(found, Some(confirmed()));
}
