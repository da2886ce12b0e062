//! # HookSwap SDK
//!
//! A client library for the HookSwap programs on Solana: a token layer that mints
//! Token-2022 tokens with compliance transfer hooks (KYC or whitelist), a hook registry
//! and an AMM that pools and swaps those tokens. This SDK provides two main usage flows:
//!
//! 1. **Submitting Functions**: build, sign, simulate, send and confirm in one call
//! 2. **Instruction Functions (`_ix`)**: return the instructions only, so callers can compose their own transactions
//!
//! ## 🚀 Quick Start
//!
//! ### Configuration
//!
//! The client needs an RPC endpoint and the five program ids. They are read from the
//! environment (a `.env` file is loaded first when present):
//!
//! ```text
//! HOOKSWAP_RPC_URL=https://api.devnet.solana.com
//! HOOKSWAP_COMMITMENT=confirmed
//! HOOKSWAP_TOKEN_LAYER_PROGRAM=...
//! HOOKSWAP_AMM_PROGRAM=...
//! HOOKSWAP_KYC_HOOK_PROGRAM=...
//! HOOKSWAP_HOOK_REGISTRY_PROGRAM=...
//! HOOKSWAP_WHITELIST_HOOK_PROGRAM=...
//! ```
//!
//! A missing program id is a configuration error, there are no fallbacks.
//!
//! ### Basic Setup
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hookswap_sdk::{ClientConfig, HookSwapSDK, KeypairWallet};
//!
//! # fn main() -> hookswap_sdk::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let wallet = KeypairWallet::from_file("~/.config/solana/id.json")?;
//! let sdk = HookSwapSDK::new(config, Arc::new(wallet));
//! # Ok(())
//! # }
//! ```
//!
//! ## 📖 Usage Patterns
//!
//! ### Creating a token with a KYC hook
//!
//! ```rust,ignore
//! use hookswap_sdk::{CreateTokenParams, HookType};
//!
//! let created = sdk
//!     .create_token(&CreateTokenParams {
//!         name: "Test Token".into(),
//!         symbol: "TEST".into(),
//!         decimals: 9,
//!         total_supply: 1_000_000_000_000,
//!         hook_type: HookType::Kyc,
//!     })
//!     .await?;
//! println!("mint {} created in {}", created.mint, created.signature);
//! ```
//!
//! ### Pool and swap
//!
//! A pool does not exist until its creation is confirmed, so await `create_pool`
//! before swapping through it.
//!
//! ```rust,ignore
//! use hookswap_sdk::{PoolCreateParams, SwapParams, minimum_amount_out};
//!
//! sdk.create_pool(&PoolCreateParams { token_a, token_b, initial_price: 1.5 }).await?;
//!
//! let signature = sdk
//!     .execute_swap(&SwapParams {
//!         token_a,
//!         token_b,
//!         amount_in: 1_000_000,
//!         minimum_amount_out: minimum_amount_out(1_500_000, 50), // 0.5% slippage
//!         a_to_b: true,
//!     })
//!     .await?;
//! ```
//!
//! ## ⚠️ Important: Unknown Outcomes
//!
//! Each call makes **one** submission attempt. `SendUnconfirmed`, `TransactionExpired`
//! and `ConfirmationTimedOut` mean the outcome is unknown: the transaction may still have
//! landed. Call [`HookSwapSDK::reconcile`] with the signature before building a new one.
//! Token creation is safe to retry (every attempt uses a fresh mint) and can be retried
//! automatically through a [`RetryPolicy`]; swaps never are.
//!
//! ## 🩺 Diagnostics
//!
//! With the default `diagnostics` feature, [`HookSwapSDK::run_health_check`] returns a
//! best-effort report: program deployment, RPC latency, wallet balance and configuration.
//! The `hookswap-doctor` binary prints the same checks from the command line.

pub mod config;
pub mod constants;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod instructions;
pub mod orchestrator;
pub mod params;
pub mod pda;
pub mod reader;
pub mod retry;
pub mod rpc;
pub mod sdk;
pub mod state;
pub mod utils;
pub mod wallet;

mod account_metas;

pub use config::{ClientConfig, ProgramName, ProgramRegistry, RawConfig};
pub use error::{Result, SdkError};
pub use instructions::InstructionBuilder;
pub use orchestrator::{
    ComputeBudget, MAX_CONSECUTIVE_POLL_FAILURES, SubmitPolicy, SubmittedTransaction,
    TransactionOrchestrator, TransactionStage,
};
pub use params::{
    AddLiquidityParams, CreateKycRecordParams, CreateTokenParams, HookType, PoolCreateParams,
    SwapParams, UpdateKycStatusParams, minimum_amount_out,
};
pub use reader::{AccountReader, HookClassification, TokenDescriptor};
pub use retry::RetryPolicy;
pub use rpc::{LedgerRpc, SignatureRecord, SignatureState, SimulationOutcome, TokenBalance};
pub use sdk::{CreatedToken, HookSwapSDK};
pub use state::{ComplianceRecord, PoolDescriptor, TokenInfoRecord, WhitelistRecord};
pub use utils::Network;
pub use wallet::{Disconnected, KeypairWallet, WalletSigner, WatchOnlyWallet};

#[cfg(feature = "diagnostics")]
pub use diagnostics::{Diagnostics, HealthPolicy, HealthReport};
