//! Health and diagnostics for a HookSwap deployment.
//!
//! Diagnostics only use the public contracts of the client (the RPC capability,
//! the wallet capability, [`AccountReader`] and [`InstructionBuilder`]). Each
//! sub-check fails on its own; [`Diagnostics::run_health_check`] collects whatever
//! succeeded into one report instead of stopping at the first error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::config::{ClientConfig, ProgramName};
use crate::constants::{
    BASE_FEE_LAMPORTS, MINT_ACCOUNT_SIZE, TOKEN_ACCOUNT_SIZE, TOKEN_INFO_ACCOUNT_SIZE,
};
use crate::error::{Result, SdkError};
use crate::instructions::InstructionBuilder;
use crate::params::{CreateTokenParams, HookType};
use crate::reader::AccountReader;
use crate::rpc::{LedgerRpc, SignatureRecord};
use crate::utils::{Network, lamports_to_sol};
use crate::wallet::WalletSigner;

pub const DEFAULT_LATENCY_SAMPLES: usize = 5;
pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Slow,
    Poor,
}

impl PerformanceTier {
    pub fn from_latency_ms(latency_ms: f64) -> Self {
        if latency_ms < 100.0 {
            PerformanceTier::Excellent
        } else if latency_ms < 300.0 {
            PerformanceTier::Good
        } else if latency_ms < 1_000.0 {
            PerformanceTier::Slow
        } else {
            PerformanceTier::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Good,
    Slow,
    VerySlow,
}

impl ConnectionStatus {
    pub fn from_latency_ms(latency_ms: f64) -> Self {
        if latency_ms < 1_000.0 {
            ConnectionStatus::Good
        } else if latency_ms < 3_000.0 {
            ConnectionStatus::Slow
        } else {
            ConnectionStatus::VerySlow
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkPerformance {
    pub samples_ms: Vec<f64>,
    pub failed_samples: usize,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub tier: PerformanceTier,
}

impl NetworkPerformance {
    /// `None` when there are no successful samples
    pub fn from_samples(samples_ms: Vec<f64>, failed_samples: usize) -> Option<Self> {
        if samples_ms.is_empty() {
            return None;
        }
        let average_ms = samples_ms.iter().sum::<f64>() / samples_ms.len() as f64;
        let min_ms = samples_ms.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = samples_ms.iter().copied().fold(0.0, f64::max);

        Some(Self {
            tier: PerformanceTier::from_latency_ms(average_ms),
            samples_ms,
            failed_samples,
            average_ms,
            min_ms,
            max_ms,
        })
    }

    pub fn is_degraded(&self) -> bool {
        self.tier == PerformanceTier::Poor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcCheck {
    pub version: String,
    pub slot: u64,
    pub latency_ms: f64,
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCheck {
    pub ok: bool,
    pub rpc_url: String,
    pub network: Network,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletCheck {
    pub ok: bool,
    pub connected: bool,
    pub address: Option<String>,
    pub balance_lamports: Option<u64>,
    /// Rent for a mint and its token info account plus the fee
    pub token_creation_lamports: Option<u64>,
}

impl WalletCheck {
    fn disconnected() -> Self {
        Self {
            ok: false,
            connected: false,
            address: None,
            balance_lamports: None,
            token_creation_lamports: None,
        }
    }

    /// `None` when either amount is unknown
    pub fn can_afford_token_creation(&self) -> Option<bool> {
        Some(self.balance_lamports? >= self.token_creation_lamports?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentTransaction {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub succeeded: bool,
}

impl From<SignatureRecord> for RecentTransaction {
    fn from(record: SignatureRecord) -> Self {
        Self {
            signature: record.signature.to_string(),
            slot: record.slot,
            block_time: record.block_time,
            succeeded: record.err.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    /// Rent-exempt minimum by account size in bytes
    pub rent_exempt_minimum: BTreeMap<usize, u64>,
    pub token_creation_lamports: u64,
    pub token_account_lamports: u64,
}

/// What counts as healthy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthPolicy {
    pub min_programs_deployed: usize,
    pub require_wallet: bool,
    pub latency_samples: usize,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            min_programs_deployed: 3,
            require_wallet: true,
            latency_samples: DEFAULT_LATENCY_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub timestamp: u64,
    pub environment: EnvironmentCheck,
    pub rpc: Option<RpcCheck>,
    pub wallet: WalletCheck,
    pub programs: BTreeMap<ProgramName, bool>,
    pub programs_deployed: usize,
    pub network_performance: Option<NetworkPerformance>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub recommendations: Vec<String>,
    pub healthy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionSample {
    pub program_id: String,
    pub accounts: usize,
    pub data_len: usize,
    pub data_hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugReport {
    pub health: HealthReport,
    pub costs: Option<CostEstimate>,
    pub sample_instruction: Option<InstructionSample>,
    pub recent_transactions: Vec<RecentTransaction>,
}

pub struct Diagnostics {
    config: ClientConfig,
    rpc: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSigner>,
    reader: AccountReader,
    policy: HealthPolicy,
}

impl Diagnostics {
    pub fn new(
        config: ClientConfig,
        rpc: Arc<dyn LedgerRpc>,
        wallet: Arc<dyn WalletSigner>,
    ) -> Self {
        let reader = AccountReader::new(rpc.clone(), config.programs.clone());
        Self {
            config,
            rpc,
            wallet,
            reader,
            policy: HealthPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: HealthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Required configuration values are present
    pub fn check_environment(&self) -> EnvironmentCheck {
        let missing: Vec<String> = self
            .config
            .programs
            .missing()
            .into_iter()
            .map(|name| name.env_key().to_string())
            .collect();

        EnvironmentCheck {
            ok: missing.is_empty() && !self.config.rpc_url.is_empty(),
            rpc_url: self.config.rpc_url.clone(),
            network: self.config.network,
            missing,
        }
    }

    /// Executable flag of every registered program; unregistered or unreachable ones read as `false`.
    pub async fn check_programs_deployed(&self) -> BTreeMap<ProgramName, bool> {
        self.probe_programs().await.0
    }

    async fn probe_programs(&self) -> (BTreeMap<ProgramName, bool>, Vec<String>) {
        let mut programs = BTreeMap::new();
        let mut errors = Vec::new();

        for name in ProgramName::ALL {
            let deployed = match self.config.programs.get(name) {
                None => false,
                Some(program_id) => match self.reader.is_program_deployed(&program_id).await {
                    Ok(deployed) => deployed,
                    Err(e) => {
                        log::warn!("cannot check program {name} ({program_id}): {e}");
                        errors.push(format!("program {name}: {e}"));
                        false
                    }
                },
            };
            programs.insert(name, deployed);
        }

        (programs, errors)
    }

    /// Node version and current slot, timed
    pub async fn test_rpc_connection(&self) -> Result<RpcCheck> {
        let started = Instant::now();
        let version = self.rpc.get_version().await?;
        let slot = self.rpc.get_slot().await?;
        let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;

        Ok(RpcCheck {
            version,
            slot,
            latency_ms,
            status: ConnectionStatus::from_latency_ms(latency_ms),
        })
    }

    /// Connected and holding a non-zero balance, with the cost of creating a token alongside
    pub async fn check_wallet(&self) -> Result<WalletCheck> {
        let Some(address) = self.wallet.pubkey() else {
            return Ok(WalletCheck::disconnected());
        };

        let balance = self.reader.get_balance(&address).await?;
        let token_creation_lamports = self
            .token_creation_cost()
            .await
            .inspect_err(|e| log::warn!("token creation cost unavailable: {e}"))
            .ok();

        Ok(WalletCheck {
            ok: balance > 0,
            connected: true,
            address: Some(address.to_string()),
            balance_lamports: Some(balance),
            token_creation_lamports,
        })
    }

    async fn token_creation_cost(&self) -> Result<u64> {
        let mint = self
            .rpc
            .get_minimum_balance_for_rent_exemption(MINT_ACCOUNT_SIZE)
            .await?;
        let token_info = self
            .rpc
            .get_minimum_balance_for_rent_exemption(TOKEN_INFO_ACCOUNT_SIZE)
            .await?;
        Ok(mint + token_info + BASE_FEE_LAMPORTS)
    }

    /// The connected wallet's latest transactions, newest first
    pub async fn recent_transactions(&self, limit: usize) -> Result<Vec<RecentTransaction>> {
        let address = self
            .wallet
            .pubkey()
            .ok_or_else(|| SdkError::WalletNotReady("no wallet connected".into()))?;
        let records = self.rpc.get_signatures_for_address(&address, limit).await?;
        Ok(records.into_iter().map(RecentTransaction::from).collect())
    }

    /// Times `samples` slot queries. Failed samples are counted, not averaged.
    pub async fn measure_network_performance(&self, samples: usize) -> Result<NetworkPerformance> {
        let mut latencies = Vec::with_capacity(samples);
        let mut failed = 0;
        let mut last_error = None;

        for _ in 0..samples.max(1) {
            let started = Instant::now();
            match self.rpc.get_slot().await {
                Ok(_) => latencies.push(started.elapsed().as_secs_f64() * 1_000.0),
                Err(e) => {
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        match NetworkPerformance::from_samples(latencies, failed) {
            Some(performance) => Ok(performance),
            None => Err(last_error.unwrap_or_else(|| SdkError::rpc_custom("no latency samples"))),
        }
    }

    pub async fn estimate_costs(&self) -> Result<CostEstimate> {
        let mut rent_exempt_minimum = BTreeMap::new();
        for size in [0, MINT_ACCOUNT_SIZE, TOKEN_ACCOUNT_SIZE, TOKEN_INFO_ACCOUNT_SIZE] {
            let rent = self.rpc.get_minimum_balance_for_rent_exemption(size).await?;
            rent_exempt_minimum.insert(size, rent);
        }

        let rent_for = |size: usize| rent_exempt_minimum.get(&size).copied().unwrap_or_default();
        let token_creation_lamports =
            rent_for(MINT_ACCOUNT_SIZE) + rent_for(TOKEN_INFO_ACCOUNT_SIZE) + BASE_FEE_LAMPORTS;
        let token_account_lamports = rent_for(TOKEN_ACCOUNT_SIZE) + BASE_FEE_LAMPORTS;

        Ok(CostEstimate {
            rent_exempt_minimum,
            token_creation_lamports,
            token_account_lamports,
        })
    }

    /// Encodes a sample create-token instruction so its layout can be eyeballed.
    pub fn validate_instruction_format(&self) -> Result<InstructionSample> {
        let builder = InstructionBuilder::new(self.config.programs.clone());
        let params = CreateTokenParams {
            name: "Test Token".into(),
            symbol: "TEST".into(),
            decimals: 9,
            total_supply: 1_000_000,
            hook_type: HookType::None,
        };
        let payer = self.wallet.pubkey().unwrap_or_default();
        let ix = builder.create_token(&params, &Pubkey::default(), &payer)?;

        Ok(InstructionSample {
            program_id: ix.program_id.to_string(),
            accounts: ix.accounts.len(),
            data_len: ix.data.len(),
            data_hex: hex::encode(&ix.data),
        })
    }

    /// Runs every check and folds the results into one report.
    pub async fn run_health_check(&self) -> HealthReport {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut recommendations = Vec::new();

        let environment = self.check_environment();
        for key in &environment.missing {
            recommendations.push(format!("Set {key} to the deployed program id"));
        }

        let rpc = match self.test_rpc_connection().await {
            Ok(check) => {
                if check.status != ConnectionStatus::Good {
                    warnings.push(format!(
                        "RPC responded in {:.0}ms ({:?})",
                        check.latency_ms, check.status
                    ));
                }
                Some(check)
            }
            Err(e) => {
                errors.push(format!("rpc: {e}"));
                recommendations.push(format!(
                    "Check that the RPC endpoint {} is reachable",
                    self.config.rpc_url
                ));
                None
            }
        };

        let wallet = match self.check_wallet().await {
            Ok(check) => check,
            Err(e) => {
                errors.push(format!("wallet: {e}"));
                WalletCheck {
                    connected: self.wallet.pubkey().is_some(),
                    address: self.wallet.pubkey().map(|key| key.to_string()),
                    ..WalletCheck::disconnected()
                }
            }
        };
        if !wallet.connected {
            recommendations.push("Connect a wallet".to_string());
        } else if wallet.balance_lamports == Some(0) {
            warnings.push("wallet balance is zero".to_string());
            let mut advice = format!(
                "Fund wallet {} before submitting transactions",
                wallet.address.as_deref().unwrap_or_default()
            );
            if let Some(faucet) = self.config.network.faucet_url() {
                advice.push_str(&format!(" ({faucet})"));
            }
            recommendations.push(advice);
        } else if let (Some(false), Some(balance), Some(required)) = (
            wallet.can_afford_token_creation(),
            wallet.balance_lamports,
            wallet.token_creation_lamports,
        ) {
            warnings.push(format!(
                "Insufficient balance for token creation: required {}, current {}",
                format_sol(required),
                format_sol(balance)
            ));
            let mut advice = "Add SOL to the wallet before creating a token".to_string();
            if let Some(faucet) = self.config.network.faucet_url() {
                advice.push_str(&format!(" ({faucet})"));
            }
            recommendations.push(advice);
        }

        let (programs, program_errors) = self.probe_programs().await;
        errors.extend(program_errors);
        let programs_deployed = programs.values().filter(|deployed| **deployed).count();
        for (name, deployed) in &programs {
            if !deployed {
                recommendations.push(format!("Deploy the {name} program or fix {}", name.env_key()));
            }
        }

        let network_performance = match self
            .measure_network_performance(self.policy.latency_samples)
            .await
        {
            Ok(performance) => {
                if performance.is_degraded() {
                    warnings.push(
                        SdkError::NetworkDegraded {
                            average_latency_ms: performance.average_ms,
                        }
                        .to_string(),
                    );
                    recommendations.push("Consider a dedicated RPC provider".to_string());
                }
                Some(performance)
            }
            Err(e) => {
                errors.push(format!("network performance: {e}"));
                None
            }
        };

        let healthy = environment.ok
            && rpc.is_some()
            && (wallet.ok || !self.policy.require_wallet)
            && programs_deployed >= self.policy.min_programs_deployed;

        if healthy {
            log::info!("health check passed ({programs_deployed}/5 programs deployed)");
        } else {
            log::warn!("health check failed ({programs_deployed}/5 programs deployed)");
        }

        HealthReport {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default(),
            environment,
            rpc,
            wallet,
            programs,
            programs_deployed,
            network_performance,
            warnings,
            errors,
            recommendations,
            healthy,
        }
    }

    /// Health report plus cost estimates, a sample payload and the wallet's recent history
    pub async fn debug_report(&self) -> DebugReport {
        let health = self.run_health_check().await;
        let costs = self
            .estimate_costs()
            .await
            .inspect_err(|e| log::warn!("cost estimate unavailable: {e}"))
            .ok();
        let sample_instruction = self
            .validate_instruction_format()
            .inspect_err(|e| log::warn!("sample instruction unavailable: {e}"))
            .ok();
        let recent_transactions = if self.wallet.pubkey().is_some() {
            self.recent_transactions(RECENT_TRANSACTIONS_LIMIT)
                .await
                .inspect_err(|e| log::warn!("recent transactions unavailable: {e}"))
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        DebugReport {
            health,
            costs,
            sample_instruction,
            recent_transactions,
        }
    }

    pub async fn debug_report_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.debug_report().await)
            .map_err(|e| SdkError::Decode(format!("cannot serialize report: {e}")))
    }
}

/// Human readable balance for reports
pub fn format_sol(lamports: u64) -> String {
    format!("{} SOL", lamports_to_sol(lamports))
}
