use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hookswap_sdk::diagnostics::{ConnectionStatus, Diagnostics, format_sol};
use hookswap_sdk::{
    ClientConfig, Disconnected, HealthReport, HookSwapSDK, KeypairWallet, ProgramName, RawConfig,
    WalletSigner, WatchOnlyWallet, pda,
};
use log::info;
use solana_sdk::pubkey::Pubkey;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Health checks and account lookups for a HookSwap deployment", long_about = None)]
struct Cli {
    /// Keypair file of the wallet to check
    #[arg(long, global = true, conflicts_with = "address")]
    keypair: Option<String>,

    /// Watch-only wallet address
    #[arg(long, global = true)]
    address: Option<Pubkey>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full health check
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deployment status of the five programs
    Programs,
    /// RPC latency over a few samples
    Network {
        #[arg(long, default_value_t = 5)]
        samples: usize,
    },
    /// Health check, cost estimates and a sample payload as JSON
    Report,
    /// KYC record of a user
    Kyc { user: Pubkey },
    /// Token holdings of an owner
    Tokens { owner: Pubkey },
    /// Program derived addresses
    Derive {
        #[command(subcommand)]
        kind: DeriveKind,
    },
}

#[derive(Subcommand, Debug)]
enum DeriveKind {
    TokenInfo { mint: Pubkey },
    AmmConfig,
    Pool { token_a: Pubkey, token_b: Pubkey },
    KycSystem,
    KycRecord { user: Pubkey },
    HookRegistry,
    Whitelist { mint: Pubkey },
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn wallet(cli: &Cli) -> Result<Arc<dyn WalletSigner>> {
    if let Some(path) = &cli.keypair {
        return Ok(Arc::new(KeypairWallet::from_file(path)?));
    }
    if let Some(address) = cli.address {
        return Ok(Arc::new(WatchOnlyWallet::new(address)));
    }
    Ok(Arc::new(Disconnected))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();
    let cli = Cli::parse();

    // unset programs are reported by the checks instead of failing here
    let config = RawConfig::from_env()?
        .validate_lenient()
        .context("invalid HOOKSWAP_* configuration")?;
    info!("using {} ({})", config.rpc_url, config.network);
    let sdk = HookSwapSDK::new(config.clone(), wallet(&cli)?);

    match &cli.command {
        Commands::Health { json } => {
            let report = sdk.run_health_check().await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_health(&report);
            }
            if !report.healthy {
                bail!("deployment is not healthy");
            }
        }
        Commands::Programs => {
            let programs = sdk.validate_programs().await;
            for (name, deployed) in &programs {
                let id = config
                    .programs
                    .get(*name)
                    .map(|id| id.to_string())
                    .unwrap_or_default();
                println!("{:<16} {:<45} {}", name, id, mark(*deployed));
            }
        }
        Commands::Network { samples } => {
            let diagnostics = sdk.diagnostics();
            let rpc = diagnostics.test_rpc_connection().await?;
            println!(
                "node {} at slot {} ({:.0}ms, {:?})",
                rpc.version, rpc.slot, rpc.latency_ms, rpc.status
            );
            let performance = diagnostics.measure_network_performance(*samples).await?;
            println!(
                "avg {:.0}ms  min {:.0}ms  max {:.0}ms  failed {}  -> {:?}",
                performance.average_ms,
                performance.min_ms,
                performance.max_ms,
                performance.failed_samples,
                performance.tier
            );
        }
        Commands::Report => {
            let diagnostics: Diagnostics = sdk.diagnostics();
            println!("{}", diagnostics.debug_report_json().await?);
        }
        Commands::Kyc { user } => match sdk.get_kyc_record(user).await? {
            None => println!("{user}: no KYC record (not verified)"),
            Some(record) => {
                println!("user            {}", record.user);
                println!("verified        {}", mark(record.is_verified));
                println!("level           {}", record.kyc_level);
                println!("verified at     {}", record.verified_at);
                println!("updated at      {}", record.updated_at);
                println!("transfers       {}", record.transfer_count);
            }
        },
        Commands::Tokens { owner } => {
            let tokens = sdk.reader().get_token_accounts(owner).await?;
            if tokens.is_empty() {
                println!("{owner} holds no tokens");
            }
            for token in tokens {
                println!(
                    "{:<10} {:>24} {:<44} hook {:?} verified {}",
                    token.symbol,
                    token.ui_amount(),
                    token.mint,
                    token.hook,
                    mark(token.is_verified)
                );
            }
        }
        Commands::Derive { kind } => {
            let (address, bump) = derive(&config, kind)?;
            println!("{address} (bump {bump})");
        }
    }

    Ok(())
}

fn derive(config: &ClientConfig, kind: &DeriveKind) -> Result<(Pubkey, u8)> {
    let programs = &config.programs;
    let derived = match kind {
        DeriveKind::TokenInfo { mint } => {
            pda::token_info(&programs.resolve(ProgramName::TokenLayer)?, mint)?
        }
        DeriveKind::AmmConfig => pda::amm_config(&programs.resolve(ProgramName::Amm)?)?,
        DeriveKind::Pool { token_a, token_b } => {
            pda::pool(&programs.resolve(ProgramName::Amm)?, token_a, token_b)?
        }
        DeriveKind::KycSystem => pda::kyc_system(&programs.resolve(ProgramName::KycHook)?)?,
        DeriveKind::KycRecord { user } => {
            pda::kyc_record(&programs.resolve(ProgramName::KycHook)?, user)?
        }
        DeriveKind::HookRegistry => {
            pda::hook_registry(&programs.resolve(ProgramName::HookRegistry)?)?
        }
        DeriveKind::Whitelist { mint } => {
            pda::whitelist(&programs.resolve(ProgramName::WhitelistHook)?, mint)?
        }
    };
    Ok(derived)
}

fn mark(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

fn print_health(report: &HealthReport) {
    println!("network         {}", report.environment.network);
    println!("rpc url         {}", report.environment.rpc_url);
    println!("configuration   {}", mark(report.environment.ok));

    match &report.rpc {
        Some(rpc) if rpc.status == ConnectionStatus::Good => {
            println!("rpc             {} ({:.0}ms)", rpc.version, rpc.latency_ms)
        }
        Some(rpc) => println!(
            "rpc             {} ({:.0}ms, {:?})",
            rpc.version, rpc.latency_ms, rpc.status
        ),
        None => println!("rpc             unreachable"),
    }

    match (&report.wallet.address, report.wallet.balance_lamports) {
        (Some(address), Some(balance)) => {
            println!("wallet          {address} ({})", format_sol(balance))
        }
        (Some(address), None) => println!("wallet          {address} (balance unknown)"),
        _ => println!("wallet          not connected"),
    }
    if let (Some(affordable), Some(required)) = (
        report.wallet.can_afford_token_creation(),
        report.wallet.token_creation_lamports,
    ) {
        println!("token creation  {} ({})", mark(affordable), format_sol(required));
    }

    println!("programs        {}/{}", report.programs_deployed, ProgramName::ALL.len());
    for (name, deployed) in &report.programs {
        println!("  {:<14} {}", name, mark(*deployed));
    }

    if let Some(performance) = &report.network_performance {
        println!(
            "latency         {:.0}ms ({:?})",
            performance.average_ms, performance.tier
        );
    }

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    for recommendation in &report.recommendations {
        println!("-> {recommendation}");
    }
    println!("healthy         {}", mark(report.healthy));
}
