use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use solana_sdk::native_token::LAMPORTS_PER_SOL;

const EXPLORER_BASE_URL: &str = "https://explorer.solana.com";

/// Cluster the configured endpoint points at, detected from its url.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
    Custom,
}

impl Network {
    pub fn from_rpc_url(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.contains("devnet") {
            Network::Devnet
        } else if url.contains("testnet") {
            Network::Testnet
        } else if url.contains("mainnet") {
            Network::MainnetBeta
        } else if url.contains("localhost") || url.contains("127.0.0.1") {
            Network::Localnet
        } else {
            Network::Custom
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Localnet => "localnet",
            Network::Custom => "custom",
        }
    }

    fn cluster_query(&self) -> Option<&'static str> {
        match self {
            Network::MainnetBeta | Network::Custom => None,
            Network::Devnet => Some("?cluster=devnet"),
            Network::Testnet => Some("?cluster=testnet"),
            Network::Localnet => Some("?cluster=custom&customUrl=http%3A%2F%2Flocalhost%3A8899"),
        }
    }

    pub fn faucet_url(&self) -> Option<&'static str> {
        match self {
            Network::Devnet | Network::Testnet => Some("https://faucet.solana.com"),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explorer link for a transaction signature
pub fn explorer_tx_url(signature: impl fmt::Display, network: Network) -> String {
    explorer_url("tx", signature, network)
}

/// Explorer link for an account address
pub fn explorer_address_url(address: impl fmt::Display, network: Network) -> String {
    explorer_url("address", address, network)
}

fn explorer_url(kind: &str, id: impl fmt::Display, network: Network) -> String {
    format!(
        "{EXPLORER_BASE_URL}/{kind}/{id}{}",
        network.cluster_query().unwrap_or_default()
    )
}

pub fn lamports_to_sol(lamports: u64) -> Decimal {
    to_ui_amount(lamports, 9)
}

/// Raw token units rendered with the mint's decimals, without float rounding.
pub fn to_ui_amount(amount: u64, decimals: u8) -> Decimal {
    let mut value = Decimal::from(amount);
    // Decimal caps its scale at 28
    if value.set_scale(u32::from(decimals.min(28))).is_err() {
        return Decimal::from(amount);
    }
    value.normalize()
}

pub fn sol_to_lamports(sol: Decimal) -> Option<u64> {
    let lamports = sol.checked_mul(Decimal::from(LAMPORTS_PER_SOL))?;
    u64::try_from(lamports.trunc()).ok()
}
