use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;

use crate::error::{Result, SdkError};
use crate::utils::Network;

pub const ENV_PREFIX: &str = "HOOKSWAP_";

/// Logical names of the on-chain programs the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramName {
    TokenLayer,
    Amm,
    KycHook,
    HookRegistry,
    WhitelistHook,
}

impl ProgramName {
    pub const ALL: [ProgramName; 5] = [
        ProgramName::TokenLayer,
        ProgramName::Amm,
        ProgramName::KycHook,
        ProgramName::HookRegistry,
        ProgramName::WhitelistHook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramName::TokenLayer => "token-layer",
            ProgramName::Amm => "amm",
            ProgramName::KycHook => "kyc-hook",
            ProgramName::HookRegistry => "hook-registry",
            ProgramName::WhitelistHook => "whitelist-hook",
        }
    }

    /// Environment variable holding this program's identifier.
    pub fn env_key(&self) -> &'static str {
        match self {
            ProgramName::TokenLayer => "HOOKSWAP_TOKEN_LAYER_PROGRAM",
            ProgramName::Amm => "HOOKSWAP_AMM_PROGRAM",
            ProgramName::KycHook => "HOOKSWAP_KYC_HOOK_PROGRAM",
            ProgramName::HookRegistry => "HOOKSWAP_HOOK_REGISTRY_PROGRAM",
            ProgramName::WhitelistHook => "HOOKSWAP_WHITELIST_HOOK_PROGRAM",
        }
    }
}

impl fmt::Display for ProgramName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramName {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        ProgramName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SdkError::Configuration(format!("unknown program name `{s}`")))
    }
}

/// Immutable mapping from logical program name to on-chain identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramRegistry {
    programs: BTreeMap<ProgramName, Pubkey>,
}

impl ProgramRegistry {
    pub fn new(
        token_layer: Pubkey,
        amm: Pubkey,
        kyc_hook: Pubkey,
        hook_registry: Pubkey,
        whitelist_hook: Pubkey,
    ) -> Self {
        Self::from_entries([
            (ProgramName::TokenLayer, token_layer),
            (ProgramName::Amm, amm),
            (ProgramName::KycHook, kyc_hook),
            (ProgramName::HookRegistry, hook_registry),
            (ProgramName::WhitelistHook, whitelist_hook),
        ])
    }

    /// Builds a possibly partial registry. Lookups of absent names fail with a configuration error.
    pub fn from_entries(entries: impl IntoIterator<Item = (ProgramName, Pubkey)>) -> Self {
        Self {
            programs: entries.into_iter().collect(),
        }
    }

    pub fn resolve(&self, name: ProgramName) -> Result<Pubkey> {
        self.programs.get(&name).copied().ok_or_else(|| {
            SdkError::Configuration(format!(
                "program `{name}` is not registered (set {})",
                name.env_key()
            ))
        })
    }

    pub fn get(&self, name: ProgramName) -> Option<Pubkey> {
        self.programs.get(&name).copied()
    }

    pub fn missing(&self) -> Vec<ProgramName> {
        ProgramName::ALL
            .into_iter()
            .filter(|name| !self.programs.contains_key(name))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramName, Pubkey)> + '_ {
        self.programs.iter().map(|(name, id)| (*name, *id))
    }

    /// Reverse lookup, used to classify transfer hooks.
    pub fn name_of(&self, program_id: &Pubkey) -> Option<ProgramName> {
        self.programs
            .iter()
            .find(|(_, id)| *id == program_id)
            .map(|(name, _)| *name)
    }
}

/// Configuration as read from the environment, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub rpc_url: Option<String>,
    pub commitment: Option<String>,
    pub token_layer_program: Option<String>,
    pub amm_program: Option<String>,
    pub kyc_hook_program: Option<String>,
    pub hook_registry_program: Option<String>,
    pub whitelist_hook_program: Option<String>,
}

impl RawConfig {
    /// Reads `HOOKSWAP_*` variables, loading a `.env` file first when one exists.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        envy::prefixed(ENV_PREFIX)
            .from_env::<RawConfig>()
            .map_err(|e| SdkError::Configuration(e.to_string()))
    }

    pub fn from_iter<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, RawConfig>(vars)
            .map_err(|e| SdkError::Configuration(e.to_string()))
    }

    fn program_value(&self, name: ProgramName) -> Option<&str> {
        let value = match name {
            ProgramName::TokenLayer => &self.token_layer_program,
            ProgramName::Amm => &self.amm_program,
            ProgramName::KycHook => &self.kyc_hook_program,
            ProgramName::HookRegistry => &self.hook_registry_program,
            ProgramName::WhitelistHook => &self.whitelist_hook_program,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Required keys that are absent or empty.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.rpc_url.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            missing.push("HOOKSWAP_RPC_URL");
        }
        for name in ProgramName::ALL {
            if self.program_value(name).is_none() {
                missing.push(name.env_key());
            }
        }
        missing
    }

    pub fn validate(&self) -> Result<ClientConfig> {
        self.build(true)
    }

    /// Like [`RawConfig::validate`] but leaves unset programs unregistered, so
    /// diagnostics can report them. The endpoint is still required.
    pub fn validate_lenient(&self) -> Result<ClientConfig> {
        self.build(false)
    }

    fn build(&self, strict: bool) -> Result<ClientConfig> {
        let mut problems: Vec<String> = self
            .missing_keys()
            .into_iter()
            .filter(|key| strict || *key == "HOOKSWAP_RPC_URL")
            .map(|key| format!("{key} is not set"))
            .collect();

        let mut entries = Vec::new();
        for name in ProgramName::ALL {
            if let Some(value) = self.program_value(name) {
                match Pubkey::from_str(value) {
                    Ok(id) => entries.push((name, id)),
                    Err(e) => problems.push(format!("{} is not a valid address: {e}", name.env_key())),
                }
            }
        }

        let commitment = match self.commitment.as_deref() {
            None => CommitmentLevel::Confirmed,
            Some(value) => match CommitmentLevel::from_str(value) {
                Ok(level) => level,
                Err(_) => {
                    problems.push(format!("HOOKSWAP_COMMITMENT `{value}` is not a commitment level"));
                    CommitmentLevel::Confirmed
                }
            },
        };

        if !problems.is_empty() {
            return Err(SdkError::Configuration(problems.join("; ")));
        }

        let rpc_url = self.rpc_url.clone().unwrap_or_default().trim().to_string();
        ClientConfig::new(rpc_url, ProgramRegistry::from_entries(entries))
            .map(|config| config.with_commitment(commitment))
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub network: Network,
    pub commitment: CommitmentLevel,
    pub programs: ProgramRegistry,
}

impl ClientConfig {
    pub fn new(rpc_url: impl Into<String>, programs: ProgramRegistry) -> Result<Self> {
        let rpc_url = rpc_url.into();
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(SdkError::Configuration(format!(
                "rpc endpoint `{rpc_url}` must be an http(s) url"
            )));
        }

        Ok(Self {
            network: Network::from_rpc_url(&rpc_url),
            rpc_url,
            commitment: CommitmentLevel::Confirmed,
            programs,
        })
    }

    /// Strict load: every required value must be present and parseable.
    pub fn from_env() -> Result<Self> {
        RawConfig::from_env()?.validate()
    }

    pub fn with_commitment(mut self, commitment: CommitmentLevel) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }
}
