// Operation inputs, validated before anything is encoded

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::constants::{MAX_TOKEN_NAME_LEN, MAX_TOKEN_SYMBOL_LEN};
use crate::error::{Result, SdkError};

/// Compliance hook attached to a newly created token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookType {
    #[default]
    None,
    Kyc,
    Whitelist,
}

/// Create token parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTokenParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64, // raw units
    pub hook_type: HookType,
}

impl CreateTokenParams {
    /// Rejects inputs the encoder would otherwise truncate.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SdkError::InvalidParameter("token name is empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(SdkError::InvalidParameter("token symbol is empty".into()));
        }
        if self.name.chars().any(char::is_control) {
            return Err(SdkError::InvalidParameter(
                "token name contains control characters".into(),
            ));
        }
        if self.symbol.chars().any(char::is_control) {
            return Err(SdkError::InvalidParameter(
                "token symbol contains control characters".into(),
            ));
        }
        if self.name.len() > MAX_TOKEN_NAME_LEN {
            return Err(SdkError::InvalidParameter(format!(
                "token name is {} bytes, at most {MAX_TOKEN_NAME_LEN} allowed",
                self.name.len()
            )));
        }
        if self.symbol.len() > MAX_TOKEN_SYMBOL_LEN {
            return Err(SdkError::InvalidParameter(format!(
                "token symbol is {} bytes, at most {MAX_TOKEN_SYMBOL_LEN} allowed",
                self.symbol.len()
            )));
        }
        if self.total_supply == 0 {
            return Err(SdkError::InvalidParameter("total supply must be positive".into()));
        }
        Ok(())
    }
}

/// Create pool parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PoolCreateParams {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub initial_price: f64, // token_b per token_a
}

impl PoolCreateParams {
    pub fn validate(&self) -> Result<()> {
        if self.token_a == self.token_b {
            return Err(SdkError::InvalidParameter(
                "pool tokens must be different mints".into(),
            ));
        }
        if !self.initial_price.is_finite() || self.initial_price <= 0.0 {
            return Err(SdkError::InvalidParameter(format!(
                "initial price {} must be a positive number",
                self.initial_price
            )));
        }
        Ok(())
    }
}

/// Swap parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
    pub a_to_b: bool,
}

impl SwapParams {
    pub fn validate(&self) -> Result<()> {
        if self.token_a == self.token_b {
            return Err(SdkError::InvalidParameter("cannot swap a token for itself".into()));
        }
        if self.amount_in == 0 {
            return Err(SdkError::InvalidParameter("swap amount must be positive".into()));
        }
        Ok(())
    }
}

/// Minimum output after applying a slippage tolerance in basis points
pub fn minimum_amount_out(expected_out: u64, slippage_bps: u16) -> u64 {
    let slippage_bps = u128::from(slippage_bps.min(10_000));
    let min = u128::from(expected_out) * (10_000 - slippage_bps) / 10_000;
    min as u64
}

/// Add liquidity parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
}

impl AddLiquidityParams {
    pub fn validate(&self) -> Result<()> {
        if self.token_a == self.token_b {
            return Err(SdkError::InvalidParameter(
                "pool tokens must be different mints".into(),
            ));
        }
        if self.amount_a == 0 && self.amount_b == 0 {
            return Err(SdkError::InvalidParameter(
                "at least one liquidity amount must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// KYC record creation, signed by the kyc authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateKycRecordParams {
    pub user: Pubkey,
    pub kyc_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateKycStatusParams {
    pub user: Pubkey,
    pub is_verified: bool,
    pub kyc_level: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn token(name: &str, symbol: &str) -> CreateTokenParams {
        CreateTokenParams {
            name: name.into(),
            symbol: symbol.into(),
            decimals: 9,
            total_supply: 1_000_000,
            hook_type: HookType::None,
        }
    }

    #[test]
    fn symbol_budget_boundary() {
        assert!(token("Test Token", "ABCDEFGHIJ").validate().is_ok());
        assert_matches!(
            token("Test Token", "ABCDEFGHIJK").validate(),
            Err(SdkError::InvalidParameter(msg)) if msg.contains("11 bytes")
        );
    }

    #[test]
    fn name_budget_counts_bytes() {
        // 25 two-byte characters fill the budget exactly
        assert!(token(&"é".repeat(25), "T").validate().is_ok());
        assert!(token(&"é".repeat(26), "T").validate().is_err());
    }

    #[test]
    fn control_characters_are_rejected() {
        assert_matches!(
            token("Test\nToken", "TEST").validate(),
            Err(SdkError::InvalidParameter(msg)) if msg.contains("name")
        );
        assert_matches!(
            token("Test Token", "TE\u{0}ST").validate(),
            Err(SdkError::InvalidParameter(msg)) if msg.contains("symbol")
        );
        assert!(token("Tëst Tøken", "TËST").validate().is_ok());
    }

    #[test]
    fn pool_params_reject_bad_price() {
        let params = PoolCreateParams {
            token_a: Pubkey::new_unique(),
            token_b: Pubkey::new_unique(),
            initial_price: f64::NAN,
        };
        assert!(params.validate().is_err());
        assert!(PoolCreateParams { initial_price: 1.5, ..params }.validate().is_ok());
    }

    #[test]
    fn slippage() {
        assert_eq!(minimum_amount_out(1_000_000, 50), 995_000);
        assert_eq!(minimum_amount_out(1_000_000, 0), 1_000_000);
        assert_eq!(minimum_amount_out(u64::MAX, 10_000), 0);
    }
}
