//! The ledger RPC capability the rest of the client is written against.
//!
//! [`LedgerRpc`] is implemented for the nonblocking [`RpcClient`]; tests plug in
//! their own implementation.

use async_trait::async_trait;
use serde_json::Value;
use solana_account_decoder::UiAccountData;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_rpc_client_api::config::{RpcSendTransactionConfig, RpcSimulateTransactionConfig};
use solana_rpc_client_api::request::{MAX_MULTIPLE_ACCOUNTS, TokenAccountsFilter};
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use std::str::FromStr;

use crate::error::{Result, SdkError};

/// Result of a dry run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimulationOutcome {
    pub err: Option<TransactionError>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

/// Ledger view of a submitted signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureState {
    /// Reached the client's commitment level
    pub confirmed: bool,
    pub slot: u64,
    pub err: Option<TransactionError>,
}

/// A token account as reported by the node's parsed account encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub decimals: u8,
    pub token_program: Pubkey,
}

/// One entry of an address's transaction history, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub signature: Signature,
    pub slot: u64,
    pub err: Option<TransactionError>,
    pub block_time: Option<i64>,
}

#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Validity anchor: blockhash and the last block height it is accepted at
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64)>;

    async fn get_block_height(&self) -> Result<u64>;

    async fn get_slot(&self) -> Result<u64>;

    /// Node software version
    async fn get_version(&self) -> Result<String>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    /// `None` when the account was never created
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>>;

    async fn get_token_balances_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<TokenBalance>>;

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64>;

    async fn simulate_transaction(&self, transaction: &Transaction) -> Result<SimulationOutcome>;

    /// A rejection carrying a ledger error maps to `TransactionFailed`
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        skip_preflight: bool,
    ) -> Result<Signature>;

    async fn get_signature_state(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> Result<Option<SignatureState>>;

    /// Most recent transactions touching `address`
    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>>;
}

#[async_trait]
impl LedgerRpc for RpcClient {
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64)> {
        Ok(self.get_latest_blockhash_with_commitment(self.commitment()).await?)
    }

    async fn get_block_height(&self) -> Result<u64> {
        Ok(RpcClient::get_block_height(self).await?)
    }

    async fn get_slot(&self) -> Result<u64> {
        Ok(RpcClient::get_slot(self).await?)
    }

    async fn get_version(&self) -> Result<String> {
        Ok(RpcClient::get_version(self).await?.solana_core)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        Ok(RpcClient::get_balance(self, address).await?)
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self
            .get_account_with_commitment(address, self.commitment())
            .await?
            .value)
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            let response = self
                .get_multiple_accounts_with_commitment(chunk, self.commitment())
                .await?;
            accounts.extend(response.value);
        }
        Ok(accounts)
    }

    async fn get_token_balances_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<TokenBalance>> {
        let keyed_accounts = self
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(*token_program))
            .await?;

        Ok(keyed_accounts
            .into_iter()
            .filter_map(|keyed| {
                let UiAccountData::Json(parsed) = &keyed.account.data else {
                    log::warn!("token account {} was not returned as parsed json", keyed.pubkey);
                    return None;
                };
                let balance = parse_token_balance(&keyed.pubkey, &parsed.parsed, token_program);
                if balance.is_none() {
                    log::warn!("skipping undecodable token account {}", keyed.pubkey);
                }
                balance
            })
            .collect())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(RpcClient::get_minimum_balance_for_rent_exemption(self, data_len).await?)
    }

    async fn simulate_transaction(&self, transaction: &Transaction) -> Result<SimulationOutcome> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            commitment: Some(self.commitment()),
            ..RpcSimulateTransactionConfig::default()
        };
        let result = self
            .simulate_transaction_with_config(transaction, config)
            .await?
            .value;

        Ok(SimulationOutcome {
            err: result.err,
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        skip_preflight: bool,
    ) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight,
            preflight_commitment: Some(self.commitment().commitment),
            max_retries: Some(1),
            ..RpcSendTransactionConfig::default()
        };

        match self.send_transaction_with_config(transaction, config).await {
            Ok(signature) => Ok(signature),
            Err(err) => match err.get_transaction_error() {
                Some(tx_err) => Err(SdkError::TransactionFailed {
                    signature: transaction.signatures.first().copied(),
                    err: tx_err,
                }),
                None => Err(err.into()),
            },
        }
    }

    async fn get_signature_state(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> Result<Option<SignatureState>> {
        let statuses = if search_history {
            self.get_signature_statuses_with_history(&[*signature]).await?
        } else {
            self.get_signature_statuses(&[*signature]).await?
        };
        let commitment = self.commitment();

        Ok(statuses
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| SignatureState {
                confirmed: status.satisfies_commitment(commitment),
                slot: status.slot,
                err: status.err,
            }))
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(limit),
            commitment: Some(self.commitment()),
            ..GetConfirmedSignaturesForAddress2Config::default()
        };
        let statuses = self
            .get_signatures_for_address_with_config(address, config)
            .await?;

        Ok(statuses
            .into_iter()
            .filter_map(|status| {
                let signature = Signature::from_str(&status.signature)
                    .inspect_err(|e| log::warn!("skipping signature {}: {e}", status.signature))
                    .ok()?;
                Some(SignatureRecord {
                    signature,
                    slot: status.slot,
                    err: status.err,
                    block_time: status.block_time,
                })
            })
            .collect())
    }
}

/// Reads the `info` object of a `jsonParsed` token account.
pub(crate) fn parse_token_balance(
    address: &str,
    parsed: &Value,
    token_program: &Pubkey,
) -> Option<TokenBalance> {
    let info = parsed.get("info")?;
    let token_amount = info.get("tokenAmount")?;

    Some(TokenBalance {
        address: Pubkey::from_str(address).ok()?,
        mint: Pubkey::from_str(info.get("mint")?.as_str()?).ok()?,
        amount: token_amount.get("amount")?.as_str()?.parse().ok()?,
        decimals: u8::try_from(token_amount.get("decimals")?.as_u64()?).ok()?,
        token_program: *token_program,
    })
}
