use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;

use crate::error::{Result, SdkError};

/// Signing capability of a connected wallet.
///
/// `pubkey` is `None` while nothing is connected. `sign_transaction` adds the
/// wallet's signature for the transaction's current blockhash and leaves any other
/// signature slots untouched.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn pubkey(&self) -> Option<Pubkey>;

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction>;
}

/// Local keypair wallet
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        solana_sdk::signature::read_keypair_file(path)
            .map(Self::new)
            .map_err(|e| SdkError::WalletNotReady(format!("cannot read keypair {path}: {e}")))
    }
}

#[async_trait]
impl WalletSigner for KeypairWallet {
    fn pubkey(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let blockhash = transaction.message.recent_blockhash;
        transaction.try_partial_sign(&[&self.keypair], blockhash)?;
        Ok(transaction)
    }
}

/// Known address without signing ability, enough for reads and diagnostics
pub struct WatchOnlyWallet {
    address: Pubkey,
}

impl WatchOnlyWallet {
    pub fn new(address: Pubkey) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletSigner for WatchOnlyWallet {
    fn pubkey(&self) -> Option<Pubkey> {
        Some(self.address)
    }

    async fn sign_transaction(&self, _transaction: Transaction) -> Result<Transaction> {
        Err(SdkError::WalletNotReady(format!(
            "{} is watch-only and cannot sign",
            self.address
        )))
    }
}

/// No wallet connected
#[derive(Debug, Default)]
pub struct Disconnected;

#[async_trait]
impl WalletSigner for Disconnected {
    fn pubkey(&self) -> Option<Pubkey> {
        None
    }

    async fn sign_transaction(&self, _transaction: Transaction) -> Result<Transaction> {
        Err(SdkError::WalletNotReady("no wallet connected".into()))
    }
}
