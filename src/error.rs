use solana_rpc_client_api::client_error::{Error as ClientError, ErrorKind as ClientErrorKind};
use solana_sdk::{
    pubkey::Pubkey, signature::Signature, signer::SignerError, transaction::TransactionError,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

/// Every failure the client can surface to its caller.
///
/// Ledger interaction failures are never swallowed; the only place that catches
/// and continues is the diagnostics report.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("wallet not ready: {0}")]
    WalletNotReady(String),

    #[error("no viable bump seed for program {program_id}")]
    AddressSpaceExhausted { program_id: Pubkey },

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("simulation failed: {err}")]
    SimulationFailed {
        err: TransactionError,
        logs: Vec<String>,
        units_consumed: Option<u64>,
    },

    #[error(
        "transaction {signature} expired at block height {last_valid_block_height} without confirmation, outcome unknown"
    )]
    TransactionExpired {
        signature: Signature,
        last_valid_block_height: u64,
    },

    /// The send request failed in transit; the node may still have forwarded it.
    #[error("sending transaction {signature} failed in transit, outcome unknown: {source}")]
    SendUnconfirmed {
        signature: Signature,
        source: Box<ClientError>,
    },

    #[error("stopped waiting for transaction {signature}, outcome unknown")]
    ConfirmationTimedOut { signature: Signature },

    #[error("transaction failed: {err}")]
    TransactionFailed {
        signature: Option<Signature>,
        err: TransactionError,
    },

    #[error("transaction is {size} bytes, limit is {limit}")]
    TransactionTooLarge { size: usize, limit: usize },

    #[error("malformed account {address}: expected at least {expected} bytes, got {actual}")]
    MalformedAccount {
        address: Pubkey,
        expected: usize,
        actual: usize,
    },

    #[error("invalid account data for {address}: {reason}")]
    InvalidAccountData { address: Pubkey, reason: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("network degraded: average latency {average_latency_ms:.0}ms")]
    NetworkDegraded { average_latency_ms: f64 },

    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("rpc error: {0}")]
    Rpc(Box<ClientError>),

    #[error("token creation failed: {0}")]
    TokenCreation(#[source] Box<SdkError>),

    #[error("pool creation failed: {0}")]
    PoolCreation(#[source] Box<SdkError>),

    #[error("swap failed: {0}")]
    Swap(#[source] Box<SdkError>),
}

impl From<ClientError> for SdkError {
    fn from(err: ClientError) -> Self {
        SdkError::Rpc(Box::new(err))
    }
}

impl SdkError {
    /// Unwraps the boundary wrappers (`TokenCreation`, `PoolCreation`, `Swap`).
    pub fn root_cause(&self) -> &SdkError {
        match self {
            SdkError::TokenCreation(inner)
            | SdkError::PoolCreation(inner)
            | SdkError::Swap(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Transport-level failures raised before anything was sent.
    ///
    /// A transport failure of the send itself is [`SdkError::SendUnconfirmed`] instead.
    pub fn is_transient(&self) -> bool {
        match self.root_cause() {
            SdkError::Rpc(err) => is_transport(err),
            _ => false,
        }
    }

    /// The transaction may or may not have landed; history must be checked before resubmitting.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(
            self.root_cause(),
            SdkError::TransactionExpired { .. }
                | SdkError::ConfirmationTimedOut { .. }
                | SdkError::SendUnconfirmed { .. }
        )
    }

    pub(crate) fn rpc_custom(message: impl Into<String>) -> Self {
        SdkError::from(ClientError::from(ClientErrorKind::Custom(message.into())))
    }
}

pub(crate) fn is_transport(err: &ClientError) -> bool {
    matches!(
        err.kind(),
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_)
    )
}
