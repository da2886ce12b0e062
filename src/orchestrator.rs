//! Transaction assembly, signing, submission and confirmation.
//!
//! A transaction moves through `Built -> Signed -> Simulated -> Submitted` and ends
//! `Confirmed`, `Failed`, `Expired` or `TimedOut`. Each call makes exactly one
//! submission attempt; resubmitting is left to the caller (see [`crate::RetryPolicy`]).

use std::sync::Arc;
use std::time::Instant;

use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;
use tokio::time::{Duration, sleep};

use crate::error::{Result, SdkError, is_transport};
use crate::rpc::{LedgerRpc, SignatureState};
use crate::wallet::WalletSigner;

/// Consecutive status poll errors tolerated before confirmation is abandoned
pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStage {
    Built,
    Signed,
    Simulated,
    Submitted,
    Confirmed,
    Failed,
    Expired,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeBudget {
    pub unit_limit: u32,
    /// Micro-lamports per compute unit
    pub unit_price: Option<u64>,
}

impl ComputeBudget {
    pub fn new(unit_limit: u32) -> Self {
        Self {
            unit_limit,
            unit_price: None,
        }
    }

    pub fn with_unit_price(mut self, micro_lamports: u64) -> Self {
        self.unit_price = Some(micro_lamports);
        self
    }

    fn instructions(&self) -> Vec<Instruction> {
        let mut instructions = vec![ComputeBudgetInstruction::set_compute_unit_limit(
            self.unit_limit,
        )];
        if let Some(price) = self.unit_price {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
        }
        instructions
    }
}

/// Knobs for one submission
#[derive(Debug, Clone)]
pub struct SubmitPolicy {
    pub compute_budget: Option<ComputeBudget>,
    /// Dry run before sending
    pub simulate: bool,
    /// When false a failed dry run is logged and the transaction is sent anyway
    pub abort_on_simulation_failure: bool,
    pub skip_preflight: bool,
    pub poll_interval: Duration,
    /// Stop watching before the blockhash expires
    pub confirmation_timeout: Option<Duration>,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            compute_budget: None,
            simulate: true,
            abort_on_simulation_failure: true,
            skip_preflight: false,
            poll_interval: Duration::from_millis(500),
            confirmation_timeout: None,
        }
    }
}

impl SubmitPolicy {
    pub fn with_compute_budget(mut self, budget: ComputeBudget) -> Self {
        self.compute_budget = Some(budget);
        self
    }

    pub fn allow_simulation_failure(mut self) -> Self {
        self.abort_on_simulation_failure = false;
        self
    }

    pub fn without_simulation(mut self) -> Self {
        self.simulate = false;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = Some(timeout);
        self
    }
}

/// A transaction that has been handed to the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub signature: Signature,
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

pub struct TransactionOrchestrator {
    rpc: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSigner>,
}

impl TransactionOrchestrator {
    pub fn new(rpc: Arc<dyn LedgerRpc>, wallet: Arc<dyn WalletSigner>) -> Self {
        Self { rpc, wallet }
    }

    /// The connected wallet pays fees
    pub fn fee_payer(&self) -> Result<Pubkey> {
        self.wallet
            .pubkey()
            .ok_or_else(|| SdkError::WalletNotReady("no wallet connected".into()))
    }

    /// Build, sign and optionally simulate, then send once and wait for confirmation.
    ///
    /// # Arguments
    /// * `instructions` - Instructions in execution order, compute budget excluded
    /// * `extra_signers` - Ephemeral keypairs referenced by the instructions (e.g. a new mint)
    /// * `policy` - Compute budget, simulation and confirmation settings
    ///
    /// # Returns
    /// The confirmed transaction signature
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
        policy: &SubmitPolicy,
    ) -> Result<Signature> {
        let submitted = self.send(instructions, extra_signers, policy).await?;
        self.confirm(&submitted, policy).await
    }

    /// Everything up to and including the single send attempt.
    pub async fn send(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
        policy: &SubmitPolicy,
    ) -> Result<SubmittedTransaction> {
        let (transaction, last_valid_block_height) =
            self.build_and_sign(instructions, extra_signers, policy).await?;

        if policy.simulate {
            self.simulate(&transaction, policy).await?;
        }

        let signature = match self
            .rpc
            .send_transaction(&transaction, policy.skip_preflight)
            .await
        {
            Ok(signature) => signature,
            Err(SdkError::Rpc(err)) if is_transport(&err) => {
                let signature = transaction.signatures[0];
                log::warn!("{signature}: send failed in transit, outcome unknown: {err}");
                return Err(SdkError::SendUnconfirmed {
                    signature,
                    source: err,
                });
            }
            Err(err) => return Err(err),
        };
        log::info!("transaction {signature} submitted");
        log::debug!("{signature}: {:?}", TransactionStage::Submitted);

        Ok(SubmittedTransaction {
            signature,
            blockhash: transaction.message.recent_blockhash,
            last_valid_block_height,
        })
    }

    /// Fetches the validity anchor, then signs: the wallet first, ephemeral keys after.
    pub async fn build_and_sign(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
        policy: &SubmitPolicy,
    ) -> Result<(Transaction, u64)> {
        let payer = self.fee_payer()?;

        let mut all_instructions = policy
            .compute_budget
            .map(|budget| budget.instructions())
            .unwrap_or_default();
        all_instructions.extend_from_slice(instructions);

        let mut transaction = Transaction::new_with_payer(&all_instructions, Some(&payer));
        log::debug!(
            "{} instructions: {:?}",
            all_instructions.len(),
            TransactionStage::Built
        );

        let (blockhash, last_valid_block_height) = self.rpc.get_latest_blockhash().await?;
        transaction.message.recent_blockhash = blockhash;

        let mut transaction = self.wallet.sign_transaction(transaction).await?;
        if !extra_signers.is_empty() {
            transaction.try_partial_sign(extra_signers, blockhash)?;
        }
        if !transaction.is_signed() {
            return Err(SdkError::WalletNotReady(
                "transaction is missing required signatures".into(),
            ));
        }
        log::debug!("{}: {:?}", transaction.signatures[0], TransactionStage::Signed);

        let size = bincode::serialize(&transaction)
            .map_err(|e| SdkError::InvalidParameter(format!("cannot serialize transaction: {e}")))?
            .len();
        if size > PACKET_DATA_SIZE {
            return Err(SdkError::TransactionTooLarge {
                size,
                limit: PACKET_DATA_SIZE,
            });
        }

        Ok((transaction, last_valid_block_height))
    }

    async fn simulate(&self, transaction: &Transaction, policy: &SubmitPolicy) -> Result<()> {
        let outcome = match self.rpc.simulate_transaction(transaction).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // an unreachable simulator says nothing about the transaction itself
                log::warn!("simulation unavailable, sending without dry run: {e}");
                return Ok(());
            }
        };

        let Some(err) = outcome.err else {
            log::debug!(
                "{}: {:?} ({:?} units)",
                transaction.signatures[0],
                TransactionStage::Simulated,
                outcome.units_consumed
            );
            return Ok(());
        };

        for line in &outcome.logs {
            log::warn!("simulation log: {line}");
        }
        if policy.abort_on_simulation_failure {
            return Err(SdkError::SimulationFailed {
                err,
                logs: outcome.logs,
                units_consumed: outcome.units_consumed,
            });
        }
        log::warn!("simulation failed ({err}), submitting anyway");
        Ok(())
    }

    /// Polls until the signature reaches the commitment level, fails, or its blockhash expires.
    ///
    /// RPC errors while polling are logged and polling continues. After
    /// [`MAX_CONSECUTIVE_POLL_FAILURES`] in a row it gives up with `ConfirmationTimedOut`.
    pub async fn confirm(
        &self,
        submitted: &SubmittedTransaction,
        policy: &SubmitPolicy,
    ) -> Result<Signature> {
        let signature = submitted.signature;
        let started = Instant::now();
        let mut poll_failures = 0;

        loop {
            match self.poll(submitted).await {
                Ok(Some(done)) => return done,
                Ok(None) => poll_failures = 0,
                Err(e) => {
                    poll_failures += 1;
                    log::warn!(
                        "{signature}: status poll failed ({poll_failures}/{MAX_CONSECUTIVE_POLL_FAILURES}): {e}"
                    );
                    if poll_failures >= MAX_CONSECUTIVE_POLL_FAILURES {
                        log::warn!("{signature}: {:?}", TransactionStage::TimedOut);
                        return Err(SdkError::ConfirmationTimedOut { signature });
                    }
                }
            }

            if let Some(timeout) = policy.confirmation_timeout {
                if started.elapsed() >= timeout {
                    log::warn!("{signature}: {:?}", TransactionStage::TimedOut);
                    return Err(SdkError::ConfirmationTimedOut { signature });
                }
            }

            sleep(policy.poll_interval).await;
        }
    }

    /// One status round; `None` while the transaction is still pending.
    async fn poll(&self, submitted: &SubmittedTransaction) -> Result<Option<Result<Signature>>> {
        let signature = submitted.signature;
        let state = self.rpc.get_signature_state(&signature, false).await?;
        if let Some(done) = settle(&signature, state) {
            return Ok(Some(done));
        }

        let block_height = self.rpc.get_block_height().await?;
        if block_height <= submitted.last_valid_block_height {
            return Ok(None);
        }

        // it may still have landed in the last valid block
        match self.rpc.get_signature_state(&signature, true).await {
            Ok(state) => {
                if let Some(done) = settle(&signature, state) {
                    return Ok(Some(done));
                }
            }
            Err(e) => log::warn!("{signature}: history lookup failed: {e}"),
        }
        log::warn!(
            "{signature}: {:?} at block height {block_height}",
            TransactionStage::Expired
        );
        Ok(Some(Err(SdkError::TransactionExpired {
            signature,
            last_valid_block_height: submitted.last_valid_block_height,
        })))
    }

    /// Looks the signature up in transaction history, for callers resolving an unknown outcome.
    pub async fn reconcile(&self, signature: &Signature) -> Result<Option<SignatureState>> {
        self.rpc.get_signature_state(signature, true).await
    }
}

fn settle(signature: &Signature, state: Option<SignatureState>) -> Option<Result<Signature>> {
    let state = state?;
    if let Some(err) = state.err {
        log::warn!("{signature}: {:?} ({err})", TransactionStage::Failed);
        return Some(Err(SdkError::TransactionFailed {
            signature: Some(*signature),
            err,
        }));
    }
    if state.confirmed {
        log::info!("transaction {signature} confirmed in slot {}", state.slot);
        return Some(Ok(*signature));
    }
    None
}
