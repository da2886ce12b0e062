use std::sync::Arc;

use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use crate::config::ClientConfig;
use crate::constants::{
    ADD_LIQUIDITY_COMPUTE_UNITS, CREATE_POOL_COMPUTE_UNITS, CREATE_TOKEN_COMPUTE_UNIT_PRICE,
    CREATE_TOKEN_COMPUTE_UNITS, KYC_COMPUTE_UNITS, SWAP_COMPUTE_UNITS,
};
use crate::error::{Result, SdkError};
use crate::instructions::InstructionBuilder;
use crate::orchestrator::{ComputeBudget, SubmitPolicy, TransactionOrchestrator};
use crate::params::{
    AddLiquidityParams, CreateKycRecordParams, CreateTokenParams, PoolCreateParams, SwapParams,
    UpdateKycStatusParams,
};
use crate::reader::{AccountReader, TokenDescriptor};
use crate::retry::RetryPolicy;
use crate::rpc::{LedgerRpc, SignatureState};
use crate::state::{ComplianceRecord, PoolDescriptor};
use crate::utils::{explorer_address_url, explorer_tx_url};
use crate::wallet::WalletSigner;

#[cfg(feature = "diagnostics")]
use crate::config::ProgramName;
#[cfg(feature = "diagnostics")]
use crate::diagnostics::{Diagnostics, HealthReport};
#[cfg(feature = "diagnostics")]
use std::collections::BTreeMap;

/// A confirmed token creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedToken {
    pub signature: Signature,
    pub mint: Pubkey,
}

pub struct HookSwapSDK {
    config: ClientConfig,
    rpc: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSigner>,
    builder: InstructionBuilder,
    orchestrator: TransactionOrchestrator,
    reader: AccountReader,
    retry: RetryPolicy,
}

impl HookSwapSDK {
    /// Create a new HookSwap SDK instance talking to `config.rpc_url`
    pub fn new(config: ClientConfig, wallet: Arc<dyn WalletSigner>) -> Self {
        let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment_config());
        Self::with_rpc(config, Arc::new(rpc), wallet)
    }

    /// Create an instance over any RPC implementation
    pub fn with_rpc(
        config: ClientConfig,
        rpc: Arc<dyn LedgerRpc>,
        wallet: Arc<dyn WalletSigner>,
    ) -> Self {
        Self {
            builder: InstructionBuilder::new(config.programs.clone()),
            orchestrator: TransactionOrchestrator::new(rpc.clone(), wallet.clone()),
            reader: AccountReader::new(rpc.clone(), config.programs.clone()),
            retry: RetryPolicy::none(),
            config,
            rpc,
            wallet,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rpc(&self) -> &Arc<dyn LedgerRpc> {
        &self.rpc
    }

    pub fn builder(&self) -> &InstructionBuilder {
        &self.builder
    }

    pub fn orchestrator(&self) -> &TransactionOrchestrator {
        &self.orchestrator
    }

    pub fn reader(&self) -> &AccountReader {
        &self.reader
    }

    pub fn wallet_address(&self) -> Option<Pubkey> {
        self.wallet.pubkey()
    }

    /// Create a Token-2022 token with an optional compliance hook
    ///
    /// Every attempt generates a fresh mint, so a retry after an expired
    /// submission can never create the same token twice.
    ///
    /// # Arguments
    /// * `params` - Name, symbol, decimals, supply and hook type
    ///
    /// # Returns
    /// The confirmed signature and the new mint address
    pub async fn create_token(&self, params: &CreateTokenParams) -> Result<CreatedToken> {
        self.create_token_inner(params)
            .await
            .map_err(|e| SdkError::TokenCreation(Box::new(e)))
    }

    async fn create_token_inner(&self, params: &CreateTokenParams) -> Result<CreatedToken> {
        let payer = self.orchestrator.fee_payer()?;
        let policy = SubmitPolicy::default().with_compute_budget(
            ComputeBudget::new(CREATE_TOKEN_COMPUTE_UNITS)
                .with_unit_price(CREATE_TOKEN_COMPUTE_UNIT_PRICE),
        );
        let policy = &policy;

        self.retry
            .run(true, move |attempt| async move {
                let mint = Keypair::new();
                log::info!(
                    "creating token {} ({}) with mint {}, attempt {attempt}",
                    params.symbol,
                    params.name,
                    mint.pubkey()
                );
                let ix = self.builder.create_token(params, &mint.pubkey(), &payer)?;
                let signature = self.orchestrator.submit(&[ix], &[&mint], policy).await?;

                Ok(CreatedToken {
                    signature,
                    mint: mint.pubkey(),
                })
            })
            .await
    }

    /// Whether `user` holds a verified KYC record. An account that was never created reads as `false`.
    pub async fn check_compliance_status(&self, user: &Pubkey) -> Result<bool> {
        Ok(self
            .reader
            .get_kyc_record(user)
            .await?
            .is_some_and(|record| record.is_verified))
    }

    pub async fn get_kyc_record(&self, user: &Pubkey) -> Result<Option<ComplianceRecord>> {
        self.reader.get_kyc_record(user).await
    }

    /// Create a pool for the ordered pair `(token_a, token_b)`
    ///
    /// # Arguments
    /// * `params` - Both mints and the initial price of token_a in token_b
    ///
    /// # Returns
    /// The confirmed signature
    pub async fn create_pool(&self, params: &PoolCreateParams) -> Result<Signature> {
        self.create_pool_inner(params)
            .await
            .map_err(|e| SdkError::PoolCreation(Box::new(e)))
    }

    async fn create_pool_inner(&self, params: &PoolCreateParams) -> Result<Signature> {
        let instructions = self.create_pool_ix(params)?;
        let policy = SubmitPolicy::default()
            .with_compute_budget(ComputeBudget::new(CREATE_POOL_COMPUTE_UNITS));
        self.submit_once(&instructions, &policy).await
    }

    pub fn create_pool_ix(&self, params: &PoolCreateParams) -> Result<Vec<Instruction>> {
        let payer = self.orchestrator.fee_payer()?;
        Ok(vec![self.builder.create_pool(params, &payer)?])
    }

    /// Swap through the pair's pool
    ///
    /// The user's token accounts for both mints are created first when missing.
    /// A swap is never resubmitted automatically: an expired result may still have
    /// landed, use [`HookSwapSDK::reconcile`] before trying again.
    ///
    /// # Arguments
    /// * `params` - Pair, direction, input amount and minimum output
    ///
    /// # Returns
    /// The confirmed signature
    pub async fn execute_swap(&self, params: &SwapParams) -> Result<Signature> {
        self.execute_swap_inner(params)
            .await
            .map_err(|e| SdkError::Swap(Box::new(e)))
    }

    async fn execute_swap_inner(&self, params: &SwapParams) -> Result<Signature> {
        let instructions = self.swap_ix(params)?;
        let policy =
            SubmitPolicy::default().with_compute_budget(ComputeBudget::new(SWAP_COMPUTE_UNITS));
        self.submit_once(&instructions, &policy).await
    }

    pub fn swap_ix(&self, params: &SwapParams) -> Result<Vec<Instruction>> {
        let user = self.orchestrator.fee_payer()?;
        let swap = self.builder.swap(params, &user)?;

        let mut instructions = self.builder.create_user_token_accounts(
            &user,
            &user,
            &[params.token_a, params.token_b],
        );
        instructions.push(swap);
        Ok(instructions)
    }

    /// Deposit both sides of a pair into its pool
    pub async fn add_liquidity(&self, params: &AddLiquidityParams) -> Result<Signature> {
        let instructions = self.add_liquidity_ix(params)?;
        let policy = SubmitPolicy::default()
            .with_compute_budget(ComputeBudget::new(ADD_LIQUIDITY_COMPUTE_UNITS));
        self.submit_once(&instructions, &policy).await
    }

    pub fn add_liquidity_ix(&self, params: &AddLiquidityParams) -> Result<Vec<Instruction>> {
        let user = self.orchestrator.fee_payer()?;

        let mut instructions = self.builder.create_user_token_accounts(
            &user,
            &user,
            &[params.token_a, params.token_b],
        );
        instructions.push(self.builder.add_liquidity(params, &user)?);
        Ok(instructions)
    }

    /// One-time setup of the KYC hook, signed by its authority
    pub async fn initialize_kyc_system(&self) -> Result<Signature> {
        let authority = self.orchestrator.fee_payer()?;
        let ix = self.builder.initialize_kyc_system(&authority)?;
        self.submit_once(&[ix], &Self::kyc_policy()).await
    }

    pub async fn create_kyc_record(&self, params: &CreateKycRecordParams) -> Result<Signature> {
        let authority = self.orchestrator.fee_payer()?;
        let ix = self.builder.create_kyc_record(params, &authority)?;
        self.submit_once(&[ix], &Self::kyc_policy()).await
    }

    pub async fn update_kyc_status(&self, params: &UpdateKycStatusParams) -> Result<Signature> {
        let authority = self.orchestrator.fee_payer()?;
        let ix = self.builder.update_kyc_status(params, &authority)?;
        self.submit_once(&[ix], &Self::kyc_policy()).await
    }

    fn kyc_policy() -> SubmitPolicy {
        SubmitPolicy::default().with_compute_budget(ComputeBudget::new(KYC_COMPUTE_UNITS))
    }

    /// Transport failures are retried, unknown outcomes are not.
    async fn submit_once(&self, instructions: &[Instruction], policy: &SubmitPolicy) -> Result<Signature> {
        self.retry
            .run(false, move |_| self.orchestrator.submit(instructions, &[], policy))
            .await
    }

    /// Token holdings of the connected wallet
    pub async fn get_user_token_accounts(&self) -> Result<Vec<TokenDescriptor>> {
        let owner = self.orchestrator.fee_payer()?;
        self.reader.get_token_accounts(&owner).await
    }

    pub async fn get_pool(&self, token_a: &Pubkey, token_b: &Pubkey) -> Result<Option<PoolDescriptor>> {
        self.reader.get_pool(token_a, token_b).await
    }

    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.reader.get_balance(address).await
    }

    /// Looks up a signature whose outcome is unknown, e.g. after `TransactionExpired`.
    pub async fn reconcile(&self, signature: &Signature) -> Result<Option<SignatureState>> {
        self.orchestrator.reconcile(signature).await
    }

    pub fn explorer_tx_url(&self, signature: &Signature) -> String {
        explorer_tx_url(signature, self.config.network)
    }

    pub fn explorer_address_url(&self, address: &Pubkey) -> String {
        explorer_address_url(address, self.config.network)
    }

    #[cfg(feature = "diagnostics")]
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.config.clone(), self.rpc.clone(), self.wallet.clone())
    }

    /// Deployment flag of each of the five programs
    #[cfg(feature = "diagnostics")]
    pub async fn validate_programs(&self) -> BTreeMap<ProgramName, bool> {
        self.diagnostics().check_programs_deployed().await
    }

    #[cfg(feature = "diagnostics")]
    pub async fn run_health_check(&self) -> HealthReport {
        self.diagnostics().run_health_check().await
    }
}
