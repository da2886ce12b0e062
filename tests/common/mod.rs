#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hookswap_sdk::{
    ClientConfig, HookSwapSDK, LedgerRpc, ProgramName, ProgramRegistry, Result, SdkError,
    SignatureRecord, SignatureState, SimulationOutcome, TokenBalance, WalletSigner,
};
use solana_rpc_client_api::client_error::Error as ClientError;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_token_2022::extension::{AccountType, ExtensionType};
use spl_token_2022::solana_program::program_option::COption;
use spl_token_2022::solana_program::program_pack::Pack;
use spl_token_2022::state::Mint;

// ---------------------------------------------------------------------------
// Program IDs
// ---------------------------------------------------------------------------
pub const TOKEN_LAYER: Pubkey = pubkey!("HJ4MosN8hG5qd6WFMKQcBmYVhHuX1EKdPZ1LyaPSdYLA");
pub const AMM: Pubkey = pubkey!("4SCHMFNpFoHEbaMzgHHPpCKgtfHEuujbdwZsqNH2uC13");
pub const KYC_HOOK: Pubkey = pubkey!("76V7AeKynXT5e53XFzYXKZc5BoPAhSVqpyRbq1pAf4YC");
pub const HOOK_REGISTRY: Pubkey = pubkey!("6guQ6trdmPmnfqgZwgiBPW7wVzEZuzWKNRzagHxveC88");
pub const WHITELIST_HOOK: Pubkey = pubkey!("7Q3jm9Wqnpgg6SfUn2tujhSAiNaW1NvW74Ai821FEP93");

pub const RPC_URL: &str = "https://api.devnet.solana.com";
pub const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

pub fn programs() -> ProgramRegistry {
    ProgramRegistry::new(TOKEN_LAYER, AMM, KYC_HOOK, HOOK_REGISTRY, WHITELIST_HOOK)
}

pub fn config() -> ClientConfig {
    ClientConfig::new(RPC_URL, programs()).unwrap()
}

pub fn sdk(rpc: &Arc<MockRpc>, wallet: impl WalletSigner + 'static) -> HookSwapSDK {
    HookSwapSDK::with_rpc(config(), rpc.clone(), Arc::new(wallet))
}

// ---------------------------------------------------------------------------
// Ledger mock
// ---------------------------------------------------------------------------
pub struct MockState {
    pub accounts: HashMap<Pubkey, Account>,
    pub balances: HashMap<Pubkey, u64>,
    pub token_balances: Vec<TokenBalance>,
    pub blockhash: Hash,
    pub block_height: u64,
    /// Added to the block height on every height query
    pub block_height_step: u64,
    pub last_valid_block_height: u64,
    pub slot: u64,
    pub rpc_down: bool,
    pub simulation: SimulationOutcome,
    pub simulations: usize,
    /// What a status lookup returns, `None` for a transaction that never landed
    pub status: Option<SignatureState>,
    /// Status found only when searching transaction history
    pub history_status: Option<SignatureState>,
    /// Status lookups that fail with a dropped connection before answering
    pub status_errors: usize,
    pub send_error: Option<SdkError>,
    pub send_attempts: usize,
    pub sent: Vec<Transaction>,
    pub balance_queries: usize,
    pub recent_signatures: Vec<SignatureRecord>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            balances: HashMap::new(),
            token_balances: Vec::new(),
            blockhash: Hash::new_unique(),
            block_height: 1_000,
            block_height_step: 0,
            last_valid_block_height: 1_150,
            slot: 42,
            rpc_down: false,
            simulation: SimulationOutcome::default(),
            simulations: 0,
            status: Some(confirmed()),
            history_status: None,
            status_errors: 0,
            send_error: None,
            send_attempts: 0,
            sent: Vec::new(),
            balance_queries: 0,
            recent_signatures: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct MockRpc {
    pub state: Mutex<MockState>,
}

impl MockRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<F: FnOnce(&mut MockState)>(self: &Arc<Self>, f: F) -> Arc<Self> {
        f(&mut self.state.lock().unwrap());
        self.clone()
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().sent.clone()
    }

    fn check_up(&self) -> Result<()> {
        if self.state.lock().unwrap().rpc_down {
            return Err(transport_error(std::io::ErrorKind::ConnectionRefused));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRpc for MockRpc {
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64)> {
        self.check_up()?;
        let state = self.state.lock().unwrap();
        Ok((state.blockhash, state.last_valid_block_height))
    }

    async fn get_block_height(&self) -> Result<u64> {
        self.check_up()?;
        let mut state = self.state.lock().unwrap();
        state.block_height += state.block_height_step;
        Ok(state.block_height)
    }

    async fn get_slot(&self) -> Result<u64> {
        self.check_up()?;
        Ok(self.state.lock().unwrap().slot)
    }

    async fn get_version(&self) -> Result<String> {
        self.check_up()?;
        Ok("2.1.0".to_string())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.check_up()?;
        let mut state = self.state.lock().unwrap();
        state.balance_queries += 1;
        Ok(state.balances.get(address).copied().unwrap_or_default())
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.check_up()?;
        Ok(self.state.lock().unwrap().accounts.get(address).cloned())
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        self.check_up()?;
        let state = self.state.lock().unwrap();
        Ok(addresses
            .iter()
            .map(|address| state.accounts.get(address).cloned())
            .collect())
    }

    async fn get_token_balances_by_owner(
        &self,
        _owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<TokenBalance>> {
        self.check_up()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .token_balances
            .iter()
            .filter(|balance| balance.token_program == *token_program)
            .cloned()
            .collect())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        self.check_up()?;
        Ok(rent_exempt_minimum(data_len))
    }

    async fn simulate_transaction(&self, _transaction: &Transaction) -> Result<SimulationOutcome> {
        self.check_up()?;
        let mut state = self.state.lock().unwrap();
        state.simulations += 1;
        Ok(state.simulation.clone())
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        _skip_preflight: bool,
    ) -> Result<Signature> {
        self.check_up()?;
        let mut state = self.state.lock().unwrap();
        state.send_attempts += 1;
        if let Some(err) = state.send_error.take() {
            return Err(err);
        }
        state.sent.push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn get_signature_state(
        &self,
        _signature: &Signature,
        search_history: bool,
    ) -> Result<Option<SignatureState>> {
        self.check_up()?;
        let mut state = self.state.lock().unwrap();
        if !search_history && state.status_errors > 0 {
            state.status_errors -= 1;
            return Err(transport_error(std::io::ErrorKind::ConnectionReset));
        }
        if search_history {
            return Ok(state.history_status.clone().or_else(|| state.status.clone()));
        }
        Ok(state.status.clone())
    }

    async fn get_signatures_for_address(
        &self,
        _address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>> {
        self.check_up()?;
        let state = self.state.lock().unwrap();
        Ok(state.recent_signatures.iter().take(limit).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------
pub fn transport_error(kind: std::io::ErrorKind) -> SdkError {
    ClientError::from(std::io::Error::new(kind, "transport failure")).into()
}

pub fn confirmed() -> SignatureState {
    SignatureState {
        confirmed: true,
        slot: 42,
        err: None,
    }
}

pub fn rent_exempt_minimum(data_len: usize) -> u64 {
    (128 + data_len as u64) * LAMPORTS_PER_BYTE_YEAR * 2
}

pub fn program_account() -> Account {
    Account {
        lamports: 1_141_440,
        data: vec![0; 36],
        owner: solana_sdk::bpf_loader_upgradeable::id(),
        executable: true,
        rent_epoch: 0,
    }
}

pub fn owned_account(owner: Pubkey, data: Vec<u8>) -> Account {
    Account {
        lamports: rent_exempt_minimum(data.len()),
        data,
        owner,
        executable: false,
        rent_epoch: 0,
    }
}

pub fn deploy(state: &mut MockState, names: &[ProgramName]) {
    let programs = programs();
    for name in names {
        state
            .accounts
            .insert(programs.resolve(*name).unwrap(), program_account());
    }
}

/// Token-2022 mint bytes, with a transfer hook extension when `hook_program` is set.
pub fn token_2022_mint(decimals: u8, hook_program: Option<Pubkey>) -> Account {
    let mint = Mint {
        mint_authority: COption::Some(Pubkey::new_unique()),
        supply: 1_000_000,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    };

    let mut data = vec![0u8; Mint::LEN];
    mint.pack_into_slice(&mut data);

    if let Some(hook_program) = hook_program {
        // base account length, then the account type, then one TLV entry
        data.resize(spl_token_2022::state::Account::LEN, 0);
        data.push(AccountType::Mint as u8);
        data.extend_from_slice(&(ExtensionType::TransferHook as u16).to_le_bytes());
        data.extend_from_slice(&64u16.to_le_bytes());
        data.extend_from_slice(Pubkey::new_unique().as_ref()); // hook authority
        data.extend_from_slice(hook_program.as_ref());
    }

    owned_account(spl_token_2022::ID, data)
}
