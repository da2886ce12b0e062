use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::extension::StateWithExtensions;
use spl_token_2022::extension::transfer_hook;
use spl_token_2022::state::Mint;

use crate::config::{ProgramName, ProgramRegistry};
use crate::constants::{UNKNOWN_TOKEN_NAME, UNKNOWN_TOKEN_SYMBOL};
use crate::error::Result;
use crate::pda;
use crate::rpc::{LedgerRpc, TokenBalance};
use crate::state::{ComplianceRecord, PoolDescriptor, TokenInfoRecord, WhitelistRecord};
use crate::utils::to_ui_amount;

/// Transfer hook attached to a mint, as seen from the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookClassification {
    None,
    Kyc,
    Whitelist,
    /// A hook program the registry does not know
    Unknown(Pubkey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub mint: Pubkey,
    pub token_account: Pubkey,
    pub token_program: Pubkey,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub balance: u64, // raw units
    pub hook: HookClassification,
    pub is_verified: bool,
}

impl TokenDescriptor {
    pub fn ui_amount(&self) -> Decimal {
        to_ui_amount(self.balance, self.decimals)
    }
}

/// Read-only queries against ledger state. Nothing is cached, every call hits the node.
#[derive(Clone)]
pub struct AccountReader {
    rpc: Arc<dyn LedgerRpc>,
    programs: ProgramRegistry,
}

impl AccountReader {
    pub fn new(rpc: Arc<dyn LedgerRpc>, programs: ProgramRegistry) -> Self {
        Self { rpc, programs }
    }

    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.rpc.get_balance(address).await
    }

    pub async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.rpc.get_account(address).await
    }

    /// Account bytes, `None` when the account does not exist
    pub async fn get_account_raw(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.rpc.get_account(address).await?.map(|account| account.data))
    }

    pub fn decode_compliance_record(&self, address: &Pubkey, data: &[u8]) -> Result<ComplianceRecord> {
        ComplianceRecord::decode(address, data)
    }

    /// `None` means the user was never registered, which reads as not verified.
    pub async fn get_kyc_record(&self, user: &Pubkey) -> Result<Option<ComplianceRecord>> {
        let kyc_hook = self.programs.resolve(ProgramName::KycHook)?;
        let (address, _) = pda::kyc_record(&kyc_hook, user)?;

        match self.get_account_raw(&address).await? {
            Some(data) => ComplianceRecord::decode(&address, &data).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_whitelist_record(&self, mint: &Pubkey) -> Result<Option<WhitelistRecord>> {
        let whitelist_hook = self.programs.resolve(ProgramName::WhitelistHook)?;
        let (address, _) = pda::whitelist(&whitelist_hook, mint)?;

        match self.get_account_raw(&address).await? {
            Some(data) => WhitelistRecord::decode(&address, &data).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_token_info(&self, mint: &Pubkey) -> Result<Option<TokenInfoRecord>> {
        let token_layer = self.programs.resolve(ProgramName::TokenLayer)?;
        let (address, _) = pda::token_info(&token_layer, mint)?;

        match self.get_account_raw(&address).await? {
            Some(data) => TokenInfoRecord::decode(&address, &data).map(Some),
            None => Ok(None),
        }
    }

    /// Pool for the ordered pair, `None` until its creation has been confirmed
    pub async fn get_pool(&self, token_a: &Pubkey, token_b: &Pubkey) -> Result<Option<PoolDescriptor>> {
        let amm = self.programs.resolve(ProgramName::Amm)?;
        let (address, _) = pda::pool(&amm, token_a, token_b)?;

        match self.get_account_raw(&address).await? {
            Some(data) => PoolDescriptor::decode(&address, &data).map(Some),
            None => Ok(None),
        }
    }

    /// Whether `program_id` exists and is marked executable
    pub async fn is_program_deployed(&self, program_id: &Pubkey) -> Result<bool> {
        Ok(self
            .rpc
            .get_account(program_id)
            .await?
            .is_some_and(|account| account.executable))
    }

    /// Token holdings of `owner` under both token programs, with metadata and hook classification.
    pub async fn get_token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenDescriptor>> {
        let token_layer = self.programs.resolve(ProgramName::TokenLayer)?;

        let (legacy, token_2022) = tokio::join!(
            self.rpc.get_token_balances_by_owner(owner, &spl_token::ID),
            self.rpc.get_token_balances_by_owner(owner, &spl_token_2022::ID),
        );
        let balances: Vec<TokenBalance> = legacy?.into_iter().chain(token_2022?).collect();
        if balances.is_empty() {
            return Ok(Vec::new());
        }

        let mut mints: Vec<Pubkey> = balances.iter().map(|balance| balance.mint).collect();
        mints.sort();
        mints.dedup();
        let info_addresses = mints
            .iter()
            .map(|mint| pda::token_info(&token_layer, mint).map(|(address, _)| address))
            .collect::<Result<Vec<_>>>()?;

        let (mint_accounts, info_accounts) = tokio::join!(
            self.rpc.get_multiple_accounts(&mints),
            self.rpc.get_multiple_accounts(&info_addresses),
        );
        let mint_accounts = mint_accounts?;
        let info_accounts = info_accounts?;

        let mut hooks = HashMap::with_capacity(mints.len());
        let mut infos = HashMap::with_capacity(mints.len());
        for (index, mint) in mints.iter().enumerate() {
            let hook = mint_accounts
                .get(index)
                .and_then(Option::as_ref)
                .map(|account| self.classify_hook(mint, account))
                .unwrap_or(HookClassification::None);
            hooks.insert(*mint, hook);

            let info = info_accounts
                .get(index)
                .and_then(Option::as_ref)
                .and_then(|account| {
                    TokenInfoRecord::decode(&info_addresses[index], &account.data)
                        .inspect_err(|e| log::warn!("ignoring token info for {mint}: {e}"))
                        .ok()
                });
            if let Some(info) = info {
                infos.insert(*mint, info);
            }
        }

        Ok(balances
            .into_iter()
            .map(|balance| {
                let info = infos.get(&balance.mint);
                TokenDescriptor {
                    mint: balance.mint,
                    token_account: balance.address,
                    token_program: balance.token_program,
                    symbol: info
                        .map(|info| info.symbol.clone())
                        .unwrap_or_else(|| UNKNOWN_TOKEN_SYMBOL.to_string()),
                    name: info
                        .map(|info| info.name.clone())
                        .unwrap_or_else(|| UNKNOWN_TOKEN_NAME.to_string()),
                    decimals: balance.decimals,
                    balance: balance.amount,
                    hook: hooks
                        .get(&balance.mint)
                        .copied()
                        .unwrap_or(HookClassification::None),
                    is_verified: info.is_some_and(|info| info.is_verified),
                }
            })
            .collect())
    }

    /// Reads the transfer hook extension of a Token-2022 mint
    pub fn classify_hook(&self, mint: &Pubkey, account: &Account) -> HookClassification {
        if account.owner != spl_token_2022::ID {
            return HookClassification::None;
        }

        let hook_program = match StateWithExtensions::<Mint>::unpack(&account.data) {
            Ok(state) => transfer_hook::get_program_id(&state),
            Err(e) => {
                log::warn!("cannot unpack mint {mint}: {e}");
                None
            }
        };

        match hook_program {
            None => HookClassification::None,
            Some(program) => match self.programs.name_of(&program) {
                Some(ProgramName::KycHook) => HookClassification::Kyc,
                Some(ProgramName::WhitelistHook) => HookClassification::Whitelist,
                _ => HookClassification::Unknown(program),
            },
        }
    }
}
