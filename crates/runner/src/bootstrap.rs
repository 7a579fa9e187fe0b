//! Bootstrap - accounts, minting, and engine startup

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use agora_clock::ManualClock;
use agora_core::AccountId;
use agora_marketplace::{MarketplaceConfig, MarketplaceEngine, Result};
use agora_registry_sim::{SimFunds, SimRegistry};
use agora_valuation::MarketStatsStore;

/// Bootstrap configuration
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Named participants to open accounts for
    pub participants: Vec<String>,
    /// Initial balance per participant
    pub initial_capital: Decimal,
    /// Platform fee rate at startup
    pub fee_rate: Decimal,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            participants: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
            initial_capital: dec!(10000),
            fee_rate: dec!(0.025),
        }
    }
}

/// Everything a scenario needs, fully wired
pub struct MarketSetup {
    pub registry: Arc<SimRegistry>,
    pub funds: Arc<SimFunds>,
    pub clock: Arc<ManualClock>,
    pub stats: Arc<MarketStatsStore>,
    pub engine: Arc<MarketplaceEngine>,
    pub operator: AccountId,
    pub accounts: HashMap<String, AccountId>,
}

impl MarketSetup {
    /// Account of a named participant; panics on unknown names, which only
    /// scenarios control
    pub fn account(&self, name: &str) -> AccountId {
        self.accounts[name]
    }
}

/// Open accounts and start an engine against fresh simulators
pub fn bootstrap(config: BootstrapConfig) -> Result<MarketSetup> {
    let registry = Arc::new(SimRegistry::new());
    let funds = Arc::new(SimFunds::new());
    let clock = Arc::new(ManualClock::starting_now());
    let stats = Arc::new(MarketStatsStore::new());

    let operator = funds.open_account(Decimal::ZERO);
    let mut accounts = HashMap::new();
    for name in &config.participants {
        let account = funds.open_account(config.initial_capital);
        info!("opened account for {name}: {account}");
        accounts.insert(name.clone(), account);
    }

    let mut market_config = MarketplaceConfig::new(operator);
    market_config.fee_rate = config.fee_rate;
    let engine = Arc::new(MarketplaceEngine::new(
        registry.clone(),
        funds.clone(),
        clock.clone(),
        stats.clone(),
        market_config,
    )?);

    info!(
        "marketplace started: {} participants, fee rate {}",
        config.participants.len(),
        config.fee_rate
    );

    Ok(MarketSetup {
        registry,
        funds,
        clock,
        stats,
        engine,
        operator,
        accounts,
    })
}
