use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use agora_core::AccountId;
use agora_ports::{FundsGateway, PaymentError, PaymentResult};

/// In-memory balance ledger with a dedicated escrow account
///
/// `fail_on_call(n)` makes the n-th subsequent movement fail, which is how
/// engine tests break a settlement mid-plan and assert the rollback.
pub struct SimFunds {
    balances: DashMap<AccountId, Decimal>,
    escrow: AccountId,
    calls: AtomicU32,
    fail_on_call: AtomicU32,
}

impl SimFunds {
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
            escrow: Uuid::new_v4(),
            calls: AtomicU32::new(0),
            fail_on_call: AtomicU32::new(0),
        }
    }

    /// Open an account with an initial balance
    pub fn open_account(&self, balance: Decimal) -> AccountId {
        let account = Uuid::new_v4();
        self.balances.insert(account, balance);
        account
    }

    pub fn deposit(&self, account: AccountId, amount: Decimal) {
        let mut balance = self.balances.entry(account).or_insert(Decimal::ZERO);
        *balance += amount;
    }

    pub fn balance(&self, account: AccountId) -> Decimal {
        self.balances
            .get(&account)
            .map(|balance| *balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum over every account including escrow; conserved by all movements
    pub fn total_funds(&self) -> Decimal {
        self.balances.iter().map(|entry| *entry.value()).sum()
    }

    /// Fail the n-th movement from now (1 = the very next call); 0 disarms
    pub fn fail_on_call(&self, n: u32) {
        self.calls.store(0, Ordering::SeqCst);
        self.fail_on_call.store(n, Ordering::SeqCst);
    }

    fn transfer(&self, from: AccountId, to: AccountId, amount: Decimal) -> PaymentResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call.load(Ordering::SeqCst) {
            return Err(PaymentError::Rejected("injected failure".to_string()));
        }

        let current = self.balance(from);
        if current < amount {
            return Err(PaymentError::InsufficientFunds {
                account: from.to_string(),
                shortfall: (amount - current).to_string(),
            });
        }
        let mut from_balance = self.balances.entry(from).or_insert(Decimal::ZERO);
        *from_balance -= amount;
        drop(from_balance);
        let mut to_balance = self.balances.entry(to).or_insert(Decimal::ZERO);
        *to_balance += amount;
        debug!("paid {amount}: {from} -> {to}");
        Ok(())
    }
}

impl Default for SimFunds {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundsGateway for SimFunds {
    async fn pay(&self, from: AccountId, to: AccountId, amount: Decimal) -> PaymentResult<()> {
        self.transfer(from, to, amount)
    }

    async fn refund(&self, to: AccountId, amount: Decimal) -> PaymentResult<()> {
        self.transfer(self.escrow, to, amount)
    }

    fn escrow_account(&self) -> AccountId {
        self.escrow
    }
}
