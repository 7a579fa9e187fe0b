//! Fund plans: atomic multi-step fund movement with compensation
//!
//! Settlement and bidding move money in several steps (escrow capture,
//! seller payout, platform fee, overpayment refund). A [`FundPlan`] holds
//! the ordered steps, executes them sequentially, and on any failure
//! compensates every step already executed, in reverse order. The caller
//! only commits state once the whole plan (and any follow-up registry
//! transfer) has succeeded, so settlement is at-most-once and never
//! partial.

use std::sync::Arc;
use std::time::Duration;

use log::{error, warn};
use rust_decimal::Decimal;

use agora_core::AccountId;
use agora_ports::FundsGateway;

use crate::error::{MarketError, Result};

/// One fund movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundStep {
    /// Move `amount` between two accounts
    Pay {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
    /// Return `amount` from escrow to `to`
    Refund { to: AccountId, amount: Decimal },
}

impl FundStep {
    /// The movement that undoes this step
    fn compensation(&self, escrow: AccountId) -> FundStep {
        match *self {
            FundStep::Pay { from, to, amount } => {
                if to == escrow {
                    FundStep::Refund { to: from, amount }
                } else {
                    FundStep::Pay {
                        from: to,
                        to: from,
                        amount,
                    }
                }
            }
            FundStep::Refund { to, amount } => FundStep::Pay {
                from: to,
                to: escrow,
                amount,
            },
        }
    }

    fn amount(&self) -> Decimal {
        match *self {
            FundStep::Pay { amount, .. } | FundStep::Refund { amount, .. } => amount,
        }
    }
}

/// Ordered fund steps executed all-or-nothing
pub struct FundPlan {
    funds: Arc<dyn FundsGateway>,
    timeout: Duration,
    pending: Vec<FundStep>,
    executed: Vec<FundStep>,
}

impl FundPlan {
    pub fn new(funds: Arc<dyn FundsGateway>, timeout: Duration) -> Self {
        Self {
            funds,
            timeout,
            pending: Vec::new(),
            executed: Vec::new(),
        }
    }

    /// Queue a step; zero-amount steps are dropped
    pub fn step(&mut self, step: FundStep) -> &mut Self {
        if !step.amount().is_zero() {
            self.pending.push(step);
        }
        self
    }

    /// Execute all queued steps in order
    ///
    /// On the first failure, every step already executed is compensated in
    /// reverse order and the error is returned; the caller sees either a
    /// fully-applied plan or none of it.
    pub async fn execute(&mut self) -> Result<()> {
        let steps: Vec<FundStep> = self.pending.drain(..).collect();
        for step in steps {
            match self.apply(step).await {
                Ok(()) => self.executed.push(step),
                Err(err) => {
                    warn!("fund step {step:?} failed, compensating: {err}");
                    self.compensate().await;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Undo every executed step; used when a follow-up action (registry
    /// transfer) fails after funds have already moved
    pub async fn abort(&mut self) {
        self.compensate().await;
    }

    async fn apply(&self, step: FundStep) -> Result<()> {
        let call = async {
            match step {
                FundStep::Pay { from, to, amount } => self.funds.pay(from, to, amount).await,
                FundStep::Refund { to, amount } => self.funds.refund(to, amount).await,
            }
        };
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(MarketError::from),
            Err(_) => Err(MarketError::PaymentFailed(
                "funds collaborator timed out".to_string(),
            )),
        }
    }

    async fn compensate(&mut self) {
        let escrow = self.funds.escrow_account();
        while let Some(step) = self.executed.pop() {
            let compensation = step.compensation(escrow);
            if let Err(err) = self.apply(compensation).await {
                // Nothing left to do but make the discrepancy loud
                error!("compensation {compensation:?} for {step:?} failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    use agora_ports::{PaymentError, PaymentResult};

    /// Minimal in-crate ledger; the full simulator lives in registry-sim
    struct TestLedger {
        balances: DashMap<AccountId, Decimal>,
        escrow: AccountId,
        calls: AtomicU32,
        fail_on_call: u32,
    }

    impl TestLedger {
        fn new(fail_on_call: u32) -> Self {
            Self {
                balances: DashMap::new(),
                escrow: Uuid::new_v4(),
                calls: AtomicU32::new(0),
                fail_on_call,
            }
        }

        fn fund(&self, account: AccountId, amount: Decimal) {
            self.balances.insert(account, amount);
        }

        fn balance(&self, account: AccountId) -> Decimal {
            self.balances
                .get(&account)
                .map(|b| *b)
                .unwrap_or(Decimal::ZERO)
        }

        fn transfer(&self, from: AccountId, to: AccountId, amount: Decimal) -> PaymentResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on_call {
                return Err(PaymentError::Rejected("injected failure".to_string()));
            }
            let mut from_balance = self.balances.entry(from).or_insert(Decimal::ZERO);
            *from_balance -= amount;
            drop(from_balance);
            let mut to_balance = self.balances.entry(to).or_insert(Decimal::ZERO);
            *to_balance += amount;
            Ok(())
        }
    }

    #[async_trait]
    impl FundsGateway for TestLedger {
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

    #[tokio::test]
    async fn plan_executes_all_steps_in_order() {
        let ledger = Arc::new(TestLedger::new(0));
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        ledger.fund(buyer, dec!(1000));

        let escrow = ledger.escrow_account();
        let mut plan = FundPlan::new(ledger.clone(), Duration::from_secs(1));
        plan.step(FundStep::Pay {
            from: buyer,
            to: escrow,
            amount: dec!(1000),
        })
        .step(FundStep::Pay {
            from: escrow,
            to: seller,
            amount: dec!(975),
        });
        plan.execute().await.unwrap();

        assert_eq!(ledger.balance(buyer), dec!(0));
        assert_eq!(ledger.balance(seller), dec!(975));
        assert_eq!(ledger.balance(escrow), dec!(25));
    }

    #[tokio::test]
    async fn failure_compensates_executed_steps() {
        // Fail on the second movement; the first must be unwound
        let ledger = Arc::new(TestLedger::new(2));
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        ledger.fund(buyer, dec!(500));

        let escrow = ledger.escrow_account();
        let mut plan = FundPlan::new(ledger.clone(), Duration::from_secs(1));
        plan.step(FundStep::Pay {
            from: buyer,
            to: escrow,
            amount: dec!(500),
        })
        .step(FundStep::Pay {
            from: escrow,
            to: seller,
            amount: dec!(500),
        });

        let err = plan.execute().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(ledger.balance(buyer), dec!(500));
        assert_eq!(ledger.balance(seller), dec!(0));
        assert_eq!(ledger.balance(escrow), dec!(0));
    }

    #[tokio::test]
    async fn abort_unwinds_a_completed_plan() {
        let ledger = Arc::new(TestLedger::new(0));
        let buyer = Uuid::new_v4();
        ledger.fund(buyer, dec!(300));

        let escrow = ledger.escrow_account();
        let mut plan = FundPlan::new(ledger.clone(), Duration::from_secs(1));
        plan.step(FundStep::Pay {
            from: buyer,
            to: escrow,
            amount: dec!(300),
        });
        plan.execute().await.unwrap();
        assert_eq!(ledger.balance(escrow), dec!(300));

        plan.abort().await;
        assert_eq!(ledger.balance(buyer), dec!(300));
        assert_eq!(ledger.balance(escrow), dec!(0));
    }

    #[tokio::test]
    async fn zero_amount_steps_are_dropped() {
        let ledger = Arc::new(TestLedger::new(1));
        let buyer = Uuid::new_v4();

        let mut plan = FundPlan::new(ledger.clone(), Duration::from_secs(1));
        plan.step(FundStep::Refund {
            to: buyer,
            amount: Decimal::ZERO,
        });
        // The ledger would fail the first call; with the step dropped there is none
        plan.execute().await.unwrap();
    }
}
