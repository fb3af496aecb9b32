//! In-memory bankroll ledger
//!
//! Every mutation reads and writes the balance and appends to the log under
//! a single lock, so concurrent callers never lose updates.

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::info;
use crate::{
    errors::{BotError, BotResult},
    types::{BankrollConfig, BankrollTransaction, KellyCalculation, TransactionKind},
};

#[derive(Debug)]
struct LedgerState {
    current_balance: Decimal,
    total_deposits: Decimal,
    total_withdrawals: Decimal,
    transactions: Vec<BankrollTransaction>,
}

impl LedgerState {
    fn emergency_reserve(&self, emergency_fund_pct: Decimal) -> Decimal {
        (self.current_balance * emergency_fund_pct / dec!(100)).max(Decimal::ZERO)
    }

    fn available_balance(&self, emergency_fund_pct: Decimal) -> Decimal {
        (self.current_balance - self.emergency_reserve(emergency_fund_pct)).max(Decimal::ZERO)
    }

    fn append(&mut self, kind: TransactionKind, amount: Decimal, description: &str) -> BankrollTransaction {
        match kind {
            TransactionKind::Deposit => {
                self.current_balance += amount;
                self.total_deposits += amount;
            }
            TransactionKind::Withdrawal => {
                self.current_balance -= amount;
                self.total_withdrawals += amount;
            }
            TransactionKind::Profit => self.current_balance += amount,
            TransactionKind::Loss => self.current_balance -= amount,
        }

        let transaction = BankrollTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            amount,
            description: description.to_string(),
            timestamp: Utc::now(),
            balance: self.current_balance,
        };
        self.transactions.push(transaction.clone());
        transaction
    }
}

#[derive(Debug)]
pub struct BankrollLedger {
    state: Mutex<LedgerState>,
    emergency_fund_pct: Decimal,
}

impl BankrollLedger {
    pub fn new(initial_deposit: Decimal, emergency_fund_pct: Decimal) -> BotResult<Self> {
        if initial_deposit < Decimal::ZERO {
            return Err(BotError::InvalidAmount {
                amount: initial_deposit,
                reason: "initial deposit cannot be negative".to_string(),
            });
        }
        if emergency_fund_pct < Decimal::ZERO || emergency_fund_pct >= dec!(100) {
            return Err(BotError::InvalidConfig {
                field: "emergency_fund",
                reason: format!("must be within [0, 100), got {}", emergency_fund_pct),
            });
        }

        let mut state = LedgerState {
            current_balance: Decimal::ZERO,
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            transactions: Vec::new(),
        };
        if initial_deposit > Decimal::ZERO {
            state.append(TransactionKind::Deposit, initial_deposit, "Initial deposit");
        }

        Ok(Self {
            state: Mutex::new(state),
            emergency_fund_pct,
        })
    }

    /// Builds a ledger funded with the configured bankroll.
    pub fn from_config(config: &BankrollConfig) -> BotResult<Self> {
        let initial = Decimal::from_f64(config.total_bankroll).ok_or_else(|| BotError::InvalidConfig {
            field: "total_bankroll",
            reason: format!("not representable: {}", config.total_bankroll),
        })?;
        let emergency = Decimal::from_f64(config.emergency_fund).ok_or_else(|| BotError::InvalidConfig {
            field: "emergency_fund",
            reason: format!("not representable: {}", config.emergency_fund),
        })?;
        Self::new(initial.round_dp(2), emergency)
    }

    pub fn deposit(&self, amount: Decimal, description: &str) -> BotResult<BankrollTransaction> {
        ensure_positive(amount, "deposit must be positive")?;

        let transaction = self.state.lock().append(TransactionKind::Deposit, amount, description);
        info!(amount = %amount, balance = %transaction.balance, "💵 Deposit recorded");
        Ok(transaction)
    }

    /// Withdrawals may not dip into the emergency reserve.
    pub fn withdraw(&self, amount: Decimal, description: &str) -> BotResult<BankrollTransaction> {
        ensure_positive(amount, "withdrawal must be positive")?;

        let mut state = self.state.lock();
        let available = state.available_balance(self.emergency_fund_pct);
        if amount > available {
            return Err(BotError::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let transaction = state.append(TransactionKind::Withdrawal, amount, description);
        info!(amount = %amount, balance = %transaction.balance, "🏧 Withdrawal recorded");
        Ok(transaction)
    }

    /// Positive values are recorded as profit, negative values as loss.
    pub fn record_profit(&self, profit: Decimal, description: &str) -> BotResult<BankrollTransaction> {
        if profit.is_zero() {
            return Err(BotError::InvalidAmount {
                amount: profit,
                reason: "profit record must be non-zero".to_string(),
            });
        }

        let kind = if profit > Decimal::ZERO {
            TransactionKind::Profit
        } else {
            TransactionKind::Loss
        };
        let transaction = self.state.lock().append(kind, profit.abs(), description);
        info!(kind = ?kind, amount = %profit, balance = %transaction.balance, "📒 Result recorded");
        Ok(transaction)
    }

    /// Books a sizing's expected value as realised profit, so the next
    /// sizing sees the grown bankroll. Practice mode only; a zero EV
    /// leaves the log untouched.
    pub fn settle_practice(
        &self,
        sizing: &KellyCalculation,
        description: &str,
    ) -> BotResult<Option<BankrollTransaction>> {
        if sizing.expected_value.is_zero() {
            return Ok(None);
        }
        self.record_profit(sizing.expected_value, description).map(Some)
    }

    pub fn current_balance(&self) -> Decimal {
        self.state.lock().current_balance
    }

    pub fn total_deposits(&self) -> Decimal {
        self.state.lock().total_deposits
    }

    pub fn total_withdrawals(&self) -> Decimal {
        self.state.lock().total_withdrawals
    }

    pub fn total_profit(&self) -> Decimal {
        let state = self.state.lock();
        state.current_balance - state.total_deposits + state.total_withdrawals
    }

    /// Return on deposits as a percentage.
    pub fn roi(&self) -> Decimal {
        let state = self.state.lock();
        if state.total_deposits.is_zero() {
            return Decimal::ZERO;
        }
        let profit = state.current_balance - state.total_deposits + state.total_withdrawals;
        profit / state.total_deposits * dec!(100)
    }

    pub fn emergency_reserve(&self) -> Decimal {
        self.state.lock().emergency_reserve(self.emergency_fund_pct)
    }

    pub fn available_balance(&self) -> Decimal {
        self.state.lock().available_balance(self.emergency_fund_pct)
    }

    /// Chronological snapshot of the log.
    pub fn transactions(&self) -> Vec<BankrollTransaction> {
        self.state.lock().transactions.clone()
    }

    /// Bankroll to hand to the sizer. Without reinvestment only the
    /// principal (net deposits) is put at risk.
    pub fn sizing_bankroll(&self, config: &BankrollConfig) -> f64 {
        let state = self.state.lock();
        let bankroll = if config.reinvest_profits {
            state.current_balance
        } else {
            state
                .current_balance
                .min(state.total_deposits - state.total_withdrawals)
        };
        bankroll.max(Decimal::ZERO).to_f64().unwrap_or_default()
    }
}

fn ensure_positive(amount: Decimal, reason: &str) -> BotResult<()> {
    if amount <= Decimal::ZERO {
        return Err(BotError::InvalidAmount {
            amount,
            reason: reason.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kelly::calculate_arbitrage_kelly;
    use crate::types::{Outcome, StakeLeg};
    use std::sync::Arc;

    fn ledger() -> BankrollLedger {
        BankrollLedger::new(dec!(1000), dec!(10)).unwrap()
    }

    #[test]
    fn starts_with_initial_deposit() {
        let ledger = ledger();
        let log = ledger.transactions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, TransactionKind::Deposit);
        assert_eq!(log[0].description, "Initial deposit");
        assert_eq!(log[0].balance, dec!(1000));
        assert_eq!(ledger.total_deposits(), dec!(1000));
    }

    #[test]
    fn running_balance_tracks_every_entry() {
        let ledger = ledger();
        ledger.deposit(dec!(500), "Manual deposit").unwrap();
        ledger.record_profit(dec!(24.40), "Arsenal arbitrage").unwrap();
        ledger.record_profit(dec!(-10), "Missed leg").unwrap();
        ledger.withdraw(dec!(200), "Manual withdrawal").unwrap();

        let balances: Vec<Decimal> = ledger.transactions().iter().map(|t| t.balance).collect();
        assert_eq!(balances, vec![dec!(1000), dec!(1500), dec!(1524.40), dec!(1514.40), dec!(1314.40)]);
        assert_eq!(ledger.transactions()[3].kind, TransactionKind::Loss);
        assert_eq!(ledger.transactions()[3].amount, dec!(10));
        assert_eq!(ledger.total_profit(), dec!(14.40));
        assert_eq!(ledger.roi(), dec!(0.96));
    }

    #[test]
    fn withdrawal_respects_emergency_reserve() {
        let ledger = ledger();
        assert_eq!(ledger.available_balance(), dec!(900));
        assert!(matches!(
            ledger.withdraw(dec!(950), "too much"),
            Err(BotError::InsufficientFunds { .. })
        ));
        assert!(ledger.withdraw(dec!(900), "all available").is_ok());
        assert_eq!(ledger.current_balance(), dec!(100));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let ledger = ledger();
        assert!(matches!(ledger.deposit(dec!(0), "zero"), Err(BotError::InvalidAmount { .. })));
        assert!(matches!(ledger.withdraw(dec!(-5), "neg"), Err(BotError::InvalidAmount { .. })));
        assert!(matches!(ledger.record_profit(dec!(0), "flat"), Err(BotError::InvalidAmount { .. })));
        assert_eq!(ledger.transactions().len(), 1);
        assert!(BankrollLedger::new(dec!(-1), dec!(10)).is_err());
        assert!(BankrollLedger::new(dec!(100), dec!(100)).is_err());
    }

    #[test]
    fn roi_is_zero_without_deposits() {
        let ledger = BankrollLedger::new(Decimal::ZERO, dec!(10)).unwrap();
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.roi(), Decimal::ZERO);
    }

    #[test]
    fn sizing_bankroll_honours_reinvest_flag() {
        let ledger = ledger();
        ledger.record_profit(dec!(250), "wins").unwrap();

        let reinvest = BankrollConfig { reinvest_profits: true, ..Default::default() };
        let principal_only = BankrollConfig { reinvest_profits: false, ..Default::default() };
        assert_eq!(ledger.sizing_bankroll(&reinvest), 1250.0);
        assert_eq!(ledger.sizing_bankroll(&principal_only), 1000.0);

        ledger.record_profit(dec!(-400), "losses").unwrap();
        assert_eq!(ledger.sizing_bankroll(&principal_only), 850.0);
    }

    #[test]
    fn practice_settlement_grows_next_sizing() {
        let config = BankrollConfig { total_bankroll: 5000.0, ..Default::default() };
        let ledger = BankrollLedger::from_config(&config).unwrap();
        let legs = [
            StakeLeg {
                outcome: Outcome::Home,
                outcome_name: "Arsenal".to_string(),
                bookmaker: "A".to_string(),
                odds: 2.10,
                stake: 487.8,
                profit: 24.4,
                implied_probability: 47.62,
            },
            StakeLeg {
                outcome: Outcome::Away,
                outcome_name: "Chelsea".to_string(),
                bookmaker: "C".to_string(),
                odds: 2.00,
                stake: 512.2,
                profit: 24.4,
                implied_probability: 50.0,
            },
        ];

        let first = calculate_arbitrage_kelly(&legs, 1000.0, 24.4, ledger.sizing_bankroll(&config), &config).unwrap();
        let tx = ledger.settle_practice(&first, "Practice arbitrage evt-1").unwrap().unwrap();
        assert_eq!(tx.kind, TransactionKind::Profit);
        assert_eq!(tx.amount, first.expected_value);
        assert_eq!(ledger.current_balance(), dec!(5000) + first.expected_value);

        let second = calculate_arbitrage_kelly(&legs, 1000.0, 24.4, ledger.sizing_bankroll(&config), &config).unwrap();
        assert!(second.optimal_stake > first.optimal_stake);
    }

    #[test]
    fn practice_settlement_skips_zero_value() {
        let ledger = ledger();
        let flat = KellyCalculation::not_profitable();
        assert!(ledger.settle_practice(&flat, "nothing").unwrap().is_none());
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn from_config_funds_ledger() {
        let config = BankrollConfig { total_bankroll: 2500.0, emergency_fund: 20.0, ..Default::default() };
        let ledger = BankrollLedger::from_config(&config).unwrap();
        assert_eq!(ledger.current_balance(), dec!(2500));
        assert_eq!(ledger.emergency_reserve(), dec!(500));
    }

    #[test]
    fn concurrent_deposits_are_not_lost() {
        let ledger = Arc::new(BankrollLedger::new(Decimal::ZERO, Decimal::ZERO).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ledger.deposit(dec!(1), "tick").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.current_balance(), dec!(800));
        let log = ledger.transactions();
        assert_eq!(log.len(), 800);
        for (i, tx) in log.iter().enumerate() {
            assert_eq!(tx.balance, Decimal::from(i as u64 + 1));
        }
    }
}
