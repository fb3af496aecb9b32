//! Bankroll ledger transaction types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Profit,
    Loss,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankrollTransaction {
    pub id: String,
    pub kind: TransactionKind,
    /// Always positive; direction is carried by `kind`.
    pub amount: Decimal,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Running balance after this transaction.
    pub balance: Decimal,
}
