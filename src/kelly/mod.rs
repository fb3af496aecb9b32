//! Bankroll sizing and tracking

pub mod calculator;
pub mod ledger;

pub use calculator::*;
pub use ledger::*;
