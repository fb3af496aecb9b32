//! Core data types and structures

pub mod odds;
pub mod arbitrage;
pub mod kelly;
pub mod ledger;
pub mod ranking;

pub use odds::*;
pub use arbitrage::*;
pub use kelly::*;
pub use ledger::*;
pub use ranking::*;
