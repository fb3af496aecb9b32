//! Validation functions for prices and bankroll settings

pub mod odds;
pub mod bankroll;

pub use odds::*;
pub use bankroll::*;
