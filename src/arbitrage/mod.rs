//! Arbitrage detection, ranking and batch scanning

pub mod calculator;
pub mod ranking;
pub mod scanner;

pub use calculator::*;
pub use ranking::*;
pub use scanner::*;
