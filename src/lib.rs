//! Arb Scanner - Sports betting arbitrage detection with Kelly sizing
//!
//! Collects three-way match prices from bookmakers, finds risk-free stake
//! splits across them, ranks what it finds and sizes the best allocation
//! against a tracked bankroll.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod arbitrage;
pub mod kelly;
pub mod validation;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{BotError, BotResult};
pub use types::*;
