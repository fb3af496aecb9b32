//! Odds provider clients and quote aggregation

pub mod retry;
pub mod sources;
pub mod odds_api;
pub mod simulated;

pub use retry::*;
pub use sources::*;
pub use odds_api::*;
pub use simulated::*;
