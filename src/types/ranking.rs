//! Ranked scan output types

use rust_decimal::Decimal;
use serde::Serialize;
use super::ArbitrageOpportunity;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArbitrageStats {
    pub total_opportunities: usize,
    pub total_potential_profit: Decimal,
    /// Mean profit percentage.
    pub average_profit: f64,
    pub high_confidence_count: usize,
    pub best_profit_percentage: f64,
    /// Mean minutes until kick-off.
    pub average_time_remaining: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedOpportunities {
    pub items: Vec<ArbitrageOpportunity>,
    pub stats: ArbitrageStats,
}
