//! Opportunity ranking and aggregate statistics

use crate::{
    types::{ArbitrageOpportunity, ArbitrageStats, Confidence, RankedOpportunities},
    utils::mean,
};

/// Business gate applied across events: only opportunities strictly above
/// `min_profit_pct` survive.
pub fn filter_profitable(
    opportunities: Vec<ArbitrageOpportunity>,
    min_profit_pct: f64,
) -> Vec<ArbitrageOpportunity> {
    opportunities
        .into_iter()
        .filter(|opp| opp.profit_percentage > min_profit_pct)
        .collect()
}

/// Sorts by profit percentage (best first) and keeps the top `top_n`.
/// Statistics always describe the full input, not the truncated view.
pub fn rank_opportunities(
    mut opportunities: Vec<ArbitrageOpportunity>,
    top_n: usize,
) -> RankedOpportunities {
    opportunities.sort_by(|a, b| b.profit_percentage.total_cmp(&a.profit_percentage));

    let stats = calculate_stats(&opportunities);
    opportunities.truncate(top_n);

    RankedOpportunities {
        items: opportunities,
        stats,
    }
}

/// Expects `opportunities` sorted best first.
fn calculate_stats(opportunities: &[ArbitrageOpportunity]) -> ArbitrageStats {
    if opportunities.is_empty() {
        return ArbitrageStats::default();
    }

    ArbitrageStats {
        total_opportunities: opportunities.len(),
        total_potential_profit: opportunities.iter().map(|o| o.total_profit).sum(),
        average_profit: mean(opportunities.iter().map(|o| o.profit_percentage)),
        high_confidence_count: opportunities
            .iter()
            .filter(|o| o.confidence == Confidence::High)
            .count(),
        best_profit_percentage: opportunities[0].profit_percentage,
        average_time_remaining: mean(opportunities.iter().map(|o| o.time_remaining_minutes as f64)),
    }
}
