//! Batch scanning across many events

use tracing::{debug, info};
use crate::{
    arbitrage::{calculate_arbitrage, filter_profitable, rank_opportunities},
    types::{EventQuotes, RankedOpportunities},
    utils::Clock,
};

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub min_profit_pct: f64,
    pub top_n: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            min_profit_pct: crate::config::DEFAULT_MIN_PROFIT_PCT,
            top_n: crate::config::DEFAULT_TOP_N,
        }
    }
}

/// Runs detection over every event, applies the profit gate and ranks the
/// survivors. Events are independent, so evaluation order is irrelevant;
/// the result is ordered by the ranking sort.
pub fn scan_events(
    events: &[EventQuotes],
    clock: &dyn Clock,
    settings: ScanSettings,
) -> RankedOpportunities {
    let now = clock.now();

    let detected: Vec<_> = events
        .iter()
        .filter_map(|entry| {
            let opportunity = calculate_arbitrage(&entry.event, &entry.quotes, now)?;
            debug!(
                event = %entry.event.event_id,
                bookmakers = entry.quotes.len(),
                profit_pct = opportunity.profit_percentage,
                "💰 Arbitrage found"
            );
            Some(opportunity)
        })
        .collect();

    let detected_count = detected.len();
    let profitable = filter_profitable(detected, settings.min_profit_pct);

    info!(
        events = events.len(),
        detected = detected_count,
        profitable = profitable.len(),
        "🔍 Scan complete"
    );

    rank_opportunities(profitable, settings.top_n)
}
