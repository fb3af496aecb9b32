//! Display and printing utilities

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};
use crate::{
    errors::CircuitBreaker,
    kelly::BankrollLedger,
    types::{ArbitrageOpportunity, ArbitrageStats, KellyCalculation},
};

pub async fn print_session_stats(
    start_time: Instant,
    total_scans: u64,
    total_opportunities: u64,
    total_potential_profit: Decimal,
    ledger: &BankrollLedger,
    error_counts: &HashMap<String, u32>,
    circuit_breaker: &CircuitBreaker,
) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   📈 ARBITRAGE:");
    info!("     Scans completed: {}", total_scans);
    info!("     Opportunities found: {}", total_opportunities);
    info!("     Per scan: {:.2}",
        if total_scans > 0 {
            total_opportunities as f64 / total_scans as f64
        } else {
            0.0
        }
    );
    info!("     Total potential profit (per 1000 staked): €{:.2}", total_potential_profit);

    info!("   💼 BANKROLL:");
    info!("     Balance: €{:.2}", ledger.current_balance());
    info!("     Available: €{:.2}", ledger.available_balance());
    info!("     Emergency reserve: €{:.2}", ledger.emergency_reserve());
    info!("     ROI: {:.2}%", ledger.roi());

    info!("   ⚙️  SYSTEM:");
    info!("     Circuit breaker: {}",
        if *circuit_breaker.is_open.read().await { "OPEN" } else { "CLOSED" }
    );

    if !error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}

pub fn print_scan_stats(stats: &ArbitrageStats) {
    info!("📋 Scan summary:");
    info!("   Opportunities: {} ({} high confidence)",
        stats.total_opportunities, stats.high_confidence_count);
    info!("   Best profit: {:.2}%", stats.best_profit_percentage);
    info!("   Average profit: {:.2}%", stats.average_profit);
    info!("   Total potential profit: €{:.2}", stats.total_potential_profit);
    info!("   Average time to kick-off: {:.0}min", stats.average_time_remaining);
}

pub fn print_arbitrage_opportunity(opportunity: &ArbitrageOpportunity) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY #{}", opportunity.id);
    warn!("🏟️  {} vs {} ({})", opportunity.home_team, opportunity.away_team, opportunity.competition);
    warn!("⏰ Kick-off in {}min", opportunity.time_remaining_minutes);
    warn!("💰 Profit Analysis:");
    warn!("   Guaranteed Profit: €{:.2} per €{:.0} staked", opportunity.total_profit, opportunity.total_investment());
    warn!("   Margin: {:.3}%", opportunity.profit_percentage);
    warn!("   Implied Probability: {:.2}%", opportunity.implied_probability * 100.0);
    warn!("📋 Stakes:");
    for leg in &opportunity.stakes {
        warn!("   [{}] {:<24} @ {:.2} on {:<14} stake €{:.2}",
            leg.outcome, leg.outcome_name, leg.odds, leg.bookmaker, leg.stake);
    }
    warn!("📊 Confidence: {:?} | Risk: {:?} | Bookmakers: {} | Est. {}s to place",
        opportunity.confidence,
        opportunity.risk_level,
        opportunity.bookmaker_count,
        opportunity.estimated_time_secs
    );
}

pub fn print_kelly_calculation(opportunity: &ArbitrageOpportunity, sizing: &KellyCalculation) {
    info!("🧮 Kelly sizing for {}:", opportunity.id);
    info!("   Invest {:.2}% of bankroll (€{:.2}) for €{:.2} expected",
        sizing.kelly_percentage, sizing.optimal_stake, sizing.expected_value);
    if !sizing.scaled_legs.is_empty() {
        info!("   Scaled stakes (x{:.4}):", sizing.scale_factor);
        for leg in &sizing.scaled_legs {
            info!("     [{}] @ {:.2} on {:<14} stake €{:.2} → profit €{:.2}",
                leg.outcome, leg.odds, leg.bookmaker, leg.stake, leg.profit);
        }
    }
    info!("   Risk: {:?} | Max drawdown: {:.0}%", sizing.risk_level, sizing.max_drawdown);
    if sizing.time_to_double.is_finite() {
        info!("   Time to double: {:.1} months", sizing.time_to_double);
    } else {
        info!("   Time to double: never");
    }
    info!("   {}", sizing.recommendation);
}
