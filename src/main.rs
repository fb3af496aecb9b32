//! Arb Scanner - Main Entry Point
//!
//! Periodically scans bookmaker prices for arbitrage and sizes the best find

use arb_scanner::*;
use anyhow::Result;
use rust_decimal::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, error, info, warn};

use arb_scanner::arbitrage::ScanSettings;
use arb_scanner::kelly::BankrollLedger;
use arb_scanner::network::{OddsApiSource, PriceSource, SimulatedSource};
use arb_scanner::utils::SystemClock;

const OPPORTUNITIES_TO_PRINT: usize = 3;
const SESSION_STATS_EVERY: u64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = CONFIG.clone();

    // Initialize logging
    utils::setup_output_directories()?;
    let _logging_guard = utils::setup_logging(config.log_json)?;

    info!("🎯 Arb Scanner v{} - Arbitrage Detection & Kelly Sizing", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Mode: {}", if config.practice_mode { "PRACTICE (simulated odds)" } else { "LIVE" });
    info!("   Sport: {} | Regions: {}", config.sport, config.regions);
    info!("   Bookmakers: {}", config.bookmakers.len());
    info!("   Scan Interval: {}s", config.scan_interval_secs);
    info!("   Min Profit: {}% | Top N: {}", config.min_profit_pct, config.top_n);
    info!("   Bankroll: €{:.2} | Max Risk: {}% | Tolerance: {:?} | Emergency Fund: {}%",
        config.bankroll.total_bankroll,
        config.bankroll.max_risk_per_bet,
        config.bankroll.risk_tolerance,
        config.bankroll.emergency_fund
    );

    // Validate configuration
    validation::validate_bankroll_config(&config.bankroll)
        .map_err(|e| anyhow::anyhow!("Invalid bankroll configuration: {}", e))?;

    // Initialize components
    let circuit_breaker = Arc::new(errors::CircuitBreaker::new(
        config.max_consecutive_errors,
        config.circuit_breaker_cooldown_secs,
    ));
    let ledger = BankrollLedger::from_config(&config.bankroll)?;
    let sources = build_sources(&config)?;
    let settings = ScanSettings {
        min_profit_pct: config.min_profit_pct,
        top_n: config.top_n,
    };

    info!("✅ {} price source(s) ready: {}",
        sources.len(),
        sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    );

    // Setup monitoring state
    let start_time = Instant::now();
    let mut state = ScanState::default();

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("\n📛 Received shutdown signal (Ctrl+C)...");
                let _ = shutdown_tx.send(());
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    info!("\n🚀 Starting scan loop...\n");

    let mut interval = time::interval(Duration::from_secs(config.scan_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_scan_cycle(&sources, &config, settings, &ledger, &circuit_breaker, &mut state).await;

                if state.total_scans > 0 && state.total_scans % SESSION_STATS_EVERY == 0 {
                    print_session(start_time, &state, &ledger, &circuit_breaker).await;
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting scan loop...");
                break;
            }
        }
    }

    print_session(start_time, &state, &ledger, &circuit_breaker).await;

    Ok(())
}

/// Scan statistics accumulated over the session
#[derive(Default)]
struct ScanState {
    total_scans: u64,
    total_opportunities: u64,
    total_potential_profit: Decimal,
    error_counts: HashMap<String, u32>,
}

fn build_sources(config: &Config) -> Result<Vec<Arc<dyn PriceSource>>> {
    if !config.practice_mode {
        if let Some(source) = OddsApiSource::from_config(config)? {
            return Ok(vec![Arc::new(source)]);
        }
        warn!("⚠️ No ODDS_API_KEY configured, falling back to simulated odds");
    }
    Ok(vec![Arc::new(SimulatedSource::new(Arc::new(SystemClock)))])
}

async fn run_scan_cycle(
    sources: &[Arc<dyn PriceSource>],
    config: &Config,
    settings: ScanSettings,
    ledger: &BankrollLedger,
    circuit_breaker: &errors::CircuitBreaker,
    state: &mut ScanState,
) {
    if let Err(e) = circuit_breaker.check().await {
        warn!("⚡ {}", e);
        return;
    }

    let (events, failures) = network::collect_event_quotes(sources).await;

    if failures > 0 {
        *state.error_counts.entry("source_fetch".to_string()).or_insert(0) += failures as u32;
    }
    if failures == sources.len() {
        if circuit_breaker.record_error().await {
            error!("Circuit breaker activated after repeated fetch failures");
        }
        return;
    }
    circuit_breaker.record_success().await;

    state.total_scans += 1;
    let ranked = arbitrage::scan_events(&events, &SystemClock, settings);

    if ranked.items.is_empty() {
        debug!("No opportunities above {}% this scan", settings.min_profit_pct);
        return;
    }

    state.total_opportunities += ranked.stats.total_opportunities as u64;
    state.total_potential_profit += ranked.stats.total_potential_profit;

    for opportunity in ranked.items.iter().take(OPPORTUNITIES_TO_PRINT) {
        utils::print_arbitrage_opportunity(opportunity);
    }
    utils::print_scan_stats(&ranked.stats);

    let best = &ranked.items[0];
    match kelly::calculate_arbitrage_kelly(
        &best.stakes,
        best.total_investment(),
        best.total_profit.to_f64().unwrap_or_default(),
        ledger.sizing_bankroll(&config.bankroll),
        &config.bankroll,
    ) {
        Ok(sizing) => {
            utils::print_kelly_calculation(best, &sizing);
            if config.practice_mode {
                let description = format!("Practice arbitrage {}", best.event_id);
                if let Err(e) = ledger.settle_practice(&sizing, &description) {
                    *state.error_counts.entry("ledger".to_string()).or_insert(0) += 1;
                    error!("Failed to record practice result for {}: {}", best.id, e);
                }
            }
        }
        Err(e) => {
            *state.error_counts.entry("kelly_sizing".to_string()).or_insert(0) += 1;
            error!("Failed to size {}: {}", best.id, e);
        }
    }
}

async fn print_session(
    start_time: Instant,
    state: &ScanState,
    ledger: &BankrollLedger,
    circuit_breaker: &errors::CircuitBreaker,
) {
    utils::print_session_stats(
        start_time,
        state.total_scans,
        state.total_opportunities,
        state.total_potential_profit,
        ledger,
        &state.error_counts,
        circuit_breaker,
    )
    .await;
}
