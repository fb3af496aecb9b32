//! Scanner configuration settings and environment variable handling

use std::env;
use crate::types::{BankrollConfig, RiskTolerance};

// Arbitrage constants
/// Reference pool the stake split is computed against. Results are reported
/// as percentages, so callers rescale freely.
pub const NOMINAL_STAKE_POOL: f64 = 1000.0;
pub const DEFAULT_MIN_PROFIT_PCT: f64 = 0.5;
pub const DEFAULT_TOP_N: usize = 20;
pub const SECONDS_PER_LEG: u32 = 30;

// Kelly constants
/// Heuristic boost applied to the guaranteed profit rate when sizing an
/// arbitrage. Not derived from the Kelly criterion; tune with care.
pub const ARBITRAGE_KELLY_MULTIPLIER: f64 = 2.0;
/// Independent betting events assumed per month for growth estimates.
pub const BETS_PER_MONTH: f64 = 30.0;

// Odds provider constants
pub const DEFAULT_ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const DEFAULT_SPORT: &str = "soccer_epl";
pub const DEFAULT_REGIONS: &str = "uk,eu,us";
pub const DEFAULT_BOOKMAKERS: &str =
    "bet365,pinnacle,betfair,williamhill,ladbrokes,coral,betway,unibet,betvictor,paddypower,skybet,betfred";
pub const RATE_LIMIT_FLOOR: u32 = 5;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// Scan loop constants
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;
pub const MIN_SCAN_INTERVAL_SECS: u64 = 10;
pub const MAX_TOP_N: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    // Odds provider
    pub odds_api_key: Option<String>,
    pub odds_api_base_url: String,
    pub sport: String,
    pub regions: String,
    pub bookmakers: Vec<String>,
    pub practice_mode: bool,
    // Scanning
    pub scan_interval_secs: u64,
    pub min_profit_pct: f64,
    pub top_n: usize,
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
    // Bankroll
    pub bankroll: BankrollConfig,
    // Logging
    pub log_json: bool,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unparseable
    /// values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_f64 = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok()).filter(|v| v.is_finite());
        let parse_bool = |key: &str, default: bool| {
            lookup(key)
                .and_then(|s| s.trim().parse::<bool>().ok())
                .unwrap_or(default)
        };

        let odds_api_key = lookup("ODDS_API_KEY").filter(|k| !k.trim().is_empty());
        let defaults = BankrollConfig::default();

        Self {
            practice_mode: parse_bool("PRACTICE_MODE", odds_api_key.is_none()),
            odds_api_key,
            odds_api_base_url: lookup("ODDS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ODDS_API_BASE_URL.to_string()),
            sport: lookup("ODDS_SPORT").unwrap_or_else(|| DEFAULT_SPORT.to_string()),
            regions: lookup("ODDS_REGIONS").unwrap_or_else(|| DEFAULT_REGIONS.to_string()),
            bookmakers: lookup("ODDS_BOOKMAKERS")
                .unwrap_or_else(|| DEFAULT_BOOKMAKERS.to_string())
                .split(',')
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect(),
            scan_interval_secs: lookup("SCAN_INTERVAL_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_SCAN_INTERVAL_SECS)
                .max(MIN_SCAN_INTERVAL_SECS),
            min_profit_pct: parse_f64("MIN_PROFIT_PCT")
                .unwrap_or(DEFAULT_MIN_PROFIT_PCT)
                .max(0.0),
            top_n: lookup("TOP_N")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_TOP_N)
                .clamp(1, MAX_TOP_N),
            max_consecutive_errors: 5,
            circuit_breaker_cooldown_secs: 300, // 5 minutes
            bankroll: BankrollConfig {
                total_bankroll: parse_f64("BANKROLL_TOTAL")
                    .unwrap_or(defaults.total_bankroll)
                    .max(0.0),
                max_risk_per_bet: parse_f64("MAX_RISK_PER_BET")
                    .unwrap_or(defaults.max_risk_per_bet)
                    .clamp(0.1, 100.0),
                risk_tolerance: lookup("RISK_TOLERANCE")
                    .and_then(|s| s.parse::<RiskTolerance>().ok())
                    .unwrap_or(defaults.risk_tolerance),
                reinvest_profits: parse_bool("REINVEST_PROFITS", defaults.reinvest_profits),
                emergency_fund: parse_f64("EMERGENCY_FUND_PCT")
                    .unwrap_or(defaults.emergency_fund)
                    .clamp(0.0, 99.0),
            },
            log_json: lookup("LOG_FORMAT").is_some_and(|f| f.trim().eq_ignore_ascii_case("json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert!(config.odds_api_key.is_none());
        assert!(config.practice_mode);
        assert_eq!(config.sport, DEFAULT_SPORT);
        assert_eq!(config.min_profit_pct, DEFAULT_MIN_PROFIT_PCT);
        assert_eq!(config.top_n, DEFAULT_TOP_N);
        assert_eq!(config.bookmakers.len(), 12);
        assert_eq!(config.bankroll.risk_tolerance, RiskTolerance::Medium);
    }

    #[test]
    fn api_key_disables_practice_mode() {
        let config = config_from(&[("ODDS_API_KEY", "abc123")]);
        assert_eq!(config.odds_api_key.as_deref(), Some("abc123"));
        assert!(!config.practice_mode);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = config_from(&[
            ("SCAN_INTERVAL_SECS", "1"),
            ("TOP_N", "5000"),
            ("MAX_RISK_PER_BET", "250"),
            ("EMERGENCY_FUND_PCT", "-3"),
            ("MIN_PROFIT_PCT", "NaN"),
        ]);
        assert_eq!(config.scan_interval_secs, MIN_SCAN_INTERVAL_SECS);
        assert_eq!(config.top_n, MAX_TOP_N);
        assert_eq!(config.bankroll.max_risk_per_bet, 100.0);
        assert_eq!(config.bankroll.emergency_fund, 0.0);
        assert_eq!(config.min_profit_pct, DEFAULT_MIN_PROFIT_PCT);
    }

    #[test]
    fn parses_bankroll_settings() {
        let config = config_from(&[
            ("BANKROLL_TOTAL", "5000"),
            ("RISK_TOLERANCE", "high"),
            ("REINVEST_PROFITS", "false"),
            ("ODDS_BOOKMAKERS", "pinnacle, bet365 ,"),
            ("LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(config.bankroll.total_bankroll, 5000.0);
        assert_eq!(config.bankroll.risk_tolerance, RiskTolerance::High);
        assert!(!config.bankroll.reinvest_profits);
        assert_eq!(config.bookmakers, vec!["pinnacle", "bet365"]);
        assert!(config.log_json);
    }
}
