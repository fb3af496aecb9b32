//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::Outcome;

/// One single-outcome bet inside a hedged allocation.
#[derive(Debug, Clone, Serialize)]
pub struct StakeLeg {
    pub outcome: Outcome,
    pub outcome_name: String,
    pub bookmaker: String,
    pub odds: f64,
    pub stake: f64,
    /// Net result of the whole allocation if this leg wins.
    pub profit: f64,
    /// Percentage, 1/odds * 100.
    pub implied_probability: f64,
}

impl StakeLeg {
    pub fn payout(&self) -> f64 {
        self.stake * self.odds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmakerPrice {
    pub bookmaker: String,
    pub odds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestOdds {
    pub home: BookmakerPrice,
    pub draw: Option<BookmakerPrice>,
    pub away: BookmakerPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => RiskLevel::VeryLow,
            1..=2 => RiskLevel::Low,
            3..=4 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub id: String,
    pub event_id: String,
    pub home_team: String,
    pub away_team: String,
    pub competition: String,
    pub match_time: DateTime<Utc>,
    pub discovered_at: DateTime<Utc>,
    /// Guaranteed profit on the nominal stake pool.
    pub total_profit: Decimal,
    pub profit_percentage: f64,
    /// Sum of implied probabilities across legs, always below 1.0.
    pub implied_probability: f64,
    pub stakes: Vec<StakeLeg>,
    pub best_odds: BestOdds,
    pub time_remaining_minutes: i64,
    pub confidence: Confidence,
    /// Total investment rounded up to the next 100.
    pub min_bankroll: Decimal,
    pub estimated_time_secs: u32,
    pub risk_level: RiskLevel,
    pub bookmaker_count: usize,
}

impl ArbitrageOpportunity {
    pub fn total_investment(&self) -> f64 {
        self.stakes.iter().map(|leg| leg.stake).sum()
    }

    pub fn guaranteed_return(&self) -> f64 {
        self.stakes.first().map(StakeLeg::payout).unwrap_or_default()
    }
}
