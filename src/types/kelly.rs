//! Bankroll sizing types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use super::StakeLeg;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    /// (conservative, moderate) cutoffs on the raw Kelly fraction.
    pub fn thresholds(&self) -> (f64, f64) {
        match self {
            RiskTolerance::Low => (0.02, 0.05),
            RiskTolerance::Medium => (0.05, 0.10),
            RiskTolerance::High => (0.10, 0.20),
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(RiskTolerance::Low),
            "MEDIUM" => Ok(RiskTolerance::Medium),
            "HIGH" => Ok(RiskTolerance::High),
            other => Err(format!("unknown risk tolerance: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankrollConfig {
    pub total_bankroll: f64,
    /// Percentage of the available bankroll allowed on a single bet.
    pub max_risk_per_bet: f64,
    pub risk_tolerance: RiskTolerance,
    pub reinvest_profits: bool,
    /// Percentage of the bankroll never allocated.
    pub emergency_fund: f64,
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            total_bankroll: 1000.0,
            max_risk_per_bet: 5.0,
            risk_tolerance: RiskTolerance::Medium,
            reinvest_profits: true,
            emergency_fund: 10.0,
        }
    }
}

impl BankrollConfig {
    pub fn available_bankroll(&self, bankroll: f64) -> f64 {
        bankroll * (1.0 - self.emergency_fund / 100.0)
    }

    pub fn max_fraction(&self) -> f64 {
        self.max_risk_per_bet / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingRiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    NotProfitable,
    VerySmallEdge,
    SmallProfit,
    LowRisk,
    ModerateRisk,
    HighRisk,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::NotProfitable => "Not profitable - avoid this bet",
            Recommendation::VerySmallEdge => "Very small edge - consider skipping",
            Recommendation::SmallProfit => "Small profit expected - good for practice",
            Recommendation::LowRisk => "Low risk - excellent opportunity",
            Recommendation::ModerateRisk => "Moderate risk - good value bet",
            Recommendation::HighRisk => "High risk - bet carefully",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KellyCalculation {
    /// Truncated to cents.
    pub optimal_stake: Decimal,
    /// Fraction of the available bankroll actually used, as a percentage.
    pub kelly_percentage: f64,
    pub expected_value: Decimal,
    pub risk_level: SizingRiskLevel,
    pub recommendation: Recommendation,
    pub max_drawdown: f64,
    /// Months, `f64::INFINITY` when there is no positive expectation.
    pub time_to_double: f64,
    /// Multiplier applied to the nominal split. Zero outside arbitrage sizing.
    pub scale_factor: f64,
    /// Per-bookmaker stakes after scaling; empty for single bets.
    pub scaled_legs: Vec<StakeLeg>,
}

impl KellyCalculation {
    pub fn not_profitable() -> Self {
        Self {
            optimal_stake: Decimal::ZERO,
            kelly_percentage: 0.0,
            expected_value: Decimal::ZERO,
            risk_level: SizingRiskLevel::Conservative,
            recommendation: Recommendation::NotProfitable,
            max_drawdown: 0.0,
            time_to_double: f64::INFINITY,
            scale_factor: 0.0,
            scaled_legs: Vec::new(),
        }
    }
}
