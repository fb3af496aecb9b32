//! Kelly criterion stake sizing
//!
//! Kelly = (b*p - q) / b
//! where b = odds - 1, p = probability of winning, q = 1 - p.
//!
//! Arbitrage sizing degenerates to a scaling problem because the win
//! probability is 1 by construction.

use rust_decimal::prelude::ToPrimitive;
use tracing::debug;
use crate::{
    config::{ARBITRAGE_KELLY_MULTIPLIER, BETS_PER_MONTH},
    errors::BotResult,
    types::{
        ArbitrageOpportunity, BankrollConfig, KellyCalculation, Recommendation, RiskTolerance,
        SizingRiskLevel, StakeLeg,
    },
    utils::{floor_money, round_money, round_to},
    validation::{usable_odds, validate_bankroll_config},
};

/// Below this expected value a bet is only worth it for practice.
const SMALL_PROFIT_THRESHOLD: f64 = 5.0;
const VERY_SMALL_EDGE: f64 = 0.01;

/// Sizes a single-sided bet given an estimate of the true odds.
pub fn calculate_kelly_stake(
    true_odds: f64,
    bookmaker_odds: f64,
    bankroll: f64,
    config: &BankrollConfig,
) -> BotResult<KellyCalculation> {
    validate_bankroll_config(config)?;

    let (Some(true_odds), Some(bookmaker_odds)) = (usable_odds(true_odds), usable_odds(bookmaker_odds)) else {
        debug!(true_odds, bookmaker_odds, "Unusable odds for Kelly sizing");
        return Ok(KellyCalculation::not_profitable());
    };
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Ok(KellyCalculation::not_profitable());
    }

    let b = bookmaker_odds - 1.0;
    let p = 1.0 / true_odds;
    let q = 1.0 - p;
    if b <= 0.0 {
        return Ok(KellyCalculation::not_profitable());
    }

    let kelly_fraction = (b * p - q) / b;
    let applied_fraction = kelly_fraction.clamp(0.0, config.max_fraction());

    let available_bankroll = config.available_bankroll(bankroll);
    let optimal_stake = available_bankroll * applied_fraction;
    let expected_value = (p * b - q) * optimal_stake;

    let risk_level = assess_risk_level(kelly_fraction, config.risk_tolerance);
    let recommendation = generate_recommendation(kelly_fraction, expected_value, risk_level);

    Ok(KellyCalculation {
        optimal_stake: floor_money(optimal_stake),
        kelly_percentage: round_to(applied_fraction * 100.0, 2),
        expected_value: round_money(expected_value),
        risk_level,
        recommendation,
        max_drawdown: calculate_max_drawdown(kelly_fraction),
        time_to_double: calculate_time_to_double(expected_value, bankroll),
        scale_factor: 0.0,
        scaled_legs: Vec::new(),
    })
}

/// Sizes a full arbitrage allocation. `legs` is the nominal split the
/// opportunity was computed with; it is scaled as a whole.
pub fn calculate_arbitrage_kelly(
    legs: &[StakeLeg],
    total_investment: f64,
    guaranteed_profit: f64,
    bankroll: f64,
    config: &BankrollConfig,
) -> BotResult<KellyCalculation> {
    validate_bankroll_config(config)?;

    if legs.is_empty()
        || !total_investment.is_finite()
        || total_investment <= 0.0
        || !guaranteed_profit.is_finite()
        || !bankroll.is_finite()
        || bankroll <= 0.0
    {
        return Ok(KellyCalculation::not_profitable());
    }

    let profit_rate = guaranteed_profit / total_investment;
    let kelly_fraction = (profit_rate * ARBITRAGE_KELLY_MULTIPLIER).min(config.max_fraction());

    let available_bankroll = config.available_bankroll(bankroll);
    let max_investment = available_bankroll * kelly_fraction.max(0.0);

    let scale_factor = max_investment / total_investment;
    let optimal_stake = total_investment * scale_factor;
    let expected_value = guaranteed_profit * scale_factor;

    // No market risk on a fully hedged allocation
    let risk_level = SizingRiskLevel::Conservative;
    let recommendation = generate_recommendation(kelly_fraction, expected_value, risk_level);

    debug!(
        legs = legs.len(),
        profit_rate,
        kelly_fraction,
        scale_factor,
        "Sized arbitrage allocation"
    );

    let scaled_legs = legs
        .iter()
        .map(|leg| StakeLeg {
            stake: leg.stake * scale_factor,
            profit: leg.profit * scale_factor,
            ..leg.clone()
        })
        .collect();

    Ok(KellyCalculation {
        optimal_stake: floor_money(optimal_stake),
        kelly_percentage: round_to(kelly_fraction.max(0.0) * 100.0, 2),
        expected_value: round_money(expected_value),
        risk_level,
        recommendation,
        max_drawdown: 0.0,
        time_to_double: calculate_time_to_double(expected_value, bankroll),
        scale_factor,
        scaled_legs,
    })
}

/// Sizes a detected opportunity against the configured bankroll.
pub fn size_opportunity(
    opportunity: &ArbitrageOpportunity,
    config: &BankrollConfig,
) -> BotResult<KellyCalculation> {
    calculate_arbitrage_kelly(
        &opportunity.stakes,
        opportunity.total_investment(),
        opportunity.total_profit.to_f64().unwrap_or_default(),
        config.total_bankroll,
        config,
    )
}

/// Cutoffs are inclusive.
pub fn assess_risk_level(kelly_fraction: f64, risk_tolerance: RiskTolerance) -> SizingRiskLevel {
    let (conservative, moderate) = risk_tolerance.thresholds();

    if kelly_fraction <= conservative {
        SizingRiskLevel::Conservative
    } else if kelly_fraction <= moderate {
        SizingRiskLevel::Moderate
    } else {
        SizingRiskLevel::Aggressive
    }
}

pub fn generate_recommendation(
    kelly_fraction: f64,
    expected_value: f64,
    risk_level: SizingRiskLevel,
) -> Recommendation {
    if kelly_fraction.is_nan() || kelly_fraction <= 0.0 {
        return Recommendation::NotProfitable;
    }

    if kelly_fraction < VERY_SMALL_EDGE {
        return Recommendation::VerySmallEdge;
    }

    if expected_value < SMALL_PROFIT_THRESHOLD {
        return Recommendation::SmallProfit;
    }

    match risk_level {
        SizingRiskLevel::Conservative => Recommendation::LowRisk,
        SizingRiskLevel::Moderate => Recommendation::ModerateRisk,
        SizingRiskLevel::Aggressive => Recommendation::HighRisk,
    }
}

/// Rough estimate, twice the Kelly percentage.
pub fn calculate_max_drawdown(kelly_fraction: f64) -> f64 {
    (kelly_fraction.max(0.0) * 100.0 * 2.0).round()
}

/// Months to double the bankroll assuming `BETS_PER_MONTH` comparable bets
/// compounding monthly.
pub fn calculate_time_to_double(expected_value: f64, bankroll: f64) -> f64 {
    if !(expected_value > 0.0) || !(bankroll > 0.0) {
        return f64::INFINITY;
    }

    let monthly_return = (expected_value / bankroll) * BETS_PER_MONTH;
    let months_to_double = 2f64.ln() / (1.0 + monthly_return).ln();

    round_to(months_to_double, 1)
}
