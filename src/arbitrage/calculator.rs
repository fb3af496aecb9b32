//! Arbitrage opportunity calculation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use tracing::debug;
use crate::{
    config::{NOMINAL_STAKE_POOL, SECONDS_PER_LEG},
    types::{
        ArbitrageOpportunity, BestOdds, BookmakerPrice, Confidence, EventMetadata, Outcome,
        PriceQuote, RiskLevel, StakeLeg,
    },
    utils::to_money,
    validation::usable_odds,
};

/// Looks for a guaranteed-profit allocation across the quotes of one event.
///
/// Returns `None` whenever no risk-free split exists, which is the normal
/// outcome of most scans.
pub fn calculate_arbitrage(
    event: &EventMetadata,
    quotes: &[PriceQuote],
    now: DateTime<Utc>,
) -> Option<ArbitrageOpportunity> {
    if quotes.len() < 2 {
        return None;
    }

    let best_home = find_best_odds(quotes, Outcome::Home)?;
    let best_away = find_best_odds(quotes, Outcome::Away)?;
    let best_draw = find_best_odds(quotes, Outcome::Draw);

    let home_implied = 1.0 / best_home.odds;
    let away_implied = 1.0 / best_away.odds;
    if home_implied >= 1.0 || away_implied >= 1.0 {
        return None;
    }
    let draw_implied = best_draw.as_ref().map(|d| 1.0 / d.odds).unwrap_or(0.0);

    let total_implied_probability = home_implied + away_implied + draw_implied;
    if total_implied_probability >= 1.0 {
        debug!(
            event = %event.event_id,
            implied = total_implied_probability,
            "No arbitrage: book is over-round"
        );
        return None;
    }

    let priced = [
        (Outcome::Home, Some(&best_home)),
        (Outcome::Draw, best_draw.as_ref()),
        (Outcome::Away, Some(&best_away)),
    ];

    let mut stakes: Vec<StakeLeg> = priced
        .into_iter()
        .filter_map(|(outcome, price)| {
            let price = price?;
            let implied = 1.0 / price.odds;
            let stake = NOMINAL_STAKE_POOL * implied / total_implied_probability;
            if !stake.is_finite() || stake <= 0.0 {
                return None;
            }
            Some(StakeLeg {
                outcome,
                outcome_name: outcome.display_name(&event.home_team, &event.away_team),
                bookmaker: price.bookmaker.clone(),
                odds: price.odds,
                stake,
                profit: 0.0,
                implied_probability: implied * 100.0,
            })
        })
        .collect();

    if stakes.len() < 2 {
        return None;
    }

    let actual_investment: f64 = stakes.iter().map(|leg| leg.stake).sum();
    // Every leg pays the same by construction.
    let guaranteed_return = stakes[0].payout();
    let total_profit = guaranteed_return - actual_investment;
    let profit_percentage = (total_profit / actual_investment) * 100.0;

    if !profit_percentage.is_finite() || profit_percentage <= 0.0 {
        return None;
    }

    for leg in &mut stakes {
        leg.profit = leg.payout() - actual_investment;
    }

    let leg_count = stakes.len();
    let confidence = calculate_confidence(profit_percentage, quotes, leg_count, now);
    let time_remaining_minutes = (event.start_time - now).num_minutes().max(0);
    let risk_level = calculate_risk_level(profit_percentage, leg_count, time_remaining_minutes);
    let bookmaker_count = stakes
        .iter()
        .map(|leg| leg.bookmaker.as_str())
        .collect::<HashSet<_>>()
        .len();

    Some(ArbitrageOpportunity {
        id: format!("{}-{}", event.event_id, now.timestamp_millis()),
        event_id: event.event_id.clone(),
        home_team: event.home_team.clone(),
        away_team: event.away_team.clone(),
        competition: event.competition.clone(),
        match_time: event.start_time,
        discovered_at: now,
        total_profit: to_money(total_profit),
        profit_percentage,
        implied_probability: total_implied_probability,
        stakes,
        best_odds: BestOdds {
            home: best_home,
            draw: best_draw,
            away: best_away,
        },
        time_remaining_minutes,
        confidence,
        min_bankroll: round_up_to_hundred(to_money(actual_investment)),
        estimated_time_secs: leg_count as u32 * SECONDS_PER_LEG,
        risk_level,
        bookmaker_count,
    })
}

fn round_up_to_hundred(amount: Decimal) -> Decimal {
    (amount / dec!(100)).ceil() * dec!(100)
}

/// Highest usable price for an outcome; the earliest quote wins ties.
pub fn find_best_odds(quotes: &[PriceQuote], outcome: Outcome) -> Option<BookmakerPrice> {
    quotes
        .iter()
        .filter_map(|quote| {
            let odds = quote.odds_for(outcome).and_then(usable_odds)?;
            Some((quote, odds))
        })
        .fold(None::<(&PriceQuote, f64)>, |best, (quote, odds)| match best {
            Some((_, best_odds)) if odds <= best_odds => best,
            _ => Some((quote, odds)),
        })
        .map(|(quote, odds)| BookmakerPrice {
            bookmaker: quote.bookmaker.clone(),
            odds,
        })
}

pub fn calculate_confidence(
    profit_percentage: f64,
    quotes: &[PriceQuote],
    leg_count: usize,
    now: DateTime<Utc>,
) -> Confidence {
    let odds_age_minutes = average_quote_age_minutes(quotes, now);

    if profit_percentage > 3.0 && odds_age_minutes < 5.0 && leg_count >= 3 {
        return Confidence::High;
    }

    if profit_percentage > 1.5 && odds_age_minutes < 15.0 {
        return Confidence::Medium;
    }

    Confidence::Low
}

pub fn average_quote_age_minutes(quotes: &[PriceQuote], now: DateTime<Utc>) -> f64 {
    if quotes.is_empty() {
        return 0.0;
    }
    let total_ms: i64 = quotes
        .iter()
        .map(|quote| (now - quote.last_update).num_milliseconds())
        .sum();
    total_ms as f64 / quotes.len() as f64 / 60_000.0
}

pub fn calculate_risk_level(
    profit_percentage: f64,
    leg_count: usize,
    time_remaining_minutes: i64,
) -> RiskLevel {
    let mut risk_score = 0;

    // Profit margin
    if profit_percentage < 1.0 {
        risk_score += 3;
    } else if profit_percentage < 2.0 {
        risk_score += 1;
    }

    // Time to kick-off
    if time_remaining_minutes < 30 {
        risk_score += 3;
    } else if time_remaining_minutes < 60 {
        risk_score += 2;
    } else if time_remaining_minutes < 120 {
        risk_score += 1;
    }

    // Complexity
    if leg_count < 3 {
        risk_score += 1;
    }

    RiskLevel::from_score(risk_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn event(start_in_minutes: i64) -> EventMetadata {
        EventMetadata {
            event_id: "Manchester_City_vs_Arsenal".to_string(),
            home_team: "Manchester City".to_string(),
            away_team: "Arsenal".to_string(),
            competition: "Premier League".to_string(),
            start_time: now() + Duration::minutes(start_in_minutes),
        }
    }

    fn quote(bookmaker: &str, home: f64, draw: Option<f64>, away: f64, age_minutes: i64) -> PriceQuote {
        PriceQuote::new(bookmaker, home, draw, away, now() - Duration::minutes(age_minutes))
    }

    fn three_way_book() -> Vec<PriceQuote> {
        vec![
            quote("Bookmaker A", 2.10, Some(3.40), 3.80, 1),
            quote("Bookmaker B", 1.95, Some(3.60), 4.10, 1),
            quote("Bookmaker C", 2.05, Some(3.30), 4.50, 1),
        ]
    }

    #[test]
    fn detects_three_way_arbitrage() {
        let opp = calculate_arbitrage(&event(180), &three_way_book(), now()).unwrap();

        assert_eq!(opp.best_odds.home, BookmakerPrice { bookmaker: "Bookmaker A".into(), odds: 2.10 });
        assert_eq!(opp.best_odds.draw.as_ref().unwrap().bookmaker, "Bookmaker B");
        assert_eq!(opp.best_odds.away.bookmaker, "Bookmaker C");
        assert!((opp.implied_probability - 0.97619).abs() < 1e-4);
        assert!((opp.profit_percentage - 2.439).abs() < 0.01);
        assert_eq!(opp.stakes.len(), 3);
        assert_eq!(opp.bookmaker_count, 3);
        assert_eq!(opp.estimated_time_secs, 90);
        assert!(opp.min_bankroll >= to_money(opp.total_investment()).floor());
        assert_eq!(opp.min_bankroll % dec!(100), Decimal::ZERO);
        assert_eq!(opp.time_remaining_minutes, 180);
        assert_eq!(opp.confidence, Confidence::Medium);
        assert_eq!(opp.risk_level, RiskLevel::VeryLow);
        assert_eq!(opp.id, format!("Manchester_City_vs_Arsenal-{}", now().timestamp_millis()));
    }

    #[test]
    fn every_leg_pays_the_same() {
        let opp = calculate_arbitrage(&event(180), &three_way_book(), now()).unwrap();
        let payout = opp.guaranteed_return();
        for leg in &opp.stakes {
            assert!((leg.payout() - payout).abs() / payout < 1e-9);
            assert!((to_money(leg.profit) - opp.total_profit).abs() < dec!(0.000001));
        }
        assert!((opp.total_investment() - NOMINAL_STAKE_POOL).abs() < 1e-9);
    }

    #[test]
    fn over_round_book_yields_nothing() {
        let quotes = vec![
            quote("A", 1.50, None, 2.00, 1),
            quote("B", 1.50, None, 2.00, 1),
        ];
        assert!(calculate_arbitrage(&event(180), &quotes, now()).is_none());
    }

    #[test]
    fn single_quote_yields_nothing() {
        let quotes = vec![quote("A", 5.0, Some(5.0), 5.0, 0)];
        assert!(calculate_arbitrage(&event(180), &quotes, now()).is_none());
    }

    #[test]
    fn missing_mandatory_side_yields_nothing() {
        let quotes = vec![
            quote("A", f64::NAN, None, 2.2, 1),
            quote("B", 0.9, None, 2.3, 1),
        ];
        assert!(calculate_arbitrage(&event(180), &quotes, now()).is_none());
    }

    #[test]
    fn invalid_values_only_exclude_their_leg() {
        let quotes = vec![
            quote("A", 2.2, Some(f64::INFINITY), 1.0, 1),
            quote("B", -1.0, Some(1.0), 2.3, 1),
        ];
        let opp = calculate_arbitrage(&event(180), &quotes, now()).unwrap();
        assert_eq!(opp.stakes.len(), 2);
        assert!(opp.best_odds.draw.is_none());
        assert_eq!(opp.best_odds.home.bookmaker, "A");
        assert_eq!(opp.best_odds.away.bookmaker, "B");
    }

    #[test]
    fn two_way_market_gets_risk_point_for_leg_count() {
        let quotes = vec![
            quote("A", 2.2, None, 1.8, 1),
            quote("B", 1.8, None, 2.3, 1),
        ];
        let opp = calculate_arbitrage(&event(300), &quotes, now()).unwrap();
        // 1/2.2 + 1/2.3 = 0.8893 -> ~12.4% profit
        assert!(opp.profit_percentage > 12.0);
        assert_eq!(opp.risk_level, RiskLevel::Low);
        assert_eq!(opp.confidence, Confidence::Medium);
    }

    #[test]
    fn ties_keep_the_first_bookmaker() {
        let best = find_best_odds(
            &[quote("First", 2.5, None, 2.0, 0), quote("Second", 2.5, None, 2.0, 0)],
            Outcome::Home,
        )
        .unwrap();
        assert_eq!(best.bookmaker, "First");
    }

    #[test]
    fn started_match_reports_zero_minutes() {
        let opp = calculate_arbitrage(&event(-45), &three_way_book(), now()).unwrap();
        assert_eq!(opp.time_remaining_minutes, 0);
        assert_eq!(opp.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn confidence_tiers() {
        let fresh = vec![quote("A", 2.0, None, 2.0, 2), quote("B", 2.0, None, 2.0, 2)];
        let stale = vec![quote("A", 2.0, None, 2.0, 20), quote("B", 2.0, None, 2.0, 30)];

        assert_eq!(calculate_confidence(3.5, &fresh, 3, now()), Confidence::High);
        assert_eq!(calculate_confidence(3.5, &fresh, 2, now()), Confidence::Medium);
        assert_eq!(calculate_confidence(1.6, &fresh, 3, now()), Confidence::Medium);
        assert_eq!(calculate_confidence(3.5, &stale, 3, now()), Confidence::Low);
        assert_eq!(calculate_confidence(1.0, &fresh, 3, now()), Confidence::Low);
    }

    #[test]
    fn risk_score_mapping() {
        assert_eq!(calculate_risk_level(5.0, 3, 240), RiskLevel::VeryLow);
        assert_eq!(calculate_risk_level(1.5, 3, 90), RiskLevel::Low);
        assert_eq!(calculate_risk_level(0.8, 3, 240), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(1.5, 2, 45), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(0.8, 2, 10), RiskLevel::High);
    }

    #[test]
    fn min_bankroll_rounds_up_to_next_hundred() {
        assert_eq!(round_up_to_hundred(dec!(1000)), dec!(1000));
        assert_eq!(round_up_to_hundred(dec!(1000.01)), dec!(1100));
        assert_eq!(round_up_to_hundred(dec!(42)), dec!(100));
    }

    #[test]
    fn average_age_uses_all_quotes() {
        let quotes = vec![quote("A", 2.0, None, 2.0, 2), quote("B", 2.0, None, 2.0, 10)];
        assert!((average_quote_age_minutes(&quotes, now()) - 6.0).abs() < 1e-9);
    }
}
