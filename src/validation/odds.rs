//! Price validation functions

/// Decimal odds are usable only when finite and strictly above 1.0.
pub fn usable_odds(odds: f64) -> Option<f64> {
    (odds.is_finite() && odds > 1.0).then_some(odds)
}
