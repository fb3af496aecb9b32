//! Rounding and money conversion helpers

use rust_decimal::prelude::*;

/// Rounds a ratio or duration for reporting. Money goes through the
/// `Decimal` helpers below instead.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Converts a computed amount into `Decimal`. Non-finite input becomes zero.
pub fn to_money(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Amount rounded to cents.
pub fn round_money(value: f64) -> Decimal {
    to_money(value).round_dp(2)
}

/// Amount truncated to cents, so a reported stake never exceeds the
/// computed one.
pub fn floor_money(value: f64) -> Decimal {
    to_money(value).round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
