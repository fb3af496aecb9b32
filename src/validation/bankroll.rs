//! Bankroll configuration validation

use crate::{
    errors::{BotError, BotResult},
    types::BankrollConfig,
};

/// A malformed configuration is a programmer error and is reported as
/// such; degenerate but well-formed inputs are handled by the sizer.
pub fn validate_bankroll_config(config: &BankrollConfig) -> BotResult<()> {
    if !config.total_bankroll.is_finite() || config.total_bankroll < 0.0 {
        return Err(BotError::InvalidConfig {
            field: "total_bankroll",
            reason: format!("must be a non-negative amount, got {}", config.total_bankroll),
        });
    }

    if !config.max_risk_per_bet.is_finite()
        || config.max_risk_per_bet <= 0.0
        || config.max_risk_per_bet > 100.0
    {
        return Err(BotError::InvalidConfig {
            field: "max_risk_per_bet",
            reason: format!("must be within (0, 100], got {}", config.max_risk_per_bet),
        });
    }

    if !config.emergency_fund.is_finite()
        || config.emergency_fund < 0.0
        || config.emergency_fund >= 100.0
    {
        return Err(BotError::InvalidConfig {
            field: "emergency_fund",
            reason: format!("must be within [0, 100), got {}", config.emergency_fund),
        });
    }

    Ok(())
}
