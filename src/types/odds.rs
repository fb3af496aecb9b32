//! Bookmaker price quote types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a three-way (1X2) market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// Conventional 1X2 code.
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "X",
            Outcome::Away => "2",
        }
    }

    pub fn display_name(&self, home_team: &str, away_team: &str) -> String {
        match self {
            Outcome::Home => format!("{} Win", home_team),
            Outcome::Draw => "Draw".to_string(),
            Outcome::Away => format!("{} Win", away_team),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One bookmaker's decimal prices for one event.
///
/// Prices come from untrusted upstream data; anything that is not finite
/// and strictly above 1.0 is ignored at the point of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub bookmaker: String,
    pub home: f64,
    pub draw: Option<f64>,
    pub away: f64,
    pub last_update: DateTime<Utc>,
}

impl PriceQuote {
    pub fn new(
        bookmaker: impl Into<String>,
        home: f64,
        draw: Option<f64>,
        away: f64,
        last_update: DateTime<Utc>,
    ) -> Self {
        Self {
            bookmaker: bookmaker.into(),
            home,
            draw,
            away,
            last_update,
        }
    }

    pub fn odds_for(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => Some(self.home),
            Outcome::Draw => self.draw,
            Outcome::Away => Some(self.away),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: String,
    pub home_team: String,
    pub away_team: String,
    pub competition: String,
    pub start_time: DateTime<Utc>,
}

impl EventMetadata {
    /// Key used to merge quotes for the same fixture across providers.
    pub fn event_key(home_team: &str, away_team: &str) -> String {
        format!("{}_vs_{}", home_team, away_team).replace(' ', "_")
    }
}

/// All quotes collected for one event in a scan cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventQuotes {
    pub event: EventMetadata,
    pub quotes: Vec<PriceQuote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    /// Matches are treated as live for two hours after kick-off.
    pub fn from_start_time(start_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let minutes_until_start = (start_time - now).num_seconds() as f64 / 60.0;
        if minutes_until_start > 0.0 {
            MatchStatus::Scheduled
        } else if minutes_until_start > -120.0 {
            MatchStatus::Live
        } else {
            MatchStatus::Finished
        }
    }
}
