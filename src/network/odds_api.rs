//! The Odds API (v4) price source

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::{
    config::{Config, RATE_LIMIT_FLOOR, REQUEST_TIMEOUT_SECS},
    errors::{BotError, BotResult},
    network::{
        retry::{retry_with_backoff, PermanentFailure, RetryConfig},
        sources::PriceSource,
    },
    types::{EventMetadata, EventQuotes, MatchStatus, PriceQuote},
};

const H2H_MARKET: &str = "h2h";
const DEFAULT_QUOTA: u32 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct OddsApiEvent {
    pub id: String,
    pub sport_title: String,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<OddsApiBookmaker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsApiBookmaker {
    pub key: String,
    pub title: String,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub markets: Vec<OddsApiMarket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsApiMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsApiOutcome {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub used: Option<u32>,
    /// Raw `x-requests-reset` value, when the provider sends one.
    pub reset: Option<String>,
}

impl RateLimitStatus {
    pub fn percentage(&self) -> f64 {
        self.remaining as f64 / DEFAULT_QUOTA as f64 * 100.0
    }
}

pub struct OddsApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sport: String,
    regions: String,
    bookmakers: String,
    retry: RetryConfig,
    rate_limit: Mutex<RateLimitStatus>,
}

impl OddsApiSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sport: impl Into<String>,
        regions: impl Into<String>,
        bookmakers: &[String],
    ) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                warn!("⚠️ Failed to initialize HTTP client: {}", e);
                BotError::Network {
                    message: "Failed to build HTTP client".to_string(),
                    source: Some(e.into()),
                    retry_count: 0,
                }
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sport: sport.into(),
            regions: regions.into(),
            bookmakers: bookmakers.join(","),
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 500,
                ..Default::default()
            },
            rate_limit: Mutex::new(RateLimitStatus {
                remaining: DEFAULT_QUOTA,
                used: None,
                reset: None,
            }),
        })
    }

    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &Config) -> BotResult<Option<Self>> {
        let Some(api_key) = config.odds_api_key.as_ref() else {
            return Ok(None);
        };

        let source = Self::new(
            config.odds_api_base_url.clone(),
            api_key.clone(),
            config.sport.clone(),
            config.regions.clone(),
            &config.bookmakers,
        )?;
        info!("✅ Live odds source initialized for {}", config.sport);
        Ok(Some(source))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limit.lock().clone()
    }

    fn ensure_quota(&self) -> BotResult<()> {
        let remaining = self.rate_limit.lock().remaining;
        if remaining <= RATE_LIMIT_FLOOR {
            return Err(BotError::RateLimited { remaining });
        }
        Ok(())
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        let header_u32 = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|v| v.max(0.0) as u32)
        };

        let mut status = self.rate_limit.lock();
        if let Some(remaining) = header_u32("x-requests-remaining") {
            status.remaining = remaining;
        }
        if let Some(used) = header_u32("x-requests-used") {
            status.used = Some(used);
        }
        if let Some(reset) = headers.get("x-requests-reset").and_then(|v| v.to_str().ok()) {
            status.reset = Some(reset.to_string());
        }
    }

    async fn fetch_body(&self) -> BotResult<String> {
        let url = format!("{}/sports/{}/odds", self.base_url, self.sport);

        let operation = || async {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("apiKey", self.api_key.as_str()),
                    ("regions", self.regions.as_str()),
                    ("markets", H2H_MARKET),
                    ("oddsFormat", "decimal"),
                    ("dateFormat", "iso"),
                    ("bookmakers", self.bookmakers.as_str()),
                ])
                .send()
                .await
                .context("HTTP request failed")?;

            self.record_rate_limit(response.headers());

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("⚠️ Odds API returned error status {}: {}", status, body);
                let message = format!("Odds API error: {} - {}", status, body);
                // Client errors other than throttling will not fix themselves
                if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(anyhow::Error::new(PermanentFailure(message)));
                }
                return Err(anyhow::anyhow!(message));
            }

            response.text().await.context("Failed to read response body")
        };

        retry_with_backoff(operation, &self.retry, "Odds API fetch").await
    }
}

#[async_trait]
impl PriceSource for OddsApiSource {
    fn name(&self) -> &str {
        "the-odds-api"
    }

    async fn fetch_quotes(&self) -> BotResult<Vec<EventQuotes>> {
        self.ensure_quota()?;

        let body = self.fetch_body().await?;
        let events: Vec<OddsApiEvent> = serde_json::from_str(&body).map_err(|e| BotError::DataParsing {
            context: format!("Odds API payload for {}", self.sport),
            source: e.into(),
        })?;

        let now = Utc::now();
        let live = events
            .iter()
            .filter(|e| MatchStatus::from_start_time(e.commence_time, now) == MatchStatus::Live)
            .count();
        let quota = self.rate_limit_status();
        debug!(
            events = events.len(),
            live,
            remaining = quota.remaining,
            quota_pct = quota.percentage(),
            "Odds API payload decoded"
        );

        Ok(events.into_iter().map(normalize_event).collect())
    }
}

/// Converts one provider event into quotes. Only the head-to-head market
/// is used; bookmakers without both team prices are skipped.
pub fn normalize_event(event: OddsApiEvent) -> EventQuotes {
    let quotes = event
        .bookmakers
        .iter()
        .filter_map(|bookmaker| {
            let market = bookmaker.markets.iter().find(|m| m.key == H2H_MARKET)?;
            let outcomes = &market.outcomes;

            let home = outcomes.iter().find(|o| o.name == event.home_team)?.price;
            let away = outcomes.iter().find(|o| o.name == event.away_team)?.price;
            let draw = outcomes
                .iter()
                .find(|o| o.name.eq_ignore_ascii_case("draw"))
                .map(|o| o.price);

            Some(PriceQuote {
                bookmaker: bookmaker.title.clone(),
                home,
                draw,
                away,
                last_update: bookmaker.last_update,
            })
        })
        .collect();

    EventQuotes {
        event: EventMetadata {
            event_id: EventMetadata::event_key(&event.home_team, &event.away_team),
            home_team: event.home_team,
            away_team: event.away_team,
            competition: event.sport_title,
            start_time: event.commence_time,
        },
        quotes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
      {
        "id": "e912304de2b2ce35b473ce2ecd3d1502",
        "sport_key": "soccer_epl",
        "sport_title": "EPL",
        "commence_time": "2026-05-02T14:00:00Z",
        "home_team": "Chelsea",
        "away_team": "Tottenham Hotspur",
        "bookmakers": [
          {
            "key": "pinnacle",
            "title": "Pinnacle",
            "last_update": "2026-05-01T11:58:02Z",
            "markets": [
              {
                "key": "h2h",
                "outcomes": [
                  {"name": "Chelsea", "price": 2.10},
                  {"name": "Tottenham Hotspur", "price": 3.80},
                  {"name": "Draw", "price": 3.40}
                ]
              }
            ]
          },
          {
            "key": "betfair",
            "title": "Betfair",
            "last_update": "2026-05-01T11:57:40Z",
            "markets": [
              {
                "key": "h2h",
                "outcomes": [
                  {"name": "Chelsea", "price": 1.95},
                  {"name": "Tottenham Hotspur", "price": 4.50},
                  {"name": "Draw", "price": 3.60}
                ]
              }
            ]
          },
          {
            "key": "williamhill",
            "title": "William Hill",
            "last_update": "2026-05-01T11:50:00Z",
            "markets": [
              {"key": "spreads", "outcomes": [{"name": "Chelsea", "price": 1.9}]}
            ]
          },
          {
            "key": "coral",
            "title": "Coral",
            "last_update": "2026-05-01T11:50:00Z",
            "markets": [
              {"key": "h2h", "outcomes": [{"name": "Chelsea", "price": 2.0}]}
            ]
          }
        ]
      }
    ]"#;

    fn source(base_url: &str) -> OddsApiSource {
        OddsApiSource::new(base_url, "test-key", "soccer_epl", "uk,eu", &["pinnacle".to_string()])
            .unwrap()
            .with_retry(RetryConfig {
                max_attempts: 2,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                exponential_base: 2.0,
            })
    }

    #[test]
    fn normalizes_head_to_head_market() {
        let events: Vec<OddsApiEvent> = serde_json::from_str(PAYLOAD).unwrap();
        let normalized = normalize_event(events[0].clone());

        assert_eq!(normalized.event.event_id, "Chelsea_vs_Tottenham_Hotspur");
        assert_eq!(normalized.event.competition, "EPL");
        assert_eq!(normalized.quotes.len(), 2);

        let pinnacle = &normalized.quotes[0];
        assert_eq!(pinnacle.bookmaker, "Pinnacle");
        assert_eq!(pinnacle.home, 2.10);
        assert_eq!(pinnacle.draw, Some(3.40));
        assert_eq!(pinnacle.away, 3.80);
    }

    #[tokio::test]
    async fn fetches_and_tracks_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sports/soccer_epl/odds")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-requests-remaining", "3")
            .with_header("x-requests-used", "497")
            .with_header("x-requests-reset", "2026-06-01T00:00:00Z")
            .with_body(PAYLOAD)
            .create_async()
            .await;

        let source = source(&server.url());
        let events = source.fetch_quotes().await.unwrap();
        mock.assert_async().await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].quotes.len(), 2);
        assert_eq!(
            source.rate_limit_status(),
            RateLimitStatus {
                remaining: 3,
                used: Some(497),
                reset: Some("2026-06-01T00:00:00Z".to_string()),
            }
        );

        // Quota floor reached: no further requests
        assert!(matches!(
            source.fetch_quotes().await,
            Err(BotError::RateLimited { remaining: 3 })
        ));
    }

    #[tokio::test]
    async fn server_errors_surface_as_network_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/sports/soccer_epl/odds")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("upstream down")
            .expect(2)
            .create_async()
            .await;

        let result = source(&server.url()).fetch_quotes().await;
        assert!(matches!(result, Err(BotError::Network { retry_count: 2, .. })));
    }

    #[tokio::test]
    async fn rejected_key_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sports/soccer_epl/odds")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "API key is not valid"}"#)
            .expect(1)
            .create_async()
            .await;

        let result = source(&server.url()).fetch_quotes().await;
        mock.assert_async().await;
        assert!(matches!(result, Err(BotError::Network { retry_count: 1, .. })));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/sports/soccer_epl/odds")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"message": "not a list"}"#)
            .create_async()
            .await;

        let result = source(&server.url()).fetch_quotes().await;
        assert!(matches!(result, Err(BotError::DataParsing { .. })));
    }
}
