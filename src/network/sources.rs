//! Price source abstraction and multi-provider fan-out

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};
use crate::{
    errors::BotResult,
    types::EventQuotes,
};

/// One odds provider. Implementations normalize their payloads into
/// per-event quote lists; validation of individual prices is left to the
/// arbitrage engine.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_quotes(&self) -> BotResult<Vec<EventQuotes>>;
}

/// Queries every source concurrently and merges their quotes by event key.
/// A failing source is logged and skipped. Returns the error count
/// alongside the merged events so callers can feed a circuit breaker.
pub async fn collect_event_quotes(sources: &[Arc<dyn PriceSource>]) -> (Vec<EventQuotes>, usize) {
    let mut tasks = JoinSet::new();
    for source in sources {
        let source = Arc::clone(source);
        tasks.spawn(async move {
            let result = source.fetch_quotes().await;
            (source.name().to_string(), result)
        });
    }

    let mut batches = Vec::new();
    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, Ok(events))) => {
                info!(source = %name, events = events.len(), "📡 Odds received");
                batches.push((name, events));
            }
            Ok((name, Err(e))) => {
                warn!(source = %name, "⚠️ Odds fetch failed: {}", e);
                failures += 1;
            }
            Err(e) => {
                warn!("⚠️ Odds fetch task panicked: {}", e);
                failures += 1;
            }
        }
    }

    // Completion order is arbitrary; merge in source-name order so the
    // output is stable.
    batches.sort_by(|a, b| a.0.cmp(&b.0));
    (merge_event_quotes(batches.into_iter().flat_map(|(_, events)| events)), failures)
}

/// Groups quotes by event key. The first metadata seen for a key is kept.
pub fn merge_event_quotes(events: impl IntoIterator<Item = EventQuotes>) -> Vec<EventQuotes> {
    let mut merged: BTreeMap<String, EventQuotes> = BTreeMap::new();

    for entry in events {
        match merged.get_mut(&entry.event.event_id) {
            Some(existing) => existing.quotes.extend(entry.quotes),
            None => {
                merged.insert(entry.event.event_id.clone(), entry);
            }
        }
    }

    merged.into_values().collect()
}
