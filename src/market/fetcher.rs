//! Retrieval pipeline
//!
//! Fans out paginated event requests, flattens the event/market nesting,
//! deduplicates by market id, drops anything not displayable and applies the
//! category filter. Results are cached per category for a short TTL.

use super::{matches_category, Category, EventQuery, Market, MarketSource};
use crate::cache::{Clock, TtlCache};
use crate::config::GammaConfig;
use crate::error::SourceError;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Fetches and classifies markets from a [`MarketSource`]
pub struct MarketFetcher<S> {
    source: S,
    cache: TtlCache<Category, Vec<Market>>,
    page_size: u32,
    page_count: u32,
}

impl<S: MarketSource> MarketFetcher<S> {
    /// Create a fetcher with the given source, pagination settings, cache
    /// TTL and clock
    pub fn new(
        source: S,
        config: &GammaConfig,
        cache_ttl: std::time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            cache: TtlCache::new(cache_ttl, clock),
            page_size: config.page_size.max(1),
            page_count: config.page_count.max(1),
        }
    }

    /// Fetch all displayable markets for a category, volume-ranked
    ///
    /// Served from cache within the TTL window. Fails only when every page
    /// request failed; a partial page failure degrades to fewer results.
    pub async fn fetch_markets(&self, category: Category) -> Result<Vec<Market>, SourceError> {
        if let Some(cached) = self.cache.get(&category).await {
            tracing::debug!(category = %category, markets = cached.len(), "Cache hit");
            return Ok(cached);
        }

        let pages = join_all((0..self.page_count).map(|page| {
            self.source.fetch_events(EventQuery {
                limit: self.page_size,
                offset: page * self.page_size,
            })
        }))
        .await;

        let mut events = Vec::new();
        let mut last_err = None;
        let mut any_ok = false;
        for page in pages {
            match page {
                Ok(mut page_events) => {
                    any_ok = true;
                    events.append(&mut page_events);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Events page failed");
                    last_err = Some(e);
                }
            }
        }

        if !any_ok {
            // Total retrieval failure is the one fatal outcome
            return Err(last_err
                .unwrap_or_else(|| SourceError::Malformed("no pages requested".to_string())));
        }

        let markets = assemble(events, category);

        tracing::info!(
            category = %category,
            markets = markets.len(),
            "Fetched markets"
        );

        self.cache.insert(category, markets.clone()).await;
        Ok(markets)
    }
}

/// Flatten, dedup, drop non-displayable, classify and volume-rank
fn assemble(events: Vec<super::GammaEvent>, category: Category) -> Vec<Market> {
    let mut seen = HashSet::new();
    let mut markets: Vec<Market> = events
        .into_iter()
        .flat_map(|event| event.flatten())
        .filter(|m| !m.id.is_empty() && seen.insert(m.id.clone()))
        .filter(Market::displayable)
        .filter(|m| matches_category(m, category))
        .collect();

    // Every variant ranks by 24h volume; the category filter is what varies
    markets.sort_by(|a, b| b.volume_24h.cmp(&a.volume_24h));
    markets
}
