//! Search façade
//!
//! Single entry point for the presentation layer: retrieval, per-market
//! change estimation and range filtering behind one call. Estimation runs as
//! concurrently awaited futures; the final ordering is imposed by the
//! ranking step, never by completion order.

mod filter;

pub use filter::{filter_and_rank, MarketMove, RangeSpec};

use crate::cache::{Clock, SystemClock};
use crate::config::Config;
use crate::error::SearchError;
use crate::history::{ChangeEstimator, ClobClient, HistorySource, Horizon};
use crate::market::{Category, GammaClient, MarketFetcher, MarketSource};
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal
///
/// A new search supersedes an in-flight one: the presentation layer cancels
/// the old token and the pipeline checks it before every network step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// One user-initiated search
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest {
    pub category: Category,
    pub horizon: Horizon,
    pub range: RangeSpec,
}

/// The full retrieval → estimation → filter pipeline
pub struct SearchEngine<S, H> {
    fetcher: MarketFetcher<S>,
    estimator: ChangeEstimator<H>,
}

impl SearchEngine<GammaClient, ClobClient> {
    /// Wire up the engine against the live Gamma and CLOB APIs
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let fetcher = MarketFetcher::new(
            GammaClient::with_config(&config.gamma)?,
            &config.gamma,
            config.cache.ttl(),
            Arc::clone(&clock),
        );
        let estimator = ChangeEstimator::new(
            ClobClient::with_config(&config.clob)?,
            &config.estimator,
            config.cache.ttl(),
            clock,
        );
        Ok(Self::new(fetcher, estimator))
    }
}

impl<S: MarketSource, H: HistorySource> SearchEngine<S, H> {
    pub fn new(fetcher: MarketFetcher<S>, estimator: ChangeEstimator<H>) -> Self {
        Self { fetcher, estimator }
    }

    /// Run one search
    ///
    /// `Ok(vec![])` means nothing matched; upstream trouble before any data
    /// was obtained surfaces as [`SearchError::UpstreamUnavailable`] so the
    /// caller can render a retry-eligible message instead of "no results".
    pub async fn search(
        &self,
        request: SearchRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<MarketMove>, SearchError> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let markets = self
            .fetcher
            .fetch_markets(request.category)
            .await
            .map_err(SearchError::from)?;

        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        // Estimation failures are isolated per market; a cancelled token
        // short-circuits each remaining future before its network call
        let estimates = join_all(markets.iter().enumerate().map(|(rank, market)| {
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(
                    self.estimator
                        .estimate(market, rank, request.horizon)
                        .await,
                )
            }
        }))
        .await;

        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let moves = markets
            .into_iter()
            .zip(estimates)
            .filter_map(|(market, estimate)| {
                estimate.map(|e| MarketMove {
                    market,
                    change: e.change,
                    horizon: request.horizon,
                    approximated: e.approximated,
                })
            })
            .collect();

        let ranked = filter_and_rank(moves, request.range);

        tracing::info!(
            category = %request.category,
            horizon = %request.horizon,
            range = %request.range,
            results = ranked.len(),
            "Search complete"
        );

        Ok(ranked)
    }
}
