//! Change estimation
//!
//! Direct path: the Gamma change field matching the horizon, taken as-is
//! when present and non-zero. The 3h and 6h horizons have no field of their
//! own and borrow the 24h value, marked approximated.
//!
//! Derived path: walk the CLOB price series for the market's tokens and
//! subtract the price from `horizon` ago. Only a volume-ranked prefix of
//! candidates is eligible, to bound the request fan-out; everything beyond
//! the bound reports a zero change.

use super::{HistorySource, Horizon, PricePoint};
use crate::cache::{Clock, TtlCache};
use crate::config::EstimatorConfig;
use crate::error::SourceError;
use crate::market::Market;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Estimated price change for one market at one horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeEstimate {
    /// Signed change of the primary outcome price
    pub change: Decimal,
    /// True when the value was substituted from a coarser horizon, derived
    /// from history, or zeroed by the candidate bound
    pub approximated: bool,
}

impl ChangeEstimate {
    fn zero() -> Self {
        Self {
            change: Decimal::ZERO,
            approximated: true,
        }
    }
}

/// Estimates price changes with a bounded history fallback
pub struct ChangeEstimator<H> {
    history: H,
    cache: TtlCache<(String, Horizon), Decimal>,
    config: EstimatorConfig,
}

impl<H: HistorySource> ChangeEstimator<H> {
    /// Create an estimator with the given history source, cache TTL and clock
    pub fn new(
        history: H,
        config: &EstimatorConfig,
        cache_ttl: std::time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            history,
            cache: TtlCache::new(cache_ttl, clock),
            config: config.clone(),
        }
    }

    /// Estimate the change for one market
    ///
    /// `rank` is the market's position in the volume-ranked candidate list
    /// and gates the history fallback. Never fails: any error in the derived
    /// path degrades to a zero estimate for this market alone.
    pub async fn estimate(&self, market: &Market, rank: usize, horizon: Horizon) -> ChangeEstimate {
        if let Some(estimate) = direct_change(market, horizon) {
            return estimate;
        }

        let bound = if horizon.has_direct_field() {
            // The field existed but read zero; re-check only the very top
            self.config.zero_recheck_candidates
        } else {
            self.config.fallback_candidates
        };

        if rank >= bound || market.token_ids.is_empty() {
            return ChangeEstimate::zero();
        }

        let mut best = Decimal::ZERO;
        for token_id in market.token_ids.iter().take(self.config.tokens_per_market) {
            match self.derived_change(token_id, horizon).await {
                Ok(change) => {
                    if change.abs() > best.abs() {
                        best = change;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        market = %market.id,
                        token = %token_id,
                        error = %e,
                        "History fallback failed"
                    );
                }
            }
        }

        ChangeEstimate {
            change: best,
            approximated: true,
        }
    }

    /// Change derived from the token's price series, cached per
    /// (token, horizon)
    async fn derived_change(
        &self,
        token_id: &str,
        horizon: Horizon,
    ) -> Result<Decimal, SourceError> {
        let key = (token_id.to_string(), horizon);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let series = self
            .history
            .fetch_history(token_id, horizon.history_interval())
            .await?;
        let change = series_change(&series, horizon.secs());

        self.cache.insert(key, change).await;
        Ok(change)
    }
}

/// Direct Gamma field for the horizon, when present and non-zero
fn direct_change(market: &Market, horizon: Horizon) -> Option<ChangeEstimate> {
    let (field, approximated) = match horizon {
        Horizon::OneHour => (market.one_hour_change, false),
        Horizon::OneDay => (market.one_day_change, false),
        Horizon::OneWeek => (market.one_week_change, false),
        // No native field; borrow the coarser 24h value
        Horizon::ThreeHours | Horizon::SixHours => (market.one_day_change, true),
    };

    field
        .filter(|change| !change.is_zero())
        .map(|change| ChangeEstimate {
            change,
            approximated,
        })
}

/// Change over `horizon_secs` within an ascending price series
///
/// The past price is the latest sample at or before `latest.t -
/// horizon_secs`, or the oldest sample when none qualifies. Fewer than two
/// samples yields zero.
fn series_change(series: &[PricePoint], horizon_secs: i64) -> Decimal {
    let Some(latest) = series.last() else {
        return Decimal::ZERO;
    };
    if series.len() < 2 {
        return Decimal::ZERO;
    }

    let target = latest.t - horizon_secs;
    let past = series
        .iter()
        .rev()
        .find(|point| point.t <= target)
        .unwrap_or(&series[0]);

    latest.p - past.p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::ManualClock;
    use crate::history::HistoryInterval;
    use crate::market::testutil::test_market;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeHistory {
        series: HashMap<String, Vec<PricePoint>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeHistory {
        fn new(series: HashMap<String, Vec<PricePoint>>) -> Self {
            Self {
                series,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                series: HashMap::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl HistorySource for FakeHistory {
        async fn fetch_history(
            &self,
            token_id: &str,
            _interval: HistoryInterval,
        ) -> Result<Vec<PricePoint>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::Malformed("history down".to_string()));
            }
            Ok(self.series.get(token_id).cloned().unwrap_or_default())
        }
    }

    fn point(t: i64, p: Decimal) -> PricePoint {
        PricePoint { t, p }
    }

    fn estimator(history: FakeHistory) -> ChangeEstimator<FakeHistory> {
        ChangeEstimator::new(
            history,
            &EstimatorConfig::default(),
            Duration::from_secs(300),
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    #[test]
    fn test_series_change_picks_sample_at_target() {
        let series = vec![
            point(0, dec!(0.40)),
            point(3600, dec!(0.42)),
            point(7200, dec!(0.50)),
        ];
        // horizon 1h at latest t=7200: past sample is t=3600
        assert_eq!(series_change(&series, 3600), dec!(0.08));
    }

    #[test]
    fn test_series_change_falls_back_to_oldest() {
        let series = vec![point(7000, dec!(0.30)), point(7200, dec!(0.50))];
        // no sample at or before 7200 - 3600
        assert_eq!(series_change(&series, 3600), dec!(0.20));
    }

    #[test]
    fn test_series_change_too_few_samples() {
        assert_eq!(series_change(&[], 3600), Decimal::ZERO);
        assert_eq!(series_change(&[point(0, dec!(0.5))], 3600), Decimal::ZERO);
    }

    #[test]
    fn test_direct_change_exact_horizon() {
        let mut market = test_market("m");
        market.one_hour_change = Some(dec!(0.05));
        let est = direct_change(&market, Horizon::OneHour).unwrap();
        assert_eq!(est.change, dec!(0.05));
        assert!(!est.approximated);
    }

    #[test]
    fn test_direct_change_coarser_substitute() {
        let mut market = test_market("m");
        market.one_day_change = Some(dec!(-0.12));
        let est = direct_change(&market, Horizon::ThreeHours).unwrap();
        assert_eq!(est.change, dec!(-0.12));
        assert!(est.approximated);
    }

    #[test]
    fn test_direct_change_zero_field_rejected() {
        let mut market = test_market("m");
        market.one_hour_change = Some(Decimal::ZERO);
        assert!(direct_change(&market, Horizon::OneHour).is_none());
    }

    #[tokio::test]
    async fn test_estimate_uses_direct_field_without_network() {
        let mut market = test_market("m");
        market.one_hour_change = Some(dec!(0.07));
        market.token_ids = vec!["tok".to_string()];

        let est = estimator(FakeHistory::new(HashMap::new()));
        let result = est.estimate(&market, 0, Horizon::OneHour).await;
        assert_eq!(result.change, dec!(0.07));
        assert!(!result.approximated);
        assert_eq!(est.history.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_estimate_derives_from_history() {
        let mut market = test_market("m");
        market.token_ids = vec!["tok".to_string()];

        let mut series = HashMap::new();
        series.insert(
            "tok".to_string(),
            vec![
                point(0, dec!(0.40)),
                point(3600, dec!(0.42)),
                point(7200, dec!(0.50)),
            ],
        );

        let est = estimator(FakeHistory::new(series));
        let result = est.estimate(&market, 0, Horizon::OneHour).await;
        assert_eq!(result.change, dec!(0.08));
        assert!(result.approximated);
    }

    #[tokio::test]
    async fn test_estimate_takes_largest_magnitude_across_tokens() {
        let mut market = test_market("m");
        market.token_ids = vec!["yes".to_string(), "no".to_string()];

        let mut series = HashMap::new();
        series.insert(
            "yes".to_string(),
            vec![point(0, dec!(0.50)), point(7200, dec!(0.52))],
        );
        series.insert(
            "no".to_string(),
            vec![point(0, dec!(0.50)), point(7200, dec!(0.35))],
        );

        let est = estimator(FakeHistory::new(series));
        let result = est.estimate(&market, 0, Horizon::SixHours).await;
        assert_eq!(result.change, dec!(-0.15));
    }

    #[tokio::test]
    async fn test_estimate_beyond_bound_is_zero() {
        let mut market = test_market("m");
        market.token_ids = vec!["tok".to_string()];

        let est = estimator(FakeHistory::new(HashMap::new()));
        // fallback bound defaults to 50
        let result = est.estimate(&market, 50, Horizon::ThreeHours).await;
        assert_eq!(result.change, Decimal::ZERO);
        assert!(result.approximated);
        assert_eq!(est.history.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_direct_field_uses_tighter_bound() {
        let mut market = test_market("m");
        market.one_hour_change = Some(Decimal::ZERO);
        market.token_ids = vec!["tok".to_string()];

        let est = estimator(FakeHistory::new(HashMap::new()));
        // rank 30 is outside the zero-recheck bound even though it is
        // inside the general fallback bound
        let result = est.estimate(&market, 30, Horizon::OneHour).await;
        assert_eq!(result.change, Decimal::ZERO);
        assert_eq!(est.history.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_estimate_without_tokens_is_zero() {
        let market = test_market("m");
        let est = estimator(FakeHistory::new(HashMap::new()));
        let result = est.estimate(&market, 0, Horizon::ThreeHours).await;
        assert_eq!(result.change, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_history_failure_degrades_to_zero() {
        let mut market = test_market("m");
        market.token_ids = vec!["tok".to_string()];

        let est = estimator(FakeHistory::failing());
        let result = est.estimate(&market, 0, Horizon::ThreeHours).await;
        assert_eq!(result.change, Decimal::ZERO);
        assert!(result.approximated);
    }

    #[tokio::test]
    async fn test_derived_change_cached_within_ttl() {
        let mut market = test_market("m");
        market.token_ids = vec!["tok".to_string()];

        let mut series = HashMap::new();
        series.insert(
            "tok".to_string(),
            vec![point(0, dec!(0.40)), point(7200, dec!(0.50))],
        );

        let est = estimator(FakeHistory::new(series));
        let first = est.estimate(&market, 0, Horizon::ThreeHours).await;
        let second = est.estimate(&market, 0, Horizon::ThreeHours).await;
        assert_eq!(first, second);
        assert_eq!(est.history.calls.load(Ordering::SeqCst), 1);
    }
}
