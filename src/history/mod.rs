//! Price-change estimation
//!
//! Prefers the precomputed change fields the Gamma API ships with each
//! market; falls back to walking a CLOB price-history series for a bounded
//! set of high-volume candidates.

mod clob;
mod estimator;

pub use clob::ClobClient;
pub use estimator::{ChangeEstimate, ChangeEstimator};

use crate::error::SourceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback horizon for a price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    OneHour,
    ThreeHours,
    SixHours,
    OneDay,
    OneWeek,
}

impl Horizon {
    pub fn all() -> &'static [Horizon] {
        &[
            Horizon::OneHour,
            Horizon::ThreeHours,
            Horizon::SixHours,
            Horizon::OneDay,
            Horizon::OneWeek,
        ]
    }

    /// Horizon length in seconds
    pub fn secs(&self) -> i64 {
        match self {
            Horizon::OneHour => 3_600,
            Horizon::ThreeHours => 3 * 3_600,
            Horizon::SixHours => 6 * 3_600,
            Horizon::OneDay => 24 * 3_600,
            Horizon::OneWeek => 7 * 24 * 3_600,
        }
    }

    /// Whether the Gamma API carries a change field for exactly this horizon
    pub fn has_direct_field(&self) -> bool {
        matches!(self, Horizon::OneHour | Horizon::OneDay | Horizon::OneWeek)
    }

    /// Smallest history interval whose span covers this horizon
    pub fn history_interval(&self) -> HistoryInterval {
        match self {
            Horizon::OneWeek => HistoryInterval::OneWeek,
            _ => HistoryInterval::OneDay,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::OneHour => "1h",
            Horizon::ThreeHours => "3h",
            Horizon::SixHours => "6h",
            Horizon::OneDay => "24h",
            Horizon::OneWeek => "7d",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(Horizon::OneHour),
            "3h" => Ok(Horizon::ThreeHours),
            "6h" => Ok(Horizon::SixHours),
            "24h" | "1d" => Ok(Horizon::OneDay),
            "7d" | "1w" => Ok(Horizon::OneWeek),
            other => Err(format!("unknown horizon: {other}")),
        }
    }
}

/// Granularity accepted by the CLOB history endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryInterval {
    OneDay,
    OneWeek,
}

impl HistoryInterval {
    /// Wire value for the `interval` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryInterval::OneDay => "1d",
            HistoryInterval::OneWeek => "1w",
        }
    }
}

/// One sample in a token's price history, ascending by time
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    /// Unix timestamp, seconds
    pub t: i64,
    /// Price in [0, 1]
    pub p: Decimal,
}

/// Port consumed by the change estimator; implemented by [`ClobClient`] and
/// by in-memory fakes in tests
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch the price series for one token at the given granularity
    async fn fetch_history(
        &self,
        token_id: &str,
        interval: HistoryInterval,
    ) -> Result<Vec<PricePoint>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_secs() {
        assert_eq!(Horizon::OneHour.secs(), 3600);
        assert_eq!(Horizon::OneDay.secs(), 86400);
        assert_eq!(Horizon::OneWeek.secs(), 604800);
    }

    #[test]
    fn test_horizon_round_trip() {
        for h in Horizon::all() {
            assert_eq!(h.as_str().parse::<Horizon>().unwrap(), *h);
        }
    }

    #[test]
    fn test_horizon_aliases() {
        assert_eq!("1d".parse::<Horizon>().unwrap(), Horizon::OneDay);
        assert_eq!("1w".parse::<Horizon>().unwrap(), Horizon::OneWeek);
    }

    #[test]
    fn test_direct_field_availability() {
        assert!(Horizon::OneHour.has_direct_field());
        assert!(Horizon::OneDay.has_direct_field());
        assert!(Horizon::OneWeek.has_direct_field());
        assert!(!Horizon::ThreeHours.has_direct_field());
        assert!(!Horizon::SixHours.has_direct_field());
    }

    #[test]
    fn test_history_interval_covers_horizon() {
        assert_eq!(Horizon::OneHour.history_interval(), HistoryInterval::OneDay);
        assert_eq!(Horizon::SixHours.history_interval(), HistoryInterval::OneDay);
        assert_eq!(Horizon::OneDay.history_interval(), HistoryInterval::OneDay);
        assert_eq!(Horizon::OneWeek.history_interval(), HistoryInterval::OneWeek);
    }

    #[test]
    fn test_price_point_deserialize() {
        let point: PricePoint = serde_json::from_str(r#"{"t": 1700000000, "p": 0.42}"#).unwrap();
        assert_eq!(point.t, 1_700_000_000);
        assert_eq!(point.p, rust_decimal_macros::dec!(0.42));
    }
}
