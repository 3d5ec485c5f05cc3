//! Range filtering and ranking
//!
//! The filter metric is the magnitude of the estimated price change, not the
//! current probability level. Bands are inclusive at the lower bound and
//! exclusive at the upper; the open-ended top band has no upper bound.

use crate::history::Horizon;
use crate::market::Market;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Change-magnitude band over [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeSpec {
    /// [0.10, 0.30)
    TenToThirty,
    /// [0.30, 0.50)
    ThirtyToFifty,
    /// [0.50, ∞)
    FiftyPlus,
    /// No band filter
    Any,
}

impl RangeSpec {
    /// Inclusive lower and exclusive upper bound
    pub fn bounds(&self) -> (Decimal, Option<Decimal>) {
        match self {
            RangeSpec::TenToThirty => (dec!(0.10), Some(dec!(0.30))),
            RangeSpec::ThirtyToFifty => (dec!(0.30), Some(dec!(0.50))),
            RangeSpec::FiftyPlus => (dec!(0.50), None),
            RangeSpec::Any => (Decimal::ZERO, None),
        }
    }

    /// Whether a change magnitude falls inside the band
    pub fn contains(&self, magnitude: Decimal) -> bool {
        let (lower, upper) = self.bounds();
        magnitude >= lower && upper.map_or(true, |u| magnitude < u)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSpec::TenToThirty => "10-30",
            RangeSpec::ThirtyToFifty => "30-50",
            RangeSpec::FiftyPlus => "50+",
            RangeSpec::Any => "any",
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "10-30" => Ok(RangeSpec::TenToThirty),
            "30-50" => Ok(RangeSpec::ThirtyToFifty),
            "50+" | "50" => Ok(RangeSpec::FiftyPlus),
            "any" | "all" => Ok(RangeSpec::Any),
            other => Err(format!("unknown range: {other}")),
        }
    }
}

/// A market with its estimated change, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct MarketMove {
    pub market: Market,
    /// Signed estimated change of the primary outcome price
    pub change: Decimal,
    /// Horizon the change was computed for
    pub horizon: Horizon,
    /// True when the change came from a coarser field, the history
    /// fallback, or was zeroed by the candidate bound
    pub approximated: bool,
}

impl MarketMove {
    pub fn magnitude(&self) -> Decimal {
        self.change.abs()
    }
}

/// Keep moves whose change magnitude is inside the band, ordered by
/// descending magnitude, then descending 24h volume, then market id
pub fn filter_and_rank(moves: Vec<MarketMove>, range: RangeSpec) -> Vec<MarketMove> {
    let mut passed: Vec<MarketMove> = moves
        .into_iter()
        .filter(|m| range.contains(m.magnitude()))
        .collect();

    passed.sort_by(|a, b| {
        b.magnitude()
            .cmp(&a.magnitude())
            .then_with(|| b.market.volume_24h.cmp(&a.market.volume_24h))
            .then_with(|| a.market.id.cmp(&b.market.id))
    });
    passed
}
