//! Market discovery module
//!
//! Fetches active markets from the Gamma events API, flattens the nested
//! event/market structure and classifies markets into display categories.

mod classify;
mod fetcher;
mod gamma;

pub use classify::{category_spec, matches_category, CategorySpec};
pub use fetcher::MarketFetcher;
pub use gamma::{GammaClient, GammaEvent, GammaMarket, GammaTag};

use crate::error::SourceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display categories offered by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// No category filter, ranked by 24h volume
    Trending,
    Politics,
    Crypto,
    Finance,
    Tech,
    Economy,
    Trump,
    World,
    /// Union of everything the source returns
    All,
}

impl Category {
    /// All selectable categories, in display order
    pub fn all() -> &'static [Category] {
        &[
            Category::Trending,
            Category::Politics,
            Category::Crypto,
            Category::Finance,
            Category::Tech,
            Category::Economy,
            Category::Trump,
            Category::World,
            Category::All,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Trending => "trending",
            Category::Politics => "politics",
            Category::Crypto => "crypto",
            Category::Finance => "finance",
            Category::Tech => "tech",
            Category::Economy => "economy",
            Category::Trump => "trump",
            Category::World => "world",
            Category::All => "all",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trending" => Ok(Category::Trending),
            "politics" => Ok(Category::Politics),
            "crypto" => Ok(Category::Crypto),
            "finance" => Ok(Category::Finance),
            "tech" => Ok(Category::Tech),
            "economy" => Ok(Category::Economy),
            "trump" => Ok(Category::Trump),
            "world" => Ok(Category::World),
            "all" => Ok(Category::All),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A flattened Polymarket market, enriched with fields inherited from its
/// parent event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Unique market identifier
    pub id: String,
    /// Market question
    pub question: String,
    /// Category label from the market or its parent event, possibly empty
    pub category: String,
    /// Card image URL, inherited from the event when absent on the market
    pub image: String,
    /// Market slug
    pub slug: String,
    /// Parent event slug, used to build the detail-page link
    pub event_slug: String,
    /// Parent event title
    pub event_title: String,
    /// Lowercased parent event tag labels
    pub tags: Vec<String>,
    /// Outcome prices; the first entry is the primary (yes) probability
    pub outcome_prices: Vec<Decimal>,
    /// Precomputed 1-hour price change, when the source provides one
    pub one_hour_change: Option<Decimal>,
    /// Precomputed 24-hour price change
    pub one_day_change: Option<Decimal>,
    /// Precomputed 7-day price change
    pub one_week_change: Option<Decimal>,
    /// Rolling 24-hour volume
    pub volume_24h: Decimal,
    pub active: bool,
    pub closed: bool,
    /// CLOB token ids for the history endpoint
    pub token_ids: Vec<String>,
}

impl Market {
    /// Primary (yes) outcome price, if any prices were present
    pub fn primary_price(&self) -> Option<Decimal> {
        self.outcome_prices.first().copied()
    }

    /// Whether this market may be surfaced at all
    pub fn displayable(&self) -> bool {
        self.active && !self.closed
    }

    /// Detail-page URL on polymarket.com
    pub fn event_url(&self) -> String {
        let slug = if self.event_slug.is_empty() {
            &self.slug
        } else {
            &self.event_slug
        };
        format!("https://polymarket.com/event/{slug}")
    }
}

/// One page of an offset-paginated events query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    pub limit: u32,
    pub offset: u32,
}

/// Port consumed by the retrieval pipeline; implemented by [`GammaClient`]
/// and by in-memory fakes in tests
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch one page of active events
    async fn fetch_events(&self, query: EventQuery) -> Result<Vec<GammaEvent>, SourceError>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Minimal active market fixture shared by unit tests
    pub(crate) fn test_market(id: &str) -> Market {
        Market {
            id: id.to_string(),
            question: format!("Question {id}?"),
            category: String::new(),
            image: String::new(),
            slug: format!("market-{id}"),
            event_slug: format!("event-{id}"),
            event_title: String::new(),
            tags: vec![],
            outcome_prices: vec![],
            one_hour_change: None,
            one_day_change: None,
            one_week_change: None,
            volume_24h: Decimal::ZERO,
            active: true,
            closed: false,
            token_ids: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::test_market;
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in Category::all() {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), *cat);
        }
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("Crypto".parse::<Category>().unwrap(), Category::Crypto);
        assert_eq!("TRENDING".parse::<Category>().unwrap(), Category::Trending);
    }

    #[test]
    fn test_category_parse_unknown() {
        assert!("sports".parse::<Category>().is_err());
    }

    #[test]
    fn test_event_url_prefers_event_slug() {
        let mut market = test_market("1");
        market.slug = "market-slug".to_string();
        market.event_slug = "event-slug".to_string();
        assert_eq!(market.event_url(), "https://polymarket.com/event/event-slug");

        market.event_slug.clear();
        assert_eq!(market.event_url(), "https://polymarket.com/event/market-slug");
    }

    #[test]
    fn test_displayable() {
        let mut market = test_market("1");
        assert!(market.displayable());
        market.closed = true;
        assert!(!market.displayable());
        market.closed = false;
        market.active = false;
        assert!(!market.displayable());
    }
}
