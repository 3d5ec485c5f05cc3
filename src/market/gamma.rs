//! Gamma API client for market discovery
//!
//! Fetches active events from Polymarket's Gamma API. Events nest one or
//! more markets; several list-valued market fields arrive double-encoded as
//! JSON strings and are parsed leniently here.

use super::{EventQuery, Market, MarketSource};
use crate::config::GammaConfig;
use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

/// Gamma API base URL
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// Client for Polymarket's Gamma events API
///
/// Endpoints are tried in order; the tail of the list holds relay fallbacks
/// for deployments where the primary host is unreachable.
pub struct GammaClient {
    endpoints: Vec<String>,
    client: Client,
}

impl GammaClient {
    /// Create a client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(&GammaConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: &GammaConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoints: config.endpoints.clone(),
            client,
        })
    }

    async fn fetch_page(&self, base: &str, query: EventQuery) -> Result<Vec<GammaEvent>, SourceError> {
        let url = format!("{base}/events");

        tracing::debug!(url = %url, offset = query.offset, "Fetching events page");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("order", "volume"),
                ("ascending", "false"),
                ("limit", &query.limit.to_string()),
                ("offset", &query.offset.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        // parse from text so an unparseable 2xx body surfaces as Malformed,
        // not as a transport error
        let body = response.text().await?;
        let events: Vec<GammaEvent> = serde_json::from_str(&body)?;
        Ok(events)
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn fetch_events(&self, query: EventQuery) -> Result<Vec<GammaEvent>, SourceError> {
        let mut last_err = SourceError::Malformed("no gamma endpoints configured".to_string());

        for base in &self.endpoints {
            match self.fetch_page(base, query).await {
                Ok(events) => return Ok(events),
                Err(e) => {
                    tracing::warn!(endpoint = %base, error = %e, "Gamma endpoint failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

/// Event response from the Gamma API
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<GammaTag>,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}

/// Category tag attached to an event
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GammaTag {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub slug: String,
}

/// Market nested inside an event
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub slug: String,
    /// Outcome prices as JSON string: "[\"0.65\",\"0.35\"]"
    pub outcome_prices: Option<String>,
    /// CLOB token ids as JSON string
    pub clob_token_ids: Option<String>,
    #[serde(default)]
    pub volume24hr: Option<Decimal>,
    pub one_hour_price_change: Option<Decimal>,
    pub one_day_price_change: Option<Decimal>,
    pub one_week_price_change: Option<Decimal>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub closed: bool,
}

fn default_true() -> bool {
    true
}

impl GammaEvent {
    /// Flatten this event's nested markets, inheriting image, category, slug
    /// and tags from the event where the market lacks its own
    pub fn flatten(self) -> Vec<Market> {
        let mut tags: Vec<String> = self
            .tags
            .iter()
            .flat_map(|t| [t.label.to_lowercase(), t.slug.to_lowercase()])
            .filter(|t| !t.is_empty())
            .collect();
        // label and slug usually differ only in case
        let mut seen = std::collections::HashSet::new();
        tags.retain(|t| seen.insert(t.clone()));

        self.markets
            .into_iter()
            .map(|m| {
                let category = m
                    .category
                    .filter(|c| !c.is_empty())
                    .or_else(|| self.category.clone())
                    .unwrap_or_default();
                let image = m
                    .image
                    .filter(|i| !i.is_empty())
                    .or_else(|| self.image.clone())
                    .unwrap_or_default();

                Market {
                    id: m.id,
                    question: m.question,
                    category,
                    image,
                    slug: m.slug,
                    event_slug: self.slug.clone(),
                    event_title: self.title.clone(),
                    tags: tags.clone(),
                    outcome_prices: parse_price_list(m.outcome_prices.as_deref()),
                    one_hour_change: m.one_hour_price_change,
                    one_day_change: m.one_day_price_change,
                    one_week_change: m.one_week_price_change,
                    volume_24h: m.volume24hr.unwrap_or_default(),
                    active: m.active,
                    closed: m.closed,
                    token_ids: parse_string_list(m.clob_token_ids.as_deref()),
                }
            })
            .collect()
    }
}

/// Parse a double-encoded string list such as "[\"tok1\", \"tok2\"]"
///
/// Unparseable input yields an empty list rather than an error; a missing
/// token list only disables the history fallback for that market.
fn parse_string_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

/// Parse a double-encoded price list such as "[\"0.65\", \"0.35\"]"
fn parse_price_list(raw: Option<&str>) -> Vec<Decimal> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .map(|prices| {
            prices
                .iter()
                .filter_map(|p| Decimal::from_str(p).ok())
                .collect()
        })
        .unwrap_or_default()
}
