//! CLOB price-history client
//!
//! The endpoint usually wraps the series in a `{"history": [...]}` envelope
//! but has been observed returning a bare array; both shapes are accepted.

use super::{HistoryInterval, HistorySource, PricePoint};
use crate::config::ClobConfig;
use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// CLOB API base URL
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

/// Client for Polymarket's CLOB prices-history endpoint
pub struct ClobClient {
    endpoints: Vec<String>,
    client: Client,
}

impl ClobClient {
    /// Create a client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(&ClobConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: &ClobConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoints: config.endpoints.clone(),
            client,
        })
    }

    async fn fetch_once(
        &self,
        base: &str,
        token_id: &str,
        interval: HistoryInterval,
    ) -> Result<Vec<PricePoint>, SourceError> {
        let url = format!("{base}/prices-history");

        tracing::debug!(url = %url, token = token_id, interval = interval.as_str(), "Fetching price history");

        let response = self
            .client
            .get(&url)
            .query(&[("market", token_id), ("interval", interval.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        // parse from text so an unparseable 2xx body surfaces as Malformed,
        // not as a transport error
        let text = response.text().await?;
        let body: HistoryBody = serde_json::from_str(&text)?;
        Ok(body.into_points())
    }
}

#[async_trait]
impl HistorySource for ClobClient {
    async fn fetch_history(
        &self,
        token_id: &str,
        interval: HistoryInterval,
    ) -> Result<Vec<PricePoint>, SourceError> {
        let mut last_err = SourceError::Malformed("no clob endpoints configured".to_string());

        for base in &self.endpoints {
            match self.fetch_once(base, token_id, interval).await {
                Ok(points) => return Ok(points),
                Err(e) => {
                    tracing::warn!(endpoint = %base, error = %e, "CLOB endpoint failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

/// Either response shape of the history endpoint
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum HistoryBody {
    Envelope { history: Vec<PricePoint> },
    Bare(Vec<PricePoint>),
}

impl HistoryBody {
    fn into_points(self) -> Vec<PricePoint> {
        match self {
            HistoryBody::Envelope { history } => history,
            HistoryBody::Bare(points) => points,
        }
    }
}
