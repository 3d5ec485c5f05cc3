//! Configuration types for poly-tracker

use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gamma: GammaConfig,
    #[serde(default)]
    pub clob: ClobConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Gamma events API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GammaConfig {
    /// Base endpoints tried in order; later entries are relay fallbacks
    #[serde(default = "default_gamma_endpoints")]
    pub endpoints: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Events per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pages fetched concurrently per query
    #[serde(default = "default_page_count")]
    pub page_count: u32,
}

fn default_gamma_endpoints() -> Vec<String> {
    vec!["https://gamma-api.polymarket.com".to_string()]
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_page_size() -> u32 {
    250
}
fn default_page_count() -> u32 {
    4
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            endpoints: default_gamma_endpoints(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            page_count: default_page_count(),
        }
    }
}

/// CLOB price-history API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClobConfig {
    #[serde(default = "default_clob_endpoints")]
    pub endpoints: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_clob_endpoints() -> Vec<String> {
    vec!["https://clob.polymarket.com".to_string()]
}

impl Default for ClobConfig {
    fn default() -> Self {
        Self {
            endpoints: default_clob_endpoints(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// TTL cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of cached fetch results in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Change-estimation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    /// Volume-ranked prefix eligible for the history fallback when the
    /// requested horizon has no direct Gamma field
    #[serde(default = "default_fallback_candidates")]
    pub fallback_candidates: usize,

    /// Smaller prefix re-checked against history when a direct field exists
    /// but read zero
    #[serde(default = "default_zero_recheck_candidates")]
    pub zero_recheck_candidates: usize,

    /// Token ids consulted per market in the fallback path
    #[serde(default = "default_tokens_per_market")]
    pub tokens_per_market: usize,
}

fn default_fallback_candidates() -> usize {
    50
}
fn default_zero_recheck_candidates() -> usize {
    30
}
fn default_tokens_per_market() -> usize {
    2
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            fallback_candidates: default_fallback_candidates(),
            zero_recheck_candidates: default_zero_recheck_candidates(),
            tokens_per_market: default_tokens_per_market(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
