//! poly-tracker: movers tracker for Polymarket prediction markets
//!
//! This library provides the core components for:
//! - Market discovery via the Gamma events API (paginated, deduplicated)
//! - Category classification from event tags with keyword fallback
//! - Price-change estimation from Gamma fields with CLOB history fallback
//! - Range filtering and deterministic ranking of movers
//! - Short-lived TTL caching with an injectable clock
//! - Structured logging

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod market;
pub mod search;
pub mod telemetry;
