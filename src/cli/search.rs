//! Search command implementation

use crate::config::Config;
use crate::error::SearchError;
use crate::history::Horizon;
use crate::market::Category;
use crate::search::{CancelToken, MarketMove, RangeSpec, SearchEngine, SearchRequest};
use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Category to scan
    #[arg(short, long, default_value = "trending")]
    pub category: Category,

    /// Change horizon: 1h, 3h, 6h, 24h, 7d
    #[arg(long, default_value = "1h")]
    pub horizon: Horizon,

    /// Change-magnitude band: 10-30, 30-50, 50+, any
    #[arg(short, long, default_value = "any")]
    pub range: RangeSpec,

    /// Cap on printed rows
    #[arg(long, default_value = "25")]
    pub limit: usize,
}

impl SearchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let engine = SearchEngine::from_config(config)?;
        let cancel = CancelToken::new();
        let request = SearchRequest {
            category: self.category,
            horizon: self.horizon,
            range: self.range,
        };

        match engine.search(request, &cancel).await {
            Ok(moves) if moves.is_empty() => {
                println!(
                    "No markets in the {} band for {} over {}.",
                    self.range, self.category, self.horizon
                );
                Ok(())
            }
            Ok(moves) => {
                print_moves(&moves, self.limit);
                Ok(())
            }
            Err(e @ SearchError::UpstreamUnavailable(_)) => {
                eprintln!("Market data is unavailable right now; please retry shortly.");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn print_moves(moves: &[MarketMove], limit: usize) {
    println!(
        "{:<8} {:>10} {:<52} {}",
        "change", "vol 24h", "question", "link"
    );
    for mv in moves.iter().take(limit) {
        let pct = (mv.change * dec!(100)).to_f64().unwrap_or(0.0);
        let marker = if mv.approximated { "~" } else { " " };
        println!(
            "{marker}{pct:+6.1}% {:>10.0} {:<52} {}",
            mv.market.volume_24h.to_f64().unwrap_or(0.0),
            truncate(&mv.market.question, 52),
            mv.market.event_url(),
        );
    }
    if moves.len() > limit {
        println!("... and {} more", moves.len() - limit);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
