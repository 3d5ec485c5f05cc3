//! CLI interface for poly-tracker
//!
//! Provides subcommands for:
//! - `search`: run one retrieval/estimation/filter pass and print the movers
//! - `categories`: list categories and their classification tables
//! - `config`: show the effective configuration

mod search;

pub use search::SearchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-tracker")]
#[command(about = "Movers tracker for Polymarket prediction markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for the biggest movers
    Search(SearchArgs),
    /// List categories and their tag/keyword tables
    Categories,
    /// Show effective configuration
    Config,
}
