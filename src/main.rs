use clap::Parser;
use poly_tracker::cli::{Cli, Commands};
use poly_tracker::config::Config;
use poly_tracker::market::{category_spec, Category};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    poly_tracker::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Search(args) => {
            tracing::info!(
                category = %args.category,
                horizon = %args.horizon,
                range = %args.range,
                "Starting search"
            );
            args.execute(&config).await?;
        }
        Commands::Categories => {
            for category in Category::all() {
                match category_spec(*category) {
                    Some(spec) => println!(
                        "{:<10} tags: {:<40} keywords: {}",
                        category.as_str(),
                        spec.tags.join(", "),
                        spec.keywords.join(", ")
                    ),
                    None => println!("{:<10} (no filter, volume-ranked)", category.as_str()),
                }
            }
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Gamma endpoints: {}", config.gamma.endpoints.join(", "));
            println!("  CLOB endpoints: {}", config.clob.endpoints.join(", "));
            println!(
                "  Pagination: {} pages x {} events",
                config.gamma.page_count, config.gamma.page_size
            );
            println!("  Cache TTL: {}s", config.cache.ttl_secs);
            println!(
                "  History fallback bounds: {} (no direct field), {} (zero recheck)",
                config.estimator.fallback_candidates, config.estimator.zero_recheck_candidates
            );
        }
    }

    Ok(())
}
