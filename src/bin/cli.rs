//! dangmoa CLI
//!
//! Local execution entry point for one-off multi-region searches.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dangmoa::{
    cache::ResultCache,
    error::{AppError, Result},
    limiter::RateLimiter,
    models::{ClientInfo, Config, SearchFilters, SearchRequest},
    pipeline::{Aggregator, SearchService},
    services::{HttpPageFetcher, RegionCrawler},
    storage::LocalSearchLog,
};

/// dangmoa - Daangn Multi-Region Search
#[derive(Parser, Debug)]
#[command(
    name = "dangmoa",
    version,
    about = "Searches Daangn listings across neighborhood regions"
)]
struct Cli {
    /// Path to data directory containing config.toml
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search listings across one or more regions
    Search {
        /// Query text
        query: String,

        /// Comma-separated region names or identifiers
        #[arg(short, long)]
        regions: String,

        /// Upstream category identifier
        #[arg(long)]
        category: Option<String>,

        /// Minimum price in won
        #[arg(long)]
        min_price: Option<u64>,

        /// Maximum price in won
        #[arg(long)]
        max_price: Option<u64>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// List the configured region catalog
    Regions,

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolve region tokens (display names or verbatim identifiers).
fn resolve_regions(config: &Config, tokens: &str) -> Result<Vec<String>> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            config
                .resolve_region(token)
                .ok_or_else(|| AppError::validation(format!("Unknown region: {token}")))
        })
        .collect()
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    match cli.command {
        Command::Search {
            query,
            regions,
            category,
            min_price,
            max_price,
            json,
        } => {
            let region_ids = resolve_regions(&config, &regions)?;
            let request = SearchRequest {
                query,
                region_ids,
                filters: SearchFilters {
                    category,
                    min_price,
                    max_price,
                },
            };

            let fetcher = Arc::new(HttpPageFetcher::new(config.crawler.clone())?);
            let crawler = RegionCrawler::new(fetcher);
            let aggregator = Aggregator::new(
                crawler,
                Duration::from_millis(config.crawler.request_delay_ms),
                Duration::from_secs(config.crawler.crawl_deadline_secs),
            );
            let cache = Arc::new(ResultCache::new(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.max_entries,
            ));
            let limiter = Arc::new(RateLimiter::new(
                Duration::from_secs(config.rate_limit.window_secs),
                config.rate_limit.max_requests,
            ));
            let _sweeper =
                limiter.spawn_sweeper(Duration::from_secs(config.rate_limit.sweep_interval_secs));
            let search_log = Arc::new(LocalSearchLog::new(&cli.data_dir));

            let service = SearchService::new(aggregator, cache, limiter, search_log);
            let client = ClientInfo {
                address: "local".to_string(),
                user_name: None,
            };

            let result = service.search(&request, &client).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "\"{}\": {} item(s) across {} region(s)",
                    result.query,
                    result.total_items,
                    result.regions.len()
                );
                for (i, item) in result.items.iter().enumerate() {
                    println!("{}. {} ({})", i + 1, item.title, item.price);
                    if item.status.is_empty() {
                        println!("   {} | {}", item.region, item.time);
                    } else {
                        println!("   {} | {} | {}", item.region, item.time, item.status);
                    }
                    println!("   {}", item.link);
                }
            }
        }

        Command::Regions => {
            println!("{} region(s) configured:", config.regions.len());
            for entry in &config.regions {
                println!("  {} -> {}", entry.name, entry.id);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (crawler, cache, rate limit, and region table)");
        }
    }

    Ok(())
}
