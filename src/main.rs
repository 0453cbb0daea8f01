//! Sitegraph main entry point
//!
//! This is the command-line interface for the Sitegraph site mapper.

use clap::{Parser, ValueEnum};
use sitegraph::config::{load_config, validate, Config};
use sitegraph::crawler::Coordinator;
use sitegraph::output::{assemble, to_json, to_markdown, write_statistics, CrawlStatistics};
use sitegraph::url::resolve;
use sitegraph::SiteError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sitegraph: a single-site mapper
///
/// Sitegraph crawls every page reachable from each seed URL without leaving
/// the seed's host, and prints, for each HTML page, its links, assets,
/// broken references and off-site links.
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version)]
#[command(about = "Maps the pages and assets of a single website", long_about = None)]
struct Cli {
    /// Seed URLs to crawl, one crawl each
    #[arg(value_name = "URL", required = true)]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent fetches (overrides the config file)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Overall crawl deadline in seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Print crawl statistics to stderr after each crawl
    #[arg(long)]
    stats: bool,

    /// Validate config and seeds and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        return Ok(handle_dry_run(&config, &cli.seeds));
    }

    handle_crawl(&config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the reports.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegraph=info,warn"),
            1 => EnvFilter::new("sitegraph=debug,info"),
            2 => EnvFilter::new("sitegraph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> Result<Config, SiteError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_fetches = concurrency;
    }
    if let Some(deadline) = cli.deadline {
        config.crawler.crawl_deadline_secs = Some(deadline);
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective config and canonical seeds
fn handle_dry_run(config: &Config, seeds: &[String]) -> ExitCode {
    println!("=== Sitegraph Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Connect timeout: {}ms", config.crawler.connect_timeout_ms);
    match config.crawler.crawl_deadline_secs {
        Some(secs) => println!("  Crawl deadline: {}s", secs),
        None => println!("  Crawl deadline: none"),
    }
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nSeeds ({}):", seeds.len());
    let mut invalid = 0;
    for seed in seeds {
        match resolve(None, seed) {
            Ok(url) => println!("  ✓ {}", url),
            Err(e) => {
                invalid += 1;
                println!("  ✗ {} ({})", seed, e);
            }
        }
    }

    if invalid > 0 {
        println!("\n{} invalid seed URL(s)", invalid);
        ExitCode::FAILURE
    } else {
        println!("\n✓ Configuration is valid");
        ExitCode::SUCCESS
    }
}

/// Handles the main crawl operation: one crawl and one report per seed
async fn handle_crawl(config: &Config, cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let coordinator = Coordinator::from_config(config)?;
    let mut failed = false;

    for seed in &cli.seeds {
        let graph = match coordinator.crawl(seed).await {
            Ok(graph) => graph,
            Err(e @ SiteError::InvalidSeedUrl { .. }) => {
                tracing::error!("{}", e);
                failed = true;
                continue;
            }
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", seed, e);
                return Err(e.into());
            }
        };

        let locations = assemble(&graph);
        let report = match cli.format {
            Format::Json => to_json(&locations)?,
            Format::Markdown => to_markdown(&graph, &locations),
        };
        println!("{}", report);

        if cli.stats {
            let stats = CrawlStatistics::from_graph(&graph);
            write_statistics(&stats, &mut std::io::stderr())?;
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
