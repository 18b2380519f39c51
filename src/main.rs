//! Rent-Harvest main entry point
//!
//! This is the command-line interface for the Rent-Harvest property crawler.

use anyhow::Context;
use clap::Parser;
use rent_harvest::config::{load_config_with_hash, validate, Config};
use rent_harvest::crawler::run_crawl;
use rent_harvest::output::{
    print_consolidation, print_report, AssumeNo, AssumeYes, Confirm, Consolidator,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rent-Harvest: a batch crawler for property listings
///
/// Walks the listing pages, extracts every property into numbered CSV
/// batches and merges them into properties.csv at the end.
#[derive(Parser, Debug)]
#[command(name = "rent-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A batch crawler for property listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the highest listing page to request
    #[arg(long)]
    max_pages: Option<u32>,

    /// Override the number of listing pages per batch file
    #[arg(long)]
    batch_size: Option<u32>,

    /// Override the output directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Merge existing batch files and exit without crawling
    #[arg(long, conflicts_with_all = ["no_combine", "dry_run"])]
    combine_only: bool,

    /// Leave batch files unmerged after the crawl
    #[arg(long)]
    no_combine: bool,

    /// Delete batch files after merging without asking
    #[arg(short, long, conflicts_with = "keep_batches")]
    yes: bool,

    /// Keep batch files after merging without asking
    #[arg(long)]
    keep_batches: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

/// Asks on stdin; anything but "y" declines
struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        print!("\n{} (y/n): ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    if !cli.combine_only {
        let report = run_crawl(config.clone()).await.map_err(|e| {
            tracing::error!("Crawl failed: {}", e);
            e
        })?;
        print_report(&report);
    }

    if cli.no_combine {
        return Ok(());
    }

    let consolidator = Consolidator::new(&config.output.directory);
    let Some(merged) = consolidator
        .combine()
        .context("failed to combine batch files")?
    else {
        println!("No batch files found to combine");
        return Ok(());
    };
    print_consolidation(&merged);

    let confirm: &dyn Confirm = if cli.yes {
        &AssumeYes
    } else if cli.keep_batches {
        &AssumeNo
    } else {
        &StdinPrompt
    };
    let removed = consolidator
        .cleanup(&merged, confirm)
        .context("failed to delete batch files")?;
    if removed > 0 {
        println!("Deleted {} batch files", removed);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rent_harvest=info,warn"),
            1 => EnvFilter::new("rent_harvest=debug,info"),
            2 => EnvFilter::new("rent_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(batch_size) = cli.batch_size {
        config.crawler.batch_size = batch_size;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Rent-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Listing URL: {}", config.site.listing_url);
    println!("  Origin: {}", config.site.origin);

    println!("\nCrawler:");
    println!("  Batch size: {} pages", config.crawler.batch_size);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!(
        "  Retries: {} (backoff {}ms x attempt)",
        config.http.max_retries, config.http.retry_backoff_ms
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Failed URLs: {}", config.output.failed_urls_file);

    let batches = config.crawler.max_pages.div_ceil(config.crawler.batch_size);
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would request up to {} listing pages in {} batches",
        config.crawler.max_pages, batches
    );
}
