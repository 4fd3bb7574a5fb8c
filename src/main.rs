//! Job-Scout main entry point
//!
//! This is the command-line interface for the Job-Scout listing harvester.

use clap::Parser;
use job_scout::config::{load_config_with_hash, Config, SinkKind};
use job_scout::crawler::crawl;
use job_scout::output::{
    export_descriptions, load_statistics, print_crawl_report, print_statistics,
};
use job_scout::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Job-Scout: a rate-limited job listing harvester
///
/// Job-Scout runs every configured search term against the listing API,
/// fetches each posting's details under one shared request budget, and
/// stores the results grouped by category and search term.
#[derive(Parser, Debug)]
#[command(name = "job-scout")]
#[command(version = "1.0.0")]
#[command(about = "A rate-limited job listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which searches would run without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_descriptions"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_descriptions"])]
    stats: bool,

    /// Write stored job descriptions as JSON to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export_descriptions: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(path) = &cli.export_descriptions {
        handle_export_descriptions(&config, path)?;
    } else {
        handle_crawl(&config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_scout=info,warn"),
            1 => EnvFilter::new("job_scout=debug,info"),
            2 => EnvFilter::new("job_scout=trace,debug"),
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

/// Handles the --dry-run mode: validates config and lists the searches
fn handle_dry_run(config: &Config) {
    println!("=== Job-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Requests per second: {}", config.crawler.requests_per_second);
    println!("  Burst: {}", config.crawler.burst);
    println!("  Page size: {}", config.crawler.page_size);

    println!("\nAPI:");
    println!("  Listing: {}", config.api.listing_url);
    println!("  Detail: {}", config.api.detail_url);
    println!("  Geo id: {}", config.api.geo_id);
    match &config.api.token_env {
        Some(name) if config.api.access_token().is_some() => {
            println!("  Token: from ${}", name)
        }
        Some(name) => println!("  Token: ${} is not set", name),
        None => println!("  Token: none"),
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    match config.output.sink {
        SinkKind::Json => println!("  JSON snapshot: {}", config.output.snapshot_path),
        SinkKind::Sqlite => println!("  SQLite database: {}", config.output.database_path),
    }

    println!("\nCategories ({}):", config.categories.len());
    for entry in &config.categories {
        println!("  - {} ({} search terms)", entry.name, entry.search_terms.len());
        for term in &entry.search_terms {
            println!("    * {}", term);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would run {} searches", config.search_pairs().count());
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-descriptions mode
fn handle_export_descriptions(
    config: &Config,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_database(config)?;
    let written = export_descriptions(&storage, path)?;

    println!("✓ Exported {} descriptions to: {}", written, path.display());

    Ok(())
}

fn open_database(config: &Config) -> Result<SqliteStorage, Box<dyn std::error::Error>> {
    if config.output.database_path.is_empty() {
        return Err("No database-path configured in [output]".into());
    }
    Ok(SqliteStorage::new(Path::new(&config.output.database_path))?)
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    match crawl(config).await {
        Ok(report) => {
            if !quiet {
                print_crawl_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
