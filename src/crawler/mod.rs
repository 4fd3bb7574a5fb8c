//! Crawler module for listing discovery and detail fetching
//!
//! This module contains the core crawling logic, including:
//! - A shared token-bucket request limiter
//! - HTTP fetching of listing pages and detail records
//! - Lazy pagination over the listing endpoint
//! - Per-search fan-out and run-wide aggregation

mod aggregator;
mod coordinator;
mod fetcher;
mod limiter;
mod paginator;

pub use aggregator::ResultTree;
pub use coordinator::{
    crawl_all, run_crawl, run_crawl_with_limiter, CrawlReport, CrawlResults, SearchCoordinator,
    SearchOutcome, SearchReport,
};
pub use fetcher::{build_http_client, user_agent_string, ApiClient, ListingPage};
pub use limiter::RequestLimiter;
pub use paginator::{discover, normalize_job_id};

use crate::config::Config;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the request limiter and HTTP client
/// 2. Open the configured result sink
/// 3. Crawl every (category, search term) pair concurrently
/// 4. Persist the result tree in one step
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and results were persisted
/// * `Err(ScoutError)` - Crawl failed
pub async fn crawl(config: &Config) -> crate::Result<CrawlReport> {
    run_crawl(config).await
}
