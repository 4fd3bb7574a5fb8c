//! Crawler coordinator - fan-out orchestration
//!
//! This module contains the logic that turns configuration into a persisted
//! result tree, including:
//! - Driving one listing stream per (category, search term) pair
//! - Spawning one detail fetch per discovered job id
//! - Waiting on every spawned task before a group is handed on
//! - Persisting the finished tree through the configured sink

use crate::config::Config;
use crate::crawler::aggregator::ResultTree;
use crate::crawler::fetcher::{build_http_client, ApiClient};
use crate::crawler::limiter::RequestLimiter;
use crate::crawler::paginator::discover;
use crate::model::{CategoryGroup, SearchGroup};
use crate::storage::{open_sink, PersistSummary};
use crate::CrawlError;
use chrono::Utc;
use futures::{pin_mut, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Result of one search
#[derive(Debug)]
pub struct SearchOutcome {
    /// Every posting fetched successfully
    pub group: SearchGroup,

    /// Ids produced by the listing stream
    pub discovered: usize,

    /// Detail fetches that failed and were dropped
    pub failed: usize,

    /// Set when the listing stream ended in an error
    pub discovery_error: Option<CrawlError>,
}

/// Runs the listing stream and detail fan-out for a single search term
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    api: ApiClient,
    page_size: usize,
}

impl SearchCoordinator {
    pub fn new(api: ApiClient, page_size: usize) -> Self {
        Self { api, page_size }
    }

    /// Crawls one search term
    ///
    /// Each discovered id gets its own task. Successful postings are pushed
    /// into a shared group; failures are logged and counted. Returns only
    /// after the listing stream has ended and every fetch task has finished.
    /// A listing error stops discovery but keeps what was already fetched.
    pub async fn run(&self, category: &str, search_term: &str) -> SearchOutcome {
        let group = Arc::new(Mutex::new(SearchGroup::new(search_term)));
        let mut fetches = JoinSet::new();
        let mut discovered = 0usize;
        let mut discovery_error = None;

        let ids = discover(self.api.clone(), search_term.to_string(), self.page_size);
        pin_mut!(ids);

        while let Some(item) = ids.next().await {
            let job_id = match item {
                Ok(job_id) => job_id,
                Err(e) => {
                    tracing::warn!(
                        "Discovery for '{}' in '{}' stopped: {}",
                        search_term,
                        category,
                        e
                    );
                    discovery_error = Some(e);
                    break;
                }
            };
            discovered += 1;

            let api = self.api.clone();
            let group = Arc::clone(&group);
            fetches.spawn(async move {
                match api.job_posting(&job_id).await {
                    Ok(posting) => {
                        group
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .jobs
                            .push(posting);
                        true
                    }
                    Err(e) => {
                        tracing::warn!("Dropping job {}: {}", job_id, e);
                        false
                    }
                }
            });
        }

        let mut failed = 0usize;
        while let Some(result) = fetches.join_next().await {
            match result {
                Ok(true) => {}
                Ok(false) => failed += 1,
                Err(join_err) => {
                    tracing::error!("Detail task for '{}' aborted: {}", search_term, join_err);
                    failed += 1;
                }
            }
        }

        let group = match Arc::try_unwrap(group) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared.lock().unwrap_or_else(PoisonError::into_inner).clone(),
        };

        tracing::info!(
            "Search '{}' ({}): {} discovered, {} fetched, {} failed",
            search_term,
            category,
            discovered,
            group.jobs.len(),
            failed
        );

        SearchOutcome {
            group,
            discovered,
            failed,
            discovery_error,
        }
    }
}

/// Per-search line of the run report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub category: String,
    pub search_term: String,
    pub discovered: usize,
    pub fetched: usize,
    pub failed: usize,
    pub discovery_error: Option<String>,
}

impl SearchReport {
    fn from_outcome(category: &str, outcome: &SearchOutcome) -> Self {
        Self {
            category: category.to_string(),
            search_term: outcome.group.search_term.clone(),
            discovered: outcome.discovered,
            fetched: outcome.group.jobs.len(),
            failed: outcome.failed,
            discovery_error: outcome.discovery_error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Everything a run collected before persistence
#[derive(Debug)]
pub struct CrawlResults {
    /// The result tree, one entry per configured category
    pub categories: Vec<CategoryGroup>,

    /// One report per search, in completion order
    pub searches: Vec<SearchReport>,
}

/// Crawls every configured search concurrently
///
/// One task per (category, search term) pair; each merges its non-empty
/// group into a shared tree as soon as it finishes. Returns after every
/// task has been joined.
pub async fn crawl_all(config: &Config, api: &ApiClient) -> crate::Result<CrawlResults> {
    let tree = Arc::new(ResultTree::with_categories(
        config.categories.iter().map(|c| c.name.clone()),
    ));
    let coordinator = SearchCoordinator::new(api.clone(), config.crawler.page_size as usize);

    let mut searches = JoinSet::new();
    for (category, search_term) in config.search_pairs() {
        let coordinator = coordinator.clone();
        let tree = Arc::clone(&tree);
        let category = category.to_string();
        let search_term = search_term.to_string();

        searches.spawn(async move {
            let outcome = coordinator.run(&category, &search_term).await;
            let report = SearchReport::from_outcome(&category, &outcome);
            if !outcome.group.is_empty() {
                tree.merge(&category, outcome.group);
            }
            report
        });
    }

    let mut reports = Vec::new();
    while let Some(result) = searches.join_next().await {
        reports.push(result?);
    }

    let categories = match Arc::try_unwrap(tree) {
        Ok(tree) => tree.into_inner(),
        Err(shared) => shared.snapshot(),
    };

    Ok(CrawlResults {
        categories,
        searches: reports,
    })
}

/// Summary of a complete run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub searches: Vec<SearchReport>,

    /// Requests admitted by the shared limiter
    pub requests: u64,

    pub persisted: PersistSummary,
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn total_fetched(&self) -> usize {
        self.searches.iter().map(|s| s.fetched).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.searches.iter().map(|s| s.failed).sum()
    }

    /// Searches whose discovery ended in an error
    pub fn aborted_searches(&self) -> usize {
        self.searches
            .iter()
            .filter(|s| s.discovery_error.is_some())
            .count()
    }
}

/// Runs a complete crawl and persists the results
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished and the tree was persisted
/// * `Err(ScoutError)` - The client, sink or persistence failed
///
/// # Example
///
/// ```no_run
/// use job_scout::config::load_config;
/// use job_scout::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(&config).await?;
/// println!("Fetched {} postings", report.total_fetched());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> crate::Result<CrawlReport> {
    let limiter = Arc::new(RequestLimiter::from_config(&config.crawler));
    run_crawl_with_limiter(config, limiter).await
}

/// Same as [`run_crawl`] with a caller-supplied limiter
pub async fn run_crawl_with_limiter(
    config: &Config,
    limiter: Arc<RequestLimiter>,
) -> crate::Result<CrawlReport> {
    let start = Instant::now();

    let client = build_http_client(&config.user_agent)?;
    let api = ApiClient::new(client, &config.api, Arc::clone(&limiter))?;
    let mut sink = open_sink(&config.output)?;

    tracing::info!(
        "Starting crawl: {} searches across {} categories, sink {}",
        config.search_pairs().count(),
        config.categories.len(),
        sink.describe()
    );

    let results = crawl_all(config, &api).await?;

    // One timestamp for every association written by this run
    let seen_at = Utc::now();
    let categories = results.categories;
    let persisted = tokio::task::spawn_blocking(move || sink.persist(&categories, seen_at))
        .await??;

    let report = CrawlReport {
        searches: results.searches,
        requests: limiter.admitted(),
        persisted,
        elapsed: start.elapsed(),
    };

    tracing::info!(
        "Crawl completed in {:?}: {} fetched, {} failed, {} searches aborted, {} requests",
        report.elapsed,
        report.total_fetched(),
        report.total_failed(),
        report.aborted_searches(),
        report.requests
    );

    Ok(report)
}
