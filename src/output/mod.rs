//! Output module for run reports and store exports
//!
//! This module handles:
//! - Printing the report of a finished crawl
//! - Reading statistics back out of the SQLite store
//! - Exporting descriptions for downstream text analysis

mod export;
pub mod stats;

pub use export::export_descriptions;
pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::crawler::CrawlReport;

/// Prints a finished crawl's report to stdout
///
/// # Arguments
///
/// * `report` - The report returned by the crawl
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Searches:");
    for search in &report.searches {
        println!(
            "  [{}] {}: {} discovered, {} fetched, {} failed",
            search.category, search.search_term, search.discovered, search.fetched, search.failed
        );
        if let Some(error) = &search.discovery_error {
            println!("    discovery stopped: {}", error);
        }
    }
    println!();

    println!("Persisted:");
    println!("  Categories: {}", report.persisted.categories);
    println!("  Searches: {}", report.persisted.searches);
    println!("  Postings: {}", report.persisted.postings);
    println!("  New jobs: {}", report.persisted.new_jobs);
    println!("  New associations: {}", report.persisted.new_associations);
    println!();

    println!(
        "{} requests in {:.1}s ({} fetched, {} failed)",
        report.requests,
        report.elapsed.as_secs_f64(),
        report.total_fetched(),
        report.total_failed()
    );
}
