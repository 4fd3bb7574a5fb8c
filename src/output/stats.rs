//! Statistics generation from the job store
//!
//! This module provides functionality for extracting and displaying
//! store statistics from the storage layer.

use crate::storage::{NamedCount, SqliteStorage, StorageResult, StoreCounts};

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Row counts of every table
    pub counts: StoreCounts,

    /// Distinct jobs per category
    pub categories: Vec<NamedCount>,

    /// Distinct jobs per search term
    pub searches: Vec<NamedCount>,
}

impl StoreStatistics {
    /// Average number of searches that found each job
    pub fn searches_per_job(&self) -> f64 {
        if self.counts.jobs == 0 {
            0.0
        } else {
            self.counts.search_jobs as f64 / self.counts.jobs as f64
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The store to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        counts: storage.counts()?,
        categories: storage.category_counts()?,
        searches: storage.search_counts()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Job Store Statistics ===\n");

    println!("Overview:");
    println!("  Jobs: {}", stats.counts.jobs);
    println!("  Categories: {}", stats.counts.categories);
    println!("  Search terms: {}", stats.counts.searches);
    println!("  Category memberships: {}", stats.counts.job_categories);
    println!("  Search associations: {}", stats.counts.search_jobs);
    println!();

    if !stats.categories.is_empty() {
        println!("Jobs by Category:");
        for category in &stats.categories {
            println!("  {}: {}", category.name, category.count);
        }
        println!();
    }

    if !stats.searches.is_empty() {
        println!("Jobs by Search Term:");
        let mut searches: Vec<_> = stats.searches.iter().collect();
        searches.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        for search in searches {
            println!("  {}: {}", search.name, search.count);
        }
        println!();
    }

    println!(
        "Overlap: each job was found by {:.2} searches on average",
        stats.searches_per_job()
    );
}
