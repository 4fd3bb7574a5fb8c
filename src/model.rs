//! Job posting data model
//!
//! These types are created fresh for every run, filled in by the crawler,
//! and handed to a result sink once every search has finished. The serde
//! field names double as the JSON snapshot format.

use serde::{Deserialize, Serialize};

/// Opaque identifier naming one job posting, stable across pages and searches
pub type JobId = String;

/// Normalized detail record for a single job posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: JobId,
    pub company: String,
    pub description: String,
    pub title: String,
}

/// Postings found by one search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGroup {
    pub search_term: String,
    pub jobs: Vec<JobPosting>,
}

impl SearchGroup {
    /// Creates an empty group for the given search term
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            jobs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// All search groups collected for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub searches: Vec<SearchGroup>,
}

impl CategoryGroup {
    /// Creates a category with no searches yet
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            searches: Vec::new(),
        }
    }

    /// Total number of postings across all searches (duplicates included)
    pub fn job_count(&self) -> usize {
        self.searches.iter().map(|s| s.jobs.len()).sum()
    }
}
