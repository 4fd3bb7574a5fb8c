//! Job-Scout: a rate-limited job listing harvester
//!
//! This crate discovers job postings through a paginated search API, fetches
//! every posting's detail record under one shared request budget, groups the
//! results by category and search term, and persists them either as a JSON
//! snapshot or into a SQLite store that remembers when each search first and
//! last saw each posting.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Job-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while talking to the listing and detail APIs
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error(
        "Upstream reported {expected} results for '{search_term}' but pages ran out after {received}"
    )]
    UpstreamInconsistency {
        search_term: String,
        expected: usize,
        received: usize,
    },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] ::url::ParseError),
}

impl CrawlError {
    /// Builds a transport error for the given request URL
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Builds a decode error for the given request URL
    pub fn decode(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for Job-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for API operations
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CategoryGroup, JobId, JobPosting, SearchGroup};
