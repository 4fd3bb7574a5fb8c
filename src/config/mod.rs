//! Configuration module for Job-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```toml
//! [crawler]
//! requests-per-second = 10
//! burst = 1
//! page-size = 100
//!
//! [api]
//! listing-url = "https://api.example.com/jobs/search"
//! detail-url = "https://api.example.com/jobs/postings"
//! geo-id = "100446943"
//! token-env = "JOB_SCOUT_TOKEN"
//!
//! [user-agent]
//! crawler-name = "JobScout"
//! crawler-version = "1.0"
//! contact-url = "https://example.com/about"
//! contact-email = "admin@example.com"
//!
//! [output]
//! sink = "sqlite"
//! database-path = "./jobs.db"
//!
//! [[category]]
//! name = "Data Science"
//! search-terms = ["data scientist", "data science"]
//! ```
//!
//! ```no_run
//! use job_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("job-scout.toml")).unwrap();
//! println!("Rate: {} req/s", config.crawler.requests_per_second);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, CategoryEntry, Config, CrawlerConfig, OutputConfig, SinkKind, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
