use serde::Deserialize;

/// Main configuration structure for Job-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub api: ApiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

impl Config {
    /// Iterates over every (category, search term) pair in configuration order
    pub fn search_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().flat_map(|category| {
            category
                .search_terms
                .iter()
                .map(move |term| (category.name.as_str(), term.as_str()))
        })
    }
}

/// Request budget and pagination settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Sustained number of requests admitted per second across all tasks
    #[serde(rename = "requests-per-second", default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Number of requests that may be admitted back to back
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Number of identifiers requested per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
            page_size: default_page_size(),
        }
    }
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    1
}

fn default_page_size() -> u32 {
    100
}

/// Listing and detail endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Paginated search endpoint
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Detail endpoint; the job id is appended as the last path segment
    #[serde(rename = "detail-url")]
    pub detail_url: String,

    /// Geographic scope sent with every listing request
    #[serde(rename = "geo-id")]
    pub geo_id: String,

    /// Name of the environment variable holding the access token
    #[serde(rename = "token-env", default)]
    pub token_env: Option<String>,
}

impl ApiConfig {
    /// Reads the access token from the configured environment variable
    pub fn access_token(&self) -> Option<String> {
        self.token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.is_empty())
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Which result sink a run writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Overwrite a single JSON snapshot of the whole result tree
    Json,
    /// Upsert into the SQLite store
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub sink: SinkKind,

    /// Path to the JSON snapshot file
    #[serde(rename = "snapshot-path", default)]
    pub snapshot_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default)]
    pub database_path: String,
}

/// A category and the search terms that feed it
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub name: String,

    #[serde(rename = "search-terms")]
    pub search_terms: Vec<String>,
}
