//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Listing page requests against the search endpoint
//! - Detail lookups for a single job id
//! - Error classification into transport, status and decode failures
//!
//! Nothing here retries. Each call acquires one admission from the shared
//! `RequestLimiter` right before the request goes out.

use crate::config::{ApiConfig, UserAgentConfig};
use crate::crawler::limiter::RequestLimiter;
use crate::model::JobPosting;
use crate::{CrawlError, CrawlResult};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use job_scout::config::UserAgentConfig;
/// use job_scout::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "JobScout".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL; ContactEmail)
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// One page of the search listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Raw identifiers in upstream order
    pub job_ids: Vec<String>,

    /// Total result count reported by the upstream
    pub total: usize,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    metadata: Option<ListingMetadata>,
    paging: Paging,
}

#[derive(Debug, Deserialize)]
struct ListingMetadata {
    #[serde(rename = "jobCardPrefetchQueries", default)]
    prefetch_queries: Vec<PrefetchQuery>,
}

#[derive(Debug, Deserialize)]
struct PrefetchQuery {
    #[serde(rename = "prefetchJobPostingCardUrns", default)]
    card_urns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    total: usize,
}

impl From<ListingResponse> for ListingPage {
    fn from(response: ListingResponse) -> Self {
        // Only the first prefetch query describes the requested page
        let job_ids = response
            .metadata
            .and_then(|m| m.prefetch_queries.into_iter().next())
            .map(|q| q.card_urns)
            .unwrap_or_default();

        Self {
            job_ids,
            total: response.paging.total,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    title: String,
    #[serde(default)]
    description: Option<DescriptionText>,
    #[serde(rename = "companyDetails", default)]
    company_details: Option<CompanyDetails>,
}

#[derive(Debug, Deserialize)]
struct DescriptionText {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct CompanyDetails {
    #[serde(
        rename = "com.linkedin.voyager.deco.jobs.web.shared.WebJobPostingCompany",
        default
    )]
    company: Option<CompanyDecoration>,
}

#[derive(Debug, Deserialize)]
struct CompanyDecoration {
    #[serde(rename = "companyResolutionResult", default)]
    resolution: Option<CompanyName>,
}

#[derive(Debug, Deserialize)]
struct CompanyName {
    #[serde(default)]
    name: String,
}

impl DetailResponse {
    fn into_posting(self, job_id: &str) -> JobPosting {
        let company = self
            .company_details
            .and_then(|d| d.company)
            .and_then(|c| c.resolution)
            .map(|r| r.name)
            .unwrap_or_default();

        JobPosting {
            job_id: job_id.to_string(),
            company,
            description: self.description.map(|d| d.text).unwrap_or_default(),
            title: self.title,
        }
    }
}

/// Client for the listing and detail endpoints
///
/// Cheap to clone: the HTTP connection pool and the limiter are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    limiter: Arc<RequestLimiter>,
    listing_url: Url,
    detail_url: Url,
    geo_id: String,
    access_token: Option<String>,
}

impl ApiClient {
    /// Creates a client for the configured endpoints
    pub fn new(
        client: Client,
        config: &ApiConfig,
        limiter: Arc<RequestLimiter>,
    ) -> CrawlResult<Self> {
        Ok(Self {
            client,
            limiter,
            listing_url: Url::parse(&config.listing_url)?,
            detail_url: Url::parse(&config.detail_url)?,
            geo_id: config.geo_id.clone(),
            access_token: config.access_token(),
        })
    }

    /// The limiter every request from this client goes through
    pub fn limiter(&self) -> &Arc<RequestLimiter> {
        &self.limiter
    }

    /// Fetches one page of listing results starting at `start`
    pub async fn listing_page(
        &self,
        search_term: &str,
        start: usize,
        count: usize,
    ) -> CrawlResult<ListingPage> {
        let mut url = self.listing_url.clone();
        url.query_pairs_mut()
            .append_pair("keywords", search_term)
            .append_pair("geoId", &self.geo_id)
            .append_pair("start", &start.to_string())
            .append_pair("count", &count.to_string());

        let response: ListingResponse = self.get_json(url).await?;
        Ok(response.into())
    }

    /// Fetches and normalizes the detail record for one job id
    pub async fn job_posting(&self, job_id: &str) -> CrawlResult<JobPosting> {
        let url = self.detail_url_for(job_id)?;
        let response: DetailResponse = self.get_json(url).await?;
        Ok(response.into_posting(job_id))
    }

    fn detail_url_for(&self, job_id: &str) -> CrawlResult<Url> {
        let mut url = self.detail_url.clone();
        url.path_segments_mut()
            .map_err(|_| CrawlError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }

    /// Sends one GET request and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> CrawlResult<T> {
        let url_str = url.to_string();

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        self.limiter.acquire().await;
        tracing::debug!("GET {}", url_str);

        let response = request
            .send()
            .await
            .map_err(|e| CrawlError::transport(&url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::UnexpectedStatus {
                url: url_str,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CrawlError::transport(&url_str, e))?;

        serde_json::from_slice(&body).map_err(|e| CrawlError::decode(url_str, e))
    }
}
