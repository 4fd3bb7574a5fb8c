use crate::config::types::{
    ApiConfig, CategoryEntry, Config, CrawlerConfig, OutputConfig, SinkKind, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_api_config(&config.api)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.requests_per_second < 1 || config.requests_per_second > 1000 {
        return Err(ConfigError::Validation(format!(
            "requests_per_second must be between 1 and 1000, got {}",
            config.requests_per_second
        )));
    }

    if config.burst < 1 || config.burst > 100 {
        return Err(ConfigError::Validation(format!(
            "burst must be between 1 and 100, got {}",
            config.burst
        )));
    }

    if config.page_size < 1 || config.page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 1000, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates endpoint configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_endpoint("listing_url", &config.listing_url)?;
    validate_endpoint("detail_url", &config.detail_url)?;

    if config.geo_id.trim().is_empty() {
        return Err(ConfigError::Validation("geo_id cannot be empty".to_string()));
    }

    if let Some(name) = &config.token_env {
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "token_env cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Endpoints must be absolute http(s) URLs
fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    match config.sink {
        SinkKind::Json if config.snapshot_path.is_empty() => Err(ConfigError::Validation(
            "snapshot_path cannot be empty when sink is json".to_string(),
        )),
        SinkKind::Sqlite if config.database_path.is_empty() => Err(ConfigError::Validation(
            "database_path cannot be empty when sink is sqlite".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validates category entries
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "At least one category must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for entry in categories {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        if !names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Category '{}' is defined more than once",
                entry.name
            )));
        }

        if entry.search_terms.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Category '{}' must have at least one search term",
                entry.name
            )));
        }

        if entry.search_terms.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Category '{}' contains an empty search term",
                entry.name
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
