use crate::config::types::{CheckerConfig, Config, CrawlConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_checker_config(&config.checker)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the crawl target and its limits
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", config.start_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' must use http or https",
            config.start_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' has no host",
            config.start_url
        )));
    }

    // max_depth >= 0 is always true for u32, so no check needed

    if !config.timeout_seconds.is_finite() || config.timeout_seconds <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be a positive number, got {}",
            config.timeout_seconds
        )));
    }

    // An empty substring would match every link
    if config.exclude_paths.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "exclude_paths cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates checker limits
fn validate_checker_config(config: &CheckerConfig) -> Result<(), ConfigError> {
    if config.retry_count > 10 {
        return Err(ConfigError::Validation(format!(
            "retry_count must be at most 10, got {}",
            config.retry_count
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 200 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 200, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and 64, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_redirects < 1 || config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be between 1 and 20, got {}",
            config.max_redirects
        )));
    }

    if config.ignore_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "ignore_patterns cannot contain empty entries".to_string(),
        ));
    }

    if config.max_crawl_seconds == Some(0) {
        return Err(ConfigError::Validation(
            "max_crawl_seconds must be greater than 0 when set".to_string(),
        ));
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

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}
