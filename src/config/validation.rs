use crate::config::types::{Config, CrawlerConfig, EndpointConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on attempts per item
const MAX_ATTEMPTS_CEILING: u32 = 10;

/// Upper bound on the pause between items, in seconds
const MAX_SLEEP_SECS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_endpoints(&config.endpoints)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates endpoint URLs and templates
fn validate_endpoints(config: &EndpointConfig) -> Result<(), ConfigError> {
    parse_http_url("listing-url", &config.listing_url)?;
    validate_template("details-url", &config.details_url)?;
    validate_template("reviews-url", &config.reviews_url)?;
    Ok(())
}

/// A template must carry the `{appid}` placeholder and expand to a valid URL
fn validate_template(name: &str, template: &str) -> Result<(), ConfigError> {
    if !template.contains("{appid}") {
        return Err(ConfigError::Validation(format!(
            "{} must contain the {{appid}} placeholder, got '{}'",
            name, template
        )));
    }

    parse_http_url(name, &template.replace("{appid}", "1"))?;
    Ok(())
}

fn parse_http_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, raw
        )));
    }

    Ok(url)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.top_n < 1 {
        return Err(ConfigError::Validation(format!(
            "top_n must be >= 1, got {}",
            config.top_n
        )));
    }

    if !config.sleep_secs.is_finite()
        || config.sleep_secs < 0.0
        || config.sleep_secs > MAX_SLEEP_SECS
    {
        return Err(ConfigError::Validation(format!(
            "sleep_secs must be between 0 and {}, got {}",
            MAX_SLEEP_SECS, config.sleep_secs
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > MAX_ATTEMPTS_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and {}, got {}",
            MAX_ATTEMPTS_CEILING, config.max_attempts
        )));
    }

    if config.listing_timeout_secs < 1 || config.detail_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got listing={}s detail={}s",
            config.listing_timeout_secs, config.detail_timeout_secs
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

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
