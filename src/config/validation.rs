use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::url::parse_absolute;
use crate::{ConfigError, UrlError};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = config
        .seed
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("a seed URL is required".to_string()))?;
    validate_seed(seed)?;

    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.connect_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_ms must be >= 100ms, got {}ms",
            config.connect_timeout_ms
        )));
    }

    for prefix in &config.binary_prefixes {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "binary prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    Ok(())
}

/// Validates the seed URL: absolute, HTTP(S), with a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    parse_absolute(seed).map(drop).map_err(|e| match e {
        UrlError::InvalidScheme(reason) => {
            ConfigError::Validation(format!("Seed URL '{}': {}", seed, reason))
        }
        other => ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, other)),
    })
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.mirror_root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mirror_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
