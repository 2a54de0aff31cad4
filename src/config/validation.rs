use crate::config::types::{Config, FetchConfig, WebhookConfig};
use crate::output::limits::USERNAME_LIMIT;
use crate::ConfigError;
use url::Url;

const MIN_TIMEOUT_MS: u64 = 10;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MAX_RETRIES: u32 = 10;
const MAX_REDIRECTS: usize = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_webhook_config(&config.webhook)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    validate_timeout("fetch.timeout-ms", config.timeout_ms)?;

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max-retries must be at most {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    if config.backoff_ms > config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "backoff-ms ({}) cannot exceed max-backoff-ms ({})",
            config.backoff_ms, config.max_backoff_ms
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be at most {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates webhook configuration
///
/// A missing URL is accepted here; live runs check for it separately.
fn validate_webhook_config(config: &WebhookConfig) -> Result<(), ConfigError> {
    validate_timeout("webhook.timeout-ms", config.timeout_ms)?;

    if let Some(raw) = &config.url {
        validate_http_url("webhook url", raw)?;
    }

    if let Some(raw) = &config.avatar_url {
        validate_http_url("avatar-url", raw)?;
    }

    let name_len = config.username.chars().count();
    if name_len == 0 || name_len > USERNAME_LIMIT {
        return Err(ConfigError::Validation(format!(
            "username must be 1 to {} characters, got {}",
            USERNAME_LIMIT, name_len
        )));
    }

    Ok(())
}

fn validate_timeout(key: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            key, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS, value
        )));
    }
    Ok(())
}

fn validate_http_url(key: &str, raw: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", key, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            key,
            url.scheme()
        )));
    }

    Ok(())
}
