use crate::config::types::{AnalysisConfig, BackendConfig, Config, PollConfig};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

const MAX_TIMEOUT_MS: u64 = 600_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_backend_config(&config.backend)?;
    validate_analysis_config(&config.analysis)?;
    validate_poll_config(&config.poll)?;
    Ok(())
}

/// Validates backend transport configuration
fn validate_backend_config(config: &BackendConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot carry a query or fragment",
            config.base_url
        )));
    }

    if config.timeout_ms < 1 || config.timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be between 1 and {}, got {}",
            MAX_TIMEOUT_MS, config.timeout_ms
        )));
    }

    for (name, value) in &config.default_headers {
        validate_header(name, value)?;
    }

    Ok(())
}

/// Validates a single default header pair
fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::InvalidHeader(format!("'{}' is not a valid header name", name)))?;
    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::InvalidHeader(format!("value for '{}' is not a valid header value", name))
    })?;
    Ok(())
}

/// Validates analysis defaults
fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if config.default_strategy.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default-strategy cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the polling schedule
pub(crate) fn validate_poll_config(config: &PollConfig) -> Result<(), ConfigError> {
    if config.interval_ms < 1 {
        return Err(ConfigError::Validation(
            "interval-ms must be >= 1".to_string(),
        ));
    }

    if config.max_interval_ms < config.interval_ms {
        return Err(ConfigError::Validation(format!(
            "max-interval-ms ({}) must be >= interval-ms ({})",
            config.max_interval_ms, config.interval_ms
        )));
    }

    if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-multiplier must be >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1".to_string(),
        ));
    }

    Ok(())
}
