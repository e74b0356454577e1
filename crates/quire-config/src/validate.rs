//! Post-merge validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 4] = ["pretty", "compact", "json", "full"];

/// Validate a merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::ValidationError`] found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_engine(config)?;
    validate_cache(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_engine(config: &Config) -> ConfigResult<()> {
    let token = &config.engine.everyone_principal;
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError {
            field: "engine.everyone_principal".to_owned(),
            message: format!("'{token}' must be non-empty and contain no whitespace"),
        });
    }
    if token.starts_with("user:") || token.starts_with("group:") {
        return Err(ConfigError::ValidationError {
            field: "engine.everyone_principal".to_owned(),
            message: format!("'{token}' collides with a principal prefix"),
        });
    }
    Ok(())
}

fn validate_cache(config: &Config) -> ConfigResult<()> {
    if config.cache.enabled && config.cache.max_entries == 0 {
        return Err(ConfigError::ValidationError {
            field: "cache.max_entries".to_owned(),
            message: "must be at least 1 when the cache is enabled".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;
    if !LOG_LEVELS.contains(&logging.level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
    if !LOG_FORMATS.contains(&logging.format.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                logging.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }
    if let Some(blank) = logging.directives.iter().position(|d| d.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: format!("logging.directives[{blank}]"),
            message: "directive is empty".to_owned(),
        });
    }
    Ok(())
}
