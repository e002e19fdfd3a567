use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("LEADSCOUT_ENV", "development"))?;

    let bind_addr = parse_addr("LEADSCOUT_BIND_ADDR", "0.0.0.0:3001")?;
    let log_level = or_default("LEADSCOUT_LOG_LEVEL", "info");
    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY").ok();

    let db_max_connections = parse_u32("LEADSCOUT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LEADSCOUT_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADSCOUT_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("LEADSCOUT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let places_request_timeout_secs = parse_u64("LEADSCOUT_PLACES_REQUEST_TIMEOUT_SECS", "30")?;
    let places_max_retries = parse_u32("LEADSCOUT_PLACES_MAX_RETRIES", "3")?;
    let places_retry_backoff_base_secs =
        parse_u64("LEADSCOUT_PLACES_RETRY_BACKOFF_BASE_SECS", "2")?;

    let scraper_request_timeout_secs = parse_u64("LEADSCOUT_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    let scraper_user_agent =
        or_default("LEADSCOUT_SCRAPER_USER_AGENT", "leadscout/0.1 (lead-discovery)");
    let scraper_max_retries = parse_u32("LEADSCOUT_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("LEADSCOUT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?;

    let display_page_size = parse_usize("LEADSCOUT_DISPLAY_PAGE_SIZE", "20")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        google_maps_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        places_request_timeout_secs,
        places_max_retries,
        places_retry_backoff_base_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        display_page_size,
    })
}

/// Parse a string into an [`Environment`] variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADSCOUT_ENV".to_string(),
            reason: format!("unrecognized environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
