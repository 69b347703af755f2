use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing is decoupled from the real environment so tests can drive it with
/// a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
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

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        match raw.parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            Ok(v) => Ok(v),
            Err(e) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let primary_source_url = require("GHUMFIR_PRIMARY_SOURCE_URL")?;
    let fallback_source_url = lookup("GHUMFIR_FALLBACK_SOURCE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("GHUMFIR_ENV", "development"))?;

    let bind_addr = parse_addr("GHUMFIR_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GHUMFIR_LOG_LEVEL", "info");
    let popular_path = PathBuf::from(or_default("GHUMFIR_POPULAR_PATH", "./config/popular.yaml"));
    let user_agent = or_default("GHUMFIR_USER_AGENT", "ghumfir/0.1 (nearby-destinations)");

    let primary_timeout_secs = parse_u64("GHUMFIR_PRIMARY_TIMEOUT_SECS", "30")?;
    let fallback_timeout_secs = parse_u64("GHUMFIR_FALLBACK_TIMEOUT_SECS", "15")?;
    let location_timeout_secs = parse_u64("GHUMFIR_LOCATION_TIMEOUT_SECS", "30")?;
    let location_hard_stop_margin_secs = parse_u64("GHUMFIR_LOCATION_HARD_STOP_MARGIN_SECS", "5")?;

    let result_limit = parse_positive_usize("GHUMFIR_RESULT_LIMIT", "20")?;
    let closest_anyway_count = parse_positive_usize("GHUMFIR_CLOSEST_ANYWAY_COUNT", "3")?;
    let rate_limit_max_requests = parse_positive_usize("GHUMFIR_RATE_LIMIT_MAX_REQUESTS", "120")?;
    let rate_limit_window_secs = parse_u64("GHUMFIR_RATE_LIMIT_WINDOW_SECS", "60")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        popular_path,
        user_agent,
        primary_source_url,
        fallback_source_url,
        primary_timeout_secs,
        fallback_timeout_secs,
        location_timeout_secs,
        location_hard_stop_margin_secs,
        result_limit,
        closest_anyway_count,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GHUMFIR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
