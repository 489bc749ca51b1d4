use crate::app_config::{AppConfig, Environment, PhylloEnvironment};
use crate::ConfigError;

const DEFAULT_PHYLLO_BASE_URL: &str = "https://api.getphyllo.com";
const DEFAULT_ENABLED_PLATFORMS: &str = "youtube,instagram,tiktok,twitch";

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
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
    let phyllo_client_id = require("PHYLLO_CLIENT_ID")?;
    let phyllo_client_secret = require("PHYLLO_CLIENT_SECRET")?;

    let env = parse_environment(&or_default("CREATORDB_ENV", "development"))?;
    let bind_addr = parse("CREATORDB_BIND_ADDR", "0.0.0.0:9000")?;
    let log_level = or_default("CREATORDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CREATORDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CREATORDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CREATORDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let phyllo_environment = parse_phyllo_environment(&or_default("PHYLLO_ENVIRONMENT", "sandbox"))?;
    let phyllo_base_url = or_default("PHYLLO_BASE_URL", DEFAULT_PHYLLO_BASE_URL);
    let phyllo_enabled_platforms =
        parse_platform_list(&or_default("PHYLLO_ENABLED_PLATFORMS", DEFAULT_ENABLED_PLATFORMS));
    let phyllo_webhook_secret = lookup("PHYLLO_WEBHOOK_SECRET")
        .ok()
        .filter(|v| !v.is_empty());
    let phyllo_request_timeout_secs = parse_u64("PHYLLO_REQUEST_TIMEOUT_SECS", "30")?;

    // Zero would stall every sync; treat it as sequential.
    let sync_concurrency = parse_usize("PHYLLO_SYNC_CONCURRENCY", "1")?.max(1);
    let sync_cron = lookup("CREATORDB_SYNC_CRON")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        phyllo_client_id,
        phyllo_client_secret,
        phyllo_environment,
        phyllo_base_url,
        phyllo_enabled_platforms,
        phyllo_webhook_secret,
        phyllo_request_timeout_secs,
        sync_concurrency,
        sync_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CREATORDB_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_phyllo_environment(s: &str) -> Result<PhylloEnvironment, ConfigError> {
    match s {
        "sandbox" => Ok(PhylloEnvironment::Sandbox),
        "production" => Ok(PhylloEnvironment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PHYLLO_ENVIRONMENT".to_string(),
            reason: format!("expected sandbox or production; got '{other}'"),
        }),
    }
}

/// Split a comma-separated platform list into trimmed, lowercase names.
fn parse_platform_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
