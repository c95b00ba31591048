use std::path::PathBuf;

use crate::app_config::{AppConfig, StorageBackend};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
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
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so they
/// can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let storage_backend = parse_storage_backend(&or_default("CARTSCAN_STORAGE_BACKEND", "gcs"))?;

    // Only uploads need a bucket; `plan` and dry runs work without one.
    let bucket_name = match storage_backend {
        StorageBackend::Gcs => optional("GCS_BUCKET_NAME"),
        StorageBackend::Local => {
            Some(optional("GCS_BUCKET_NAME").unwrap_or_else(|| "cartscan".to_string()))
        }
    };
    let bucket_path = or_default("GCS_BUCKET_PATH", "")
        .trim_matches('/')
        .to_string();
    let credentials_path = optional("GCP_CREDENTIALS_PATH").map(PathBuf::from);
    let local_root = PathBuf::from(or_default("CARTSCAN_LOCAL_ROOT", "./data"));

    let api_base_url = or_default("CARTSCAN_API_BASE_URL", "https://cornershopapp.com");
    let request_timeout_secs = parse_u64("CARTSCAN_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CARTSCAN_USER_AGENT", "cartscan/0.1 (grocery-search)");
    let request_delay_secs = parse_u64("CARTSCAN_REQUEST_DELAY_SECS", "1")?;
    let max_retries = parse_u32("CARTSCAN_MAX_RETRIES", "3")?;

    let plan_path = PathBuf::from(or_default("CARTSCAN_PLAN_PATH", "./config/plan.yaml"));
    let log_level = or_default("CARTSCAN_LOG_LEVEL", "info");

    Ok(AppConfig {
        storage_backend,
        bucket_name,
        bucket_path,
        credentials_path,
        local_root,
        api_base_url,
        request_timeout_secs,
        user_agent,
        request_delay_secs,
        max_retries,
        plan_path,
        log_level,
    })
}

fn parse_storage_backend(s: &str) -> Result<StorageBackend, ConfigError> {
    match s {
        "gcs" => Ok(StorageBackend::Gcs),
        "local" => Ok(StorageBackend::Local),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CARTSCAN_STORAGE_BACKEND".to_string(),
            reason: format!("unknown backend '{other}'; expected 'gcs' or 'local'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
