use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The API key is optional here; commands that query the backend check for it
/// themselves so `export` and `reset` work without one.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let env = parse_environment(&or_default("MAPCRAWL_ENV", "development"))?;
    let log_level = or_default("MAPCRAWL_LOG_LEVEL", "info");
    let targets_path = PathBuf::from(or_default("MAPCRAWL_TARGETS_PATH", "./config/targets.yaml"));
    let data_dir = PathBuf::from(or_default("MAPCRAWL_DATA_DIR", "./data"));
    let slot_name = or_default("MAPCRAWL_SLOT_NAME", "business_records_backup");
    if slot_name.trim().is_empty() || slot_name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPCRAWL_SLOT_NAME".to_string(),
            reason: format!("'{slot_name}' is not a plain file stem"),
        });
    }

    let gemini_api_key = lookup("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
    let gemini_model = or_default("MAPCRAWL_GEMINI_MODEL", "gemini-2.5-flash");
    let gemini_base_url = or_default(
        "MAPCRAWL_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com/",
    );

    let request_timeout_secs = parse_u64("MAPCRAWL_REQUEST_TIMEOUT_SECS", "60")?;
    let inter_query_delay_ms = parse_u64("MAPCRAWL_INTER_QUERY_DELAY_MS", "3000")?;
    let quota_cooldown_secs = parse_u32("MAPCRAWL_QUOTA_COOLDOWN_SECS", "60")?;
    if quota_cooldown_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPCRAWL_QUOTA_COOLDOWN_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        targets_path,
        data_dir,
        slot_name,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        request_timeout_secs,
        inter_query_delay_ms,
        quota_cooldown_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAPCRAWL_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
