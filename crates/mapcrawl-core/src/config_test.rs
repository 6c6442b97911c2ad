use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "MAPCRAWL_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.targets_path.to_str(), Some("./config/targets.yaml"));
    assert_eq!(cfg.data_dir.to_str(), Some("./data"));
    assert_eq!(cfg.slot_name, "business_records_backup");
    assert!(cfg.gemini_api_key.is_none());
    assert_eq!(cfg.gemini_model, "gemini-2.5-flash");
    assert_eq!(
        cfg.gemini_base_url,
        "https://generativelanguage.googleapis.com/"
    );
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.inter_query_delay_ms, 3000);
    assert_eq!(cfg.quota_cooldown_secs, 60);
}

#[test]
fn build_app_config_reads_api_key() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.gemini_api_key.as_deref(), Some("secret-key"));
}

#[test]
fn build_app_config_treats_empty_api_key_as_absent() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.gemini_api_key.is_none());
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-key"), "leaked key: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn quota_cooldown_override() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_QUOTA_COOLDOWN_SECS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.quota_cooldown_secs, 5);
}

#[test]
fn quota_cooldown_invalid() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_QUOTA_COOLDOWN_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MAPCRAWL_QUOTA_COOLDOWN_SECS"),
        "expected InvalidEnvVar(MAPCRAWL_QUOTA_COOLDOWN_SECS), got: {result:?}"
    );
}

#[test]
fn quota_cooldown_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_QUOTA_COOLDOWN_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MAPCRAWL_QUOTA_COOLDOWN_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn require_api_key_reports_missing_var() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.require_gemini_api_key().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "GEMINI_API_KEY"));
}

#[test]
fn require_api_key_returns_configured_key() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.require_gemini_api_key().unwrap(), "secret-key");
}

#[test]
fn inter_query_delay_override() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_INTER_QUERY_DELAY_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inter_query_delay_ms, 250);
}

#[test]
fn inter_query_delay_invalid() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_INTER_QUERY_DELAY_MS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MAPCRAWL_INTER_QUERY_DELAY_MS"),
        "got: {result:?}"
    );
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_REQUEST_TIMEOUT_SECS", "1.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MAPCRAWL_REQUEST_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn slot_name_with_path_separator_is_rejected() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_SLOT_NAME", "../escape");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MAPCRAWL_SLOT_NAME"),
        "got: {result:?}"
    );
}

#[test]
fn data_dir_and_targets_overrides() {
    let mut map = HashMap::new();
    map.insert("MAPCRAWL_DATA_DIR", "/var/lib/mapcrawl");
    map.insert("MAPCRAWL_TARGETS_PATH", "/etc/mapcrawl/targets.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.data_dir.to_str(), Some("/var/lib/mapcrawl"));
    assert_eq!(
        cfg.targets_path.to_str(),
        Some("/etc/mapcrawl/targets.yaml")
    );
}
