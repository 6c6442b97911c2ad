use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub targets_path: PathBuf,
    pub data_dir: PathBuf,
    pub slot_name: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    pub inter_query_delay_ms: u64,
    pub quota_cooldown_secs: u32,
}

impl AppConfig {
    /// The Gemini API key, required by commands that query the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `GEMINI_API_KEY` is unset or empty.
    pub fn require_gemini_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("targets_path", &self.targets_path)
            .field("data_dir", &self.data_dir)
            .field("slot_name", &self.slot_name)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("inter_query_delay_ms", &self.inter_query_delay_ms)
            .field("quota_cooldown_secs", &self.quota_cooldown_secs)
            .finish()
    }
}
