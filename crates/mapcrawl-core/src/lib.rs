pub mod app_config;
pub mod config;
pub mod record;
pub mod source;
pub mod targets;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{LatLng, QueryTuple, Record, Zone, PHONE_PLACEHOLDER};
pub use source::{BusinessSource, SourceError};
pub use targets::{load_targets, Targets};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file: {0}")]
    TargetsFileParse(#[from] serde_yaml::Error),

    #[error("targets validation failed: {0}")]
    Validation(String),
}
