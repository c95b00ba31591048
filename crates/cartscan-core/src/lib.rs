pub mod app_config;
pub mod config;
pub mod plan;
pub mod rows;

pub use app_config::{AppConfig, StorageBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use plan::{load_plan, SearchPlan};
pub use rows::{extract_rows, extract_rows_on, lookup, ExtractError, Row};

use thiserror::Error;

/// Errors raised while loading the environment configuration or the search plan.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read plan file {path}: {source}")]
    PlanFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan file: {0}")]
    PlanFileParse(#[from] serde_yaml::Error),

    #[error("invalid search plan: {0}")]
    Validation(String),
}
