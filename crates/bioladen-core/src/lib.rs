pub mod app_config;
pub mod config;
pub mod records;
pub mod run_input;
pub mod task;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_START_URL};
pub use records::{StoreRecord, HOME_COUNTRY_CODE, SOURCE_TAG};
pub use run_input::{
    load_run_input, parse_run_input, validate_run_input, DedupMode, RunInput,
    DEFAULT_POSTAL_CODE, DEFAULT_RADIUS_KM,
};
pub use task::{Category, CategoryFilters, SearchTask};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read run input {path}: {source}")]
    RunInputIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse run input: {0}")]
    RunInputParse(#[source] serde_yaml::Error),

    #[error("invalid run input: {0}")]
    Validation(String),
}
