//! Error types for the command line front end.

use std::path::PathBuf;

use hn_core::HnError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Network {
        path: PathBuf,
        #[source]
        source: HnError,
    },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to set up logging: {0}")]
    Logging(String),

    #[error("{failed} of {total} conversions failed")]
    Batch { failed: usize, total: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn network(path: impl Into<PathBuf>, source: HnError) -> Self {
        CliError::Network {
            path: path.into(),
            source,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
