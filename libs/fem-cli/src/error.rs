//! # CLI Errors

use config::constants::ConfigError;
use fem_bulk::BulkError;
use fem_mesh::MeshError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for command execution.
pub type CliResult<T> = Result<T, CliError>;

/// Everything a subcommand can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Bulk data error: {0}")]
    Bulk(#[from] BulkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ruled job that cannot be turned into curves; `job` counts from 1
    #[error("Ruled job {job}: {message}")]
    InvalidJob { job: usize, message: String },

    #[error("Cannot parse job file {}: {source}", path.display())]
    JobFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    pub fn invalid_job(job: usize, message: impl Into<String>) -> Self {
        Self::InvalidJob {
            job,
            message: message.into(),
        }
    }
}
