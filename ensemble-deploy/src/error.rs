//! Error types for ensemble-deploy.

use std::path::PathBuf;

use thiserror::Error;

use ensemble_core::CoreError;

/// All errors that can arise from acquisition and deployment operations.
#[derive(Debug, Error)]
pub enum DeployError {
    /// An error from core metadata handling.
    #[error("metadata error: {0}")]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (metadata record).
    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `git clone` failed or could not be spawned.
    #[error("failed to clone '{origin}' (branch '{branch}'): {detail}")]
    Clone {
        origin: String,
        branch: String,
        detail: String,
    },
}

/// Convenience constructor for [`DeployError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DeployError {
    DeployError::Io {
        path: path.into(),
        source,
    }
}
