//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by the backfill pipeline.
///
/// Most per-item failures (an unreadable file, a malformed session line, a
/// rejected insert) are logged and skipped rather than raised; only failures
/// that make the run as a whole impossible — reaching the destination store,
/// resolving configured directories — travel through this type.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// The destination store could not be opened or queried at the
    /// connection level.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem error outside the per-file skip policy.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unresolvable configuration (bad paths, missing home dir).
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<tokio_rusqlite::Error> for BackfillError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        BackfillError::Storage(err.to_string())
    }
}
