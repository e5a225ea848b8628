use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by storage backends.
///
/// The persistence bridge never lets these reach a container: each one is
/// logged and replaced by a safe default.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize items for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage quota exceeded writing '{key}' ({needed} of {quota} bytes)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Storage is unavailable")]
    Unavailable,

    #[error("Failed to watch '{path}': {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
