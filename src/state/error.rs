//! Error types for the sync state store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or persisting sync state.
#[derive(Error, Debug)]
pub enum StateError {
    /// The state file exists but is not a JSON array of ids.
    #[error(
        "Sync state at {path} is corrupt ({source}); \
         run `goodlinks2insta reset` to start over"
    )]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Reading, writing, or renaming the state file failed.
    #[error("Sync state I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the id set.
    #[error("Failed to serialize sync state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
