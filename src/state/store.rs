//! State store trait and JSON file implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StateError;
use super::SyncState;

/// Durable storage for [`SyncState`].
///
/// Object-safe so the sync engine can be exercised against in-memory fakes.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state. Missing state is an empty set; unparseable
    /// state is [`StateError::Corrupt`], never silently empty.
    async fn load(&self) -> Result<SyncState, StateError>;

    /// Persist a full snapshot, replacing the previous one atomically.
    async fn save(&self, state: &SyncState) -> Result<(), StateError>;

    /// Delete the persisted state. Returns whether anything was deleted.
    async fn reset(&self) -> Result<bool, StateError>;
}

/// Stores the synced ids as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Sibling temp file the next snapshot is written to before the rename.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Modification time of the state file, i.e. when progress was last flushed.
    pub async fn last_saved(&self) -> Result<Option<DateTime<Local>>, StateError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| StateError::io(&self.path, e))?;
                Ok(Some(DateTime::<Local>::from(modified)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::io(&self.path, e)),
        }
    }
}

/// Write `contents` to a fresh file at `path` and flush it to disk, so the
/// rename that follows can never expose an empty file after a power loss.
async fn write_synced(path: &std::path::Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

/// Persist the rename itself. Best effort: not every platform can open a
/// directory for syncing.
async fn sync_parent_dir(path: &std::path::Path) {
    #[cfg(unix)]
    {
        let Some(parent) = path.parent() else {
            return;
        };
        let synced = match fs::File::open(parent).await {
            Ok(dir) => dir.sync_all().await,
            Err(e) => Err(e),
        };
        if let Err(e) = synced {
            tracing::debug!("Could not sync directory {}: {}", parent.display(), e);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<SyncState, StateError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No sync state at {}, starting empty", self.path.display());
                return Ok(SyncState::new());
            }
            Err(e) => return Err(StateError::io(&self.path, e)),
        };

        let state: SyncState =
            serde_json::from_str(&contents).map_err(|source| StateError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(
            count = state.len(),
            "Loaded sync state from {}",
            self.path.display()
        );
        Ok(state)
    }

    async fn save(&self, state: &SyncState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StateError::io(parent, e))?;
        }

        let json = serde_json::to_vec(state)?;
        let tmp = self.temp_path();
        write_synced(&tmp, &json)
            .await
            .map_err(|e| StateError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StateError::io(&self.path, e))?;
        sync_parent_dir(&self.path).await;

        tracing::debug!(count = state.len(), "Saved sync state");
        Ok(())
    }

    async fn reset(&self) -> Result<bool, StateError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StateError::io(&self.path, e)),
        }
    }
}
