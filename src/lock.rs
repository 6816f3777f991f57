//! Exclusive lock held for the duration of a `sync` run.
//!
//! Two concurrent runs would race on the state file; the second one fails
//! fast instead. The advisory lock is held through the open file descriptor
//! and released when [`RunLock`] is dropped.

use std::path::Path;

use anyhow::Context;
use fs4::fs_std::FileExt;

#[derive(Debug)]
pub struct RunLock {
    _file: std::fs::File,
}

impl RunLock {
    pub fn acquire(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;
        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another goodlinks2insta sync is already running (lock: {})",
                path.display()
            )
        })?;
        tracing::debug!("Acquired run lock {}", path.display());
        Ok(Self { _file: file })
    }
}
