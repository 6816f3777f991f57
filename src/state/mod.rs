//! Persistent record of which GoodLinks ids have already been sent to
//! Instapaper.
//!
//! The state is a single JSON array of ids. It only grows during a run and is
//! cleared wholesale by `reset`. Each save is a full snapshot written to a
//! temp file and renamed over the previous one, so a reader never observes a
//! half-written set.

pub mod error;
pub mod store;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use error::StateError;
pub use store::{JsonStateStore, StateStore};

/// Set of item ids that have been mirrored successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncState {
    synced_ids: BTreeSet<String>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.synced_ids.contains(id)
    }

    /// Record `id` as synced. Returns false if it was already present.
    pub fn mark_synced(&mut self, id: impl Into<String>) -> bool {
        self.synced_ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.synced_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synced_ids.is_empty()
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.synced_ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SyncState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            synced_ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
