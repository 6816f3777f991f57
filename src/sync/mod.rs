//! Sync engine: diff GoodLinks against the persisted state and push every
//! pending link to Instapaper, strictly one at a time.
//!
//! Progress is flushed every [`FLUSH_INTERVAL`] processed items and once more
//! at the end, so a crash re-sends at most one interval's worth of links.
//! Per-item failures never abort the run; a source, state, or authentication
//! failure does.

use std::collections::HashMap;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::goodlinks::{LinkSource, SourceError};
use crate::instapaper::{AuthenticationFailed, PublishOutcome, Publisher};
use crate::state::{StateError, StateStore, SyncState};
use crate::types::LinkRecord;

/// Processed items (successful or not) between state flushes.
pub const FLUSH_INTERVAL: usize = 10;

const PROGRESS_TITLE_WIDTH: usize = 60;
const DRY_RUN_TITLE_WIDTH: usize = 70;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationFailed),

    #[error("GoodLinks not running, skipping sync")]
    SourceNotReady,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub max_retries: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_retries: 3,
        }
    }
}

/// Outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub total_links: usize,
    pub pending_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Stopped early on a shutdown signal.
    pub interrupted: bool,
}

/// Snapshot for the `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub total_links: usize,
    pub synced_count: usize,
    pub pending: Vec<LinkRecord>,
}

/// Collapse duplicate ids to one record. The first occurrence keeps its
/// position; the last occurrence supplies url and title.
pub fn dedupe_links(links: Vec<LinkRecord>) -> Vec<LinkRecord> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(links.len());
    let mut unique: Vec<LinkRecord> = Vec::with_capacity(links.len());
    for link in links {
        match index.get(&link.id) {
            Some(&pos) => unique[pos] = link,
            None => {
                index.insert(link.id.clone(), unique.len());
                unique.push(link);
            }
        }
    }
    unique
}

/// Links whose id is not yet in `state`, in source order.
pub fn pending_links<'a>(links: &'a [LinkRecord], state: &SyncState) -> Vec<&'a LinkRecord> {
    links.iter().filter(|l| !state.contains(&l.id)).collect()
}

pub struct SyncEngine<'a> {
    source: &'a dyn LinkSource,
    publisher: &'a dyn Publisher,
    store: &'a dyn StateStore,
    flush_every: usize,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        source: &'a dyn LinkSource,
        publisher: &'a dyn Publisher,
        store: &'a dyn StateStore,
    ) -> Self {
        Self {
            source,
            publisher,
            store,
            flush_every: FLUSH_INTERVAL,
        }
    }

    /// Run one sync pass.
    ///
    /// `shutdown` is checked before each item; once cancelled, no further
    /// publishes are issued and confirmed progress is flushed.
    pub async fn run(
        &self,
        options: SyncOptions,
        shutdown: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let mut state = self.store.load().await?;
        if state.is_empty() {
            tracing::debug!("No sync state yet, every link is pending");
        }
        let links = dedupe_links(self.source.fetch_all().await?);
        let pending = pending_links(&links, &state);

        let mut report = SyncReport {
            total_links: links.len(),
            pending_count: pending.len(),
            ..SyncReport::default()
        };
        tracing::info!(
            "Found {} new links to sync (of {} total)",
            report.pending_count,
            report.total_links
        );

        if options.dry_run {
            for link in &pending {
                tracing::info!("  Would sync: {}", link.short_title(DRY_RUN_TITLE_WIDTH));
            }
            tracing::info!("Would sync {} links", report.pending_count);
            return Ok(report);
        }

        if pending.is_empty() {
            tracing::info!("Nothing to sync");
            return Ok(report);
        }

        let total = pending.len();
        for (i, link) in pending.into_iter().enumerate() {
            if shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, stopping after {} of {} links", i, total);
                report.interrupted = true;
                break;
            }

            let n = i + 1;
            let title = link.short_title(PROGRESS_TITLE_WIDTH);
            match self.publisher.publish(link, options.max_retries).await {
                Ok(PublishOutcome::Success) => {
                    state.mark_synced(link.id.as_str());
                    report.succeeded += 1;
                    tracing::info!("[{}/{}] {}... ok", n, total, title);
                }
                Ok(_) => {
                    report.failed += 1;
                    tracing::warn!("[{}/{}] {}... FAILED", n, total, title);
                }
                Err(auth) => {
                    tracing::error!("[{}/{}] {}... aborting", n, total, title);
                    if let Err(e) = self.store.save(&state).await {
                        tracing::error!("Failed to save sync progress: {}", e);
                    }
                    return Err(auth.into());
                }
            }

            if n % self.flush_every == 0 {
                self.store.save(&state).await?;
            }
        }

        self.store.save(&state).await?;
        tracing::info!("Done: {} synced, {} failed", report.succeeded, report.failed);
        Ok(report)
    }
}

/// Counts and pending links for the `status` command. Never mutates state.
pub async fn status(
    source: &dyn LinkSource,
    store: &dyn StateStore,
) -> Result<StatusReport, SyncError> {
    let state = store.load().await?;
    let links = dedupe_links(source.fetch_all().await?);
    let pending = pending_links(&links, &state)
        .into_iter()
        .cloned()
        .collect();
    Ok(StatusReport {
        total_links: links.len(),
        synced_count: state.len(),
        pending,
    })
}
