//! One sync cycle: load, fetch, reconcile, save.
//!
//! # Responsibility
//! - Sequence persistence and remote fetch around the pure reconciler.
//! - Produce a report the caller can show to the user.
//!
//! # Invariants
//! - A failed fetch or failed validation leaves the store untouched.
//! - The driver runs exactly one cycle per call; scheduling is the caller's job.

use crate::clock::Clock;
use crate::repo::quote_store::QuoteStore;
use crate::sync::reconcile::{reconcile, ConflictReport, ReconcileOptions};
use crate::sync::remote::RemoteSource;
use crate::sync::SyncError;
use log::{error, info, warn};
use std::time::Instant;

/// Summary of one completed sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Remote entries received.
    pub fetched: usize,
    /// Remote entries appended as new quotes.
    pub appended: usize,
    /// Collection size after the cycle.
    pub total: usize,
    pub conflicts: Vec<ConflictReport>,
}

impl SyncReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// One-line status suitable for a notification banner.
    pub fn status_message(&self) -> String {
        if self.has_conflicts() {
            format!(
                "Synced {} quotes from server; {} conflict(s) resolved, server data kept.",
                self.fetched,
                self.conflicts.len()
            )
        } else {
            format!("Synced {} quotes from server.", self.fetched)
        }
    }
}

/// Drives sync cycles for one store and one remote source.
pub struct SyncDriver<'a, S: QuoteStore, R: RemoteSource> {
    store: &'a S,
    remote: &'a R,
    clock: &'a dyn Clock,
    options: ReconcileOptions,
}

impl<'a, S: QuoteStore, R: RemoteSource> SyncDriver<'a, S, R> {
    pub fn new(store: &'a S, remote: &'a R, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            remote,
            clock,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs one full cycle.
    ///
    /// # Errors
    /// - `SyncError::Repo` when loading or saving fails.
    /// - `SyncError::Fetch` when the remote source fails.
    /// - `SyncError::Validation` when the snapshot has unusable records.
    pub fn sync_once(&self) -> Result<SyncReport, SyncError> {
        let started_at = Instant::now();
        let source = self.remote.source_id();
        info!("event=sync_cycle module=sync status=start source={source}");

        let result = self.run_cycle();
        match &result {
            Ok(report) => {
                info!(
                    "event=sync_cycle module=sync status=ok source={} duration_ms={} fetched={} appended={} conflicts={} total={}",
                    source,
                    started_at.elapsed().as_millis(),
                    report.fetched,
                    report.appended,
                    report.conflicts.len(),
                    report.total
                );
                for conflict in &report.conflicts {
                    warn!(
                        "event=sync_conflict module=sync status=resolved source={} quote_id={} kind={:?}",
                        source, conflict.quote_id, conflict.kind
                    );
                }
            }
            Err(err) => error!(
                "event=sync_cycle module=sync status=error source={} duration_ms={} error_code={} error={}",
                source,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        let local = self.store.load_quotes()?;
        let remote = self.remote.fetch()?;
        let fetched = remote.len();

        let outcome = reconcile(local, &remote, self.clock, &self.options)?;
        self.store.save_quotes(&outcome.collection)?;

        Ok(SyncReport {
            fetched,
            appended: outcome.appended,
            total: outcome.collection.len(),
            conflicts: outcome.conflicts,
        })
    }
}
