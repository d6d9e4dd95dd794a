//! Remote sync: sources, reconciliation and the cycle driver.
//!
//! # Responsibility
//! - Merge read-only remote snapshots into the local quote collection.
//! - Keep remote I/O and persistence outside the pure reconciler.
//!
//! # Invariants
//! - Remote data wins every detected conflict.
//! - Sync cycles against one store must not overlap.

use crate::model::quote::QuoteValidationError;
use crate::repo::quote_store::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod driver;
pub mod reconcile;
pub mod remote;

/// Failure of one sync cycle.
#[derive(Debug)]
pub enum SyncError {
    /// Remote source could not deliver a snapshot.
    Fetch(String),
    /// Remote snapshot contained an unusable record.
    Validation(QuoteValidationError),
    /// Local load/save failed.
    Repo(RepoError),
}

impl SyncError {
    /// Stable machine-readable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch_failed",
            Self::Validation(_) => "invalid_remote_record",
            Self::Repo(_) => "storage_failed",
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(message) => write!(f, "failed to fetch remote quotes: {message}"),
            Self::Validation(err) => write!(f, "invalid remote quote: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(_) => None,
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for SyncError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
