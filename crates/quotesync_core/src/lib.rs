//! Core domain logic for quotesync.
//! This crate is the single source of truth for quote invariants and the
//! local/remote reconciliation policy.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::QuoteCollection;
pub use model::quote::{
    Quote, QuoteId, QuoteOrigin, QuoteValidationError, RemoteQuote, DEFAULT_FALLBACK_CATEGORY,
};
pub use repo::quote_store::{
    InMemoryQuoteStore, QuoteStore, RepoError, RepoResult, SqliteQuoteStore,
};
pub use service::quote_service::{
    ImportSummary, QuoteService, QuoteServiceError, STARTER_QUOTES,
};
pub use sync::driver::{SyncDriver, SyncReport};
pub use sync::reconcile::{
    reconcile, ConflictKind, ConflictReport, ReconcileOptions, ReconcileOutcome,
};
pub use sync::remote::{JsonFileRemoteSource, RemoteSource, StaticRemoteSource};
pub use sync::SyncError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
