//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the load/save contract the sync driver and services depend on.
//! - Isolate SQLite and JSON encoding details from business orchestration.
//!
//! # Invariants
//! - Loaded collections always satisfy `QuoteCollection` invariants.

pub mod quote_store;
