//! Domain model for quotes and their sync metadata.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own collection-level invariants (unique ids, stable order).
//!
//! # Invariants
//! - Every quote is identified by a stable `QuoteId`.
//! - Quotes are never hard-deleted by the core.

pub mod collection;
pub mod quote;
