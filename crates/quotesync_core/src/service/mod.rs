//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, reconciler and remote source into use-case APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod quote_service;
