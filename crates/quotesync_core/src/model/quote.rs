//! Quote domain model.
//!
//! # Responsibility
//! - Define the canonical quote record shared by storage, sync and CLI.
//! - Define the loosely-typed remote record accepted from sync sources.
//!
//! # Invariants
//! - `id`, `text` and `category` are never blank on a validated quote.
//! - `dirty == true` implies `origin == QuoteOrigin::Local`.
//!
//! # See also
//! - crate::sync::reconcile

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable quote identifier.
///
/// Local ids are `local-<uuid>`; remote ids are whatever the source assigns.
pub type QuoteId = String;

/// Category used when a record carries no usable category.
pub const DEFAULT_FALLBACK_CATEGORY: &str = "General";

const LOCAL_ID_PREFIX: &str = "local-";

/// Provenance of a quote's current field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteOrigin {
    /// Values were last written by a local user action.
    Local,
    /// Values were last written from a remote snapshot.
    Remote,
}

/// Validation error for quote and remote-record invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    /// A required field is absent on a remote or imported record.
    MissingField(&'static str),
    EmptyId,
    EmptyText,
    EmptyCategory,
    /// Two quotes in one collection share this id.
    DuplicateId(QuoteId),
    /// A quote is marked dirty although its origin is remote.
    DirtyRemoteQuote(QuoteId),
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "quote record is missing `{field}`"),
            Self::EmptyId => write!(f, "quote id must not be empty"),
            Self::EmptyText => write!(f, "quote text must not be empty"),
            Self::EmptyCategory => write!(f, "quote category must not be empty"),
            Self::DuplicateId(id) => write!(f, "duplicate quote id: {id}"),
            Self::DirtyRemoteQuote(id) => {
                write!(f, "quote {id} is dirty but has remote origin")
            }
        }
    }
}

impl Error for QuoteValidationError {}

/// Canonical quote record.
///
/// Serialized with camelCase keys; this is the persisted and exported shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub text: String,
    pub category: String,
    /// Unix epoch milliseconds. Informational only, never used for precedence.
    pub updated_at: i64,
    pub origin: QuoteOrigin,
    /// Locally modified and not yet acknowledged by the remote side.
    pub dirty: bool,
}

impl Quote {
    /// Creates a locally authored quote with a fresh id.
    ///
    /// # Invariants
    /// - `origin = Local`, `dirty = true`.
    /// - Text and category are trimmed and must be non-empty.
    pub fn new_local(
        text: impl Into<String>,
        category: impl Into<String>,
        now_ms: i64,
    ) -> Result<Self, QuoteValidationError> {
        let quote = Self {
            id: new_local_id(),
            text: text.into().trim().to_string(),
            category: category.into().trim().to_string(),
            updated_at: now_ms,
            origin: QuoteOrigin::Local,
            dirty: true,
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.id.trim().is_empty() {
            return Err(QuoteValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        if self.dirty && self.origin == QuoteOrigin::Remote {
            return Err(QuoteValidationError::DirtyRemoteQuote(self.id.clone()));
        }
        Ok(())
    }

    /// Overwrites this quote with authoritative remote values.
    ///
    /// Clears `dirty` and stamps `updated_at`.
    pub(crate) fn adopt_remote(&mut self, remote: &ValidRemoteQuote, now_ms: i64) {
        self.id = remote.id.clone();
        self.text = remote.text.clone();
        self.category = remote.category.clone();
        self.origin = QuoteOrigin::Remote;
        self.dirty = false;
        self.updated_at = now_ms;
    }

    /// Whether text or category differ from the given remote values.
    pub(crate) fn differs_from(&self, remote: &ValidRemoteQuote) -> bool {
        self.text != remote.text || self.category != remote.category
    }
}

/// Generates a fresh id for a locally created quote.
pub fn new_local_id() -> QuoteId {
    format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4())
}

/// Remote record as delivered by a sync source.
///
/// Every field is optional on the wire; [`RemoteQuote::validate`] turns it
/// into a usable record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuote {
    #[serde(default)]
    pub id: Option<QuoteId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl RemoteQuote {
    /// Convenience constructor for a fully populated record.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            text: Some(text.into()),
            category: Some(category.into()),
            updated_at: None,
        }
    }

    /// Validates required fields and defaults the category.
    ///
    /// # Errors
    /// - `MissingField("id")` / `MissingField("text")` when absent.
    /// - `EmptyId` / `EmptyText` when present but blank.
    pub fn validate(
        &self,
        fallback_category: &str,
    ) -> Result<ValidRemoteQuote, QuoteValidationError> {
        let id = self
            .id
            .as_deref()
            .ok_or(QuoteValidationError::MissingField("id"))?;
        if id.trim().is_empty() {
            return Err(QuoteValidationError::EmptyId);
        }

        let text = self
            .text
            .as_deref()
            .ok_or(QuoteValidationError::MissingField("text"))?;
        if text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }

        let category = match self.category.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => fallback_category.to_string(),
        };

        Ok(ValidRemoteQuote {
            id: id.to_string(),
            text: text.to_string(),
            category,
            updated_at: self.updated_at,
        })
    }
}

/// Remote record after validation; all required fields are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRemoteQuote {
    pub id: QuoteId,
    pub text: String,
    pub category: String,
    pub updated_at: Option<i64>,
}

impl ValidRemoteQuote {
    /// Materializes a new collection member from this record.
    pub(crate) fn into_quote(self, now_ms: i64) -> Quote {
        Quote {
            id: self.id,
            text: self.text,
            category: self.category,
            updated_at: self.updated_at.unwrap_or(now_ms),
            origin: QuoteOrigin::Remote,
            dirty: false,
        }
    }
}
