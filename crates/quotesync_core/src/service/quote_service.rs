//! Quote-book use-case service.
//!
//! # Responsibility
//! - Own the quote store for one context; no ambient shared collection.
//! - Provide seed/add/random/filter/export/import/sync entry points.
//!
//! # Invariants
//! - Every mutation is load -> change -> save on the owned store.
//! - Sync takes `&mut self`, so two cycles never overlap on one service.
//! - Import is all-or-nothing: a malformed entry stores nothing.

use crate::clock::{Clock, SystemClock};
use crate::model::collection::QuoteCollection;
use crate::model::quote::{new_local_id, Quote, QuoteOrigin, QuoteValidationError};
use crate::repo::quote_store::{QuoteStore, RepoError};
use crate::sync::driver::{SyncDriver, SyncReport};
use crate::sync::reconcile::ReconcileOptions;
use crate::sync::remote::RemoteSource;
use crate::sync::SyncError;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for quote-book use-cases.
#[derive(Debug)]
pub enum QuoteServiceError {
    Validation(QuoteValidationError),
    Repo(RepoError),
    Sync(SyncError),
    /// Import payload is malformed.
    InvalidImport(String),
    /// The collection could not be rendered as JSON.
    Export(serde_json::Error),
    /// Nothing matches the requested selection.
    Empty,
}

impl Display for QuoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
            Self::InvalidImport(message) => write!(f, "invalid import file: {message}"),
            Self::Export(err) => write!(f, "failed to export quotes: {err}"),
            Self::Empty => write!(f, "no quotes available yet"),
        }
    }
}

impl Error for QuoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Sync(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::InvalidImport(_) | Self::Empty => None,
        }
    }
}

impl From<QuoteValidationError> for QuoteServiceError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for QuoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SyncError> for QuoteServiceError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

pub type ServiceResult<T> = Result<T, QuoteServiceError>;

/// `(text, category)` pairs a fresh quote book starts with.
pub const STARTER_QUOTES: &[(&str, &str)] = &[
    (
        "The best way to get started is to quit talking and begin doing.",
        "Inspiration",
    ),
    ("In the middle of every difficulty lies opportunity.", "Wisdom"),
    ("I'm not arguing, I'm just explaining why I'm right.", "Humor"),
];

/// Outcome of a JSON import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    /// Entries skipped because their id or content already existed.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct ImportedQuote {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Use-case service over one quote store.
pub struct QuoteService<S: QuoteStore> {
    store: S,
    clock: Box<dyn Clock>,
    options: ReconcileOptions,
}

impl<S: QuoteStore> QuoteService<S> {
    /// Creates a service using wall-clock time and default options.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Writes [`STARTER_QUOTES`] into an empty book.
    ///
    /// Starter quotes are local but not dirty: they are not user edits.
    /// Returns the number of quotes written, `0` when the book has content.
    pub fn seed_defaults(&self) -> ServiceResult<usize> {
        let mut quotes = self.store.load_quotes()?;
        if !quotes.is_empty() {
            return Ok(0);
        }

        let now = self.clock.now_millis();
        for (text, category) in STARTER_QUOTES {
            let mut quote = Quote::new_local(*text, *category, now)?;
            quote.dirty = false;
            quotes.push(quote)?;
        }
        self.store.save_quotes(&quotes)?;

        info!(
            "event=quote_seed module=service status=ok added={}",
            quotes.len()
        );
        Ok(quotes.len())
    }

    /// Adds a locally authored quote.
    ///
    /// # Contract
    /// - Text and category are trimmed and must be non-empty.
    /// - The new quote is `origin = Local`, `dirty = true`.
    pub fn add_quote(
        &self,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> ServiceResult<Quote> {
        let quote = Quote::new_local(text, category, self.clock.now_millis())?;
        let mut quotes = self.store.load_quotes()?;
        quotes.push(quote.clone())?;
        self.store.save_quotes(&quotes)?;

        info!(
            "event=quote_add module=service status=ok quote_id={} total={}",
            quote.id,
            quotes.len()
        );
        Ok(quote)
    }

    /// Lists quotes in collection order, optionally restricted to a category.
    pub fn list_quotes(&self, category: Option<&str>) -> ServiceResult<Vec<Quote>> {
        let quotes = self.store.load_quotes()?;
        let selected = match category {
            Some(category) => quotes.filter_by_category(category).cloned().collect(),
            None => quotes.into_vec(),
        };
        Ok(selected)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.store.load_quotes()?.categories())
    }

    /// Picks a uniformly random quote and records it as last viewed.
    ///
    /// # Errors
    /// - `Empty` when no quote matches.
    pub fn random_quote<R: Rng + ?Sized>(
        &self,
        category: Option<&str>,
        rng: &mut R,
    ) -> ServiceResult<Quote> {
        let quotes = self.list_quotes(category)?;
        let picked = quotes.choose(rng).cloned().ok_or(QuoteServiceError::Empty)?;
        self.store.save_last_viewed(&picked.id)?;
        Ok(picked)
    }

    /// Returns the last viewed quote if it still exists.
    pub fn last_viewed(&self) -> ServiceResult<Option<Quote>> {
        let Some(id) = self.store.load_last_viewed()? else {
            return Ok(None);
        };
        Ok(self.store.load_quotes()?.get(&id).cloned())
    }

    /// Serializes all quotes as a pretty JSON array.
    pub fn export_json(&self) -> ServiceResult<String> {
        let quotes = self.store.load_quotes()?;
        serde_json::to_string_pretty(&quotes).map_err(QuoteServiceError::Export)
    }

    /// Imports quotes from a JSON array of `{id?, text, category?}` objects.
    ///
    /// # Contract
    /// - Entries without id receive a fresh local id.
    /// - Entries whose id or exact (text, category) already exist are skipped.
    /// - Imported quotes are local and dirty.
    pub fn import_json(&self, raw: &str) -> ServiceResult<ImportSummary> {
        let entries: Vec<ImportedQuote> = serde_json::from_str(raw)
            .map_err(|err| QuoteServiceError::InvalidImport(err.to_string()))?;

        let now = self.clock.now_millis();
        let mut quotes = self.store.load_quotes()?;
        let mut summary = ImportSummary::default();

        for (index, entry) in entries.into_iter().enumerate() {
            let quote = imported_to_quote(entry, &self.options.fallback_category, now)
                .map_err(|err| QuoteServiceError::InvalidImport(format!("entry {index}: {err}")))?;

            if quotes.contains_id(&quote.id) || quotes.contains_content(&quote.text, &quote.category)
            {
                summary.skipped += 1;
                continue;
            }
            quotes.push(quote)?;
            summary.added += 1;
        }

        self.store.save_quotes(&quotes)?;
        info!(
            "event=quote_import module=service status=ok added={} skipped={}",
            summary.added, summary.skipped
        );
        Ok(summary)
    }

    /// Runs one sync cycle against `remote`.
    pub fn sync<R: RemoteSource>(&mut self, remote: &R) -> ServiceResult<SyncReport> {
        let driver = SyncDriver::new(&self.store, remote, &*self.clock)
            .with_options(self.options.clone());
        Ok(driver.sync_once()?)
    }

    /// Loads the whole collection.
    pub fn collection(&self) -> ServiceResult<QuoteCollection> {
        Ok(self.store.load_quotes()?)
    }
}

fn imported_to_quote(
    entry: ImportedQuote,
    fallback_category: &str,
    now_ms: i64,
) -> Result<Quote, QuoteValidationError> {
    let text = entry
        .text
        .map(|value| value.trim().to_string())
        .ok_or(QuoteValidationError::MissingField("text"))?;
    let category = entry
        .category
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback_category.to_string());
    let id = entry
        .id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(new_local_id);

    let quote = Quote {
        id,
        text,
        category,
        updated_at: now_ms,
        origin: QuoteOrigin::Local,
        dirty: true,
    };
    quote.validate()?;
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::{imported_to_quote, ImportedQuote, QuoteServiceError};
    use crate::model::quote::QuoteValidationError;
    use std::error::Error;

    #[test]
    fn export_error_names_export_and_keeps_source() {
        let cause = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = QuoteServiceError::Export(cause);

        assert!(err.to_string().starts_with("failed to export quotes:"));
        assert!(!err.to_string().contains("persisted"));
        assert!(err.source().is_some());
    }

    #[test]
    fn imported_entry_without_text_is_rejected() {
        let entry = ImportedQuote {
            id: None,
            text: None,
            category: Some("X".to_string()),
        };
        assert_eq!(
            imported_to_quote(entry, "General", 0).unwrap_err(),
            QuoteValidationError::MissingField("text")
        );
    }

    #[test]
    fn imported_entry_gets_fallback_category_and_local_id() {
        let entry = ImportedQuote {
            id: None,
            text: Some(" Stay curious ".to_string()),
            category: None,
        };
        let quote = imported_to_quote(entry, "General", 7).unwrap();
        assert_eq!(quote.text, "Stay curious");
        assert_eq!(quote.category, "General");
        assert!(quote.id.starts_with("local-"));
        assert!(quote.dirty);
    }
}
