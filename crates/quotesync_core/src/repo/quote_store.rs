//! Quote store contracts and implementations.
//!
//! # Responsibility
//! - Persist the quote collection as one JSON blob under a fixed key.
//! - Persist the id of the last viewed quote.
//! - Keep SQL and serialization details inside the persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - A store with no saved blob loads as an empty collection.

use crate::db::migrations::{stored_schema_version, supported_schema_version};
use crate::db::DbError;
use crate::model::collection::QuoteCollection;
use crate::model::quote::{Quote, QuoteId, QuoteValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized quote array.
pub const QUOTES_KEY: &str = "quotes";
/// Storage key holding the last viewed quote id.
pub const LAST_VIEWED_KEY: &str = "last_viewed_quote";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for quote storage operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(QuoteValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted quote data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<QuoteValidationError> for RepoError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence interface used by the sync driver and quote service.
///
/// The reconciler never calls this; drivers load before and save after.
pub trait QuoteStore {
    fn load_quotes(&self) -> RepoResult<QuoteCollection>;
    fn save_quotes(&self, quotes: &QuoteCollection) -> RepoResult<()>;
    fn load_last_viewed(&self) -> RepoResult<Option<QuoteId>>;
    fn save_last_viewed(&self, id: &str) -> RepoResult<()>;
}

impl<S: QuoteStore + ?Sized> QuoteStore for &S {
    fn load_quotes(&self) -> RepoResult<QuoteCollection> {
        (**self).load_quotes()
    }

    fn save_quotes(&self, quotes: &QuoteCollection) -> RepoResult<()> {
        (**self).save_quotes(quotes)
    }

    fn load_last_viewed(&self) -> RepoResult<Option<QuoteId>> {
        (**self).load_last_viewed()
    }

    fn save_last_viewed(&self, id: &str) -> RepoResult<()> {
        (**self).save_last_viewed(id)
    }
}

/// SQLite key-value backed quote store.
pub struct SqliteQuoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuoteStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = supported_schema_version();
        let actual_version = stored_schema_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_value(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

impl QuoteStore for SqliteQuoteStore<'_> {
    fn load_quotes(&self) -> RepoResult<QuoteCollection> {
        match self.get_value(QUOTES_KEY)? {
            Some(blob) => decode_quotes(&blob),
            None => Ok(QuoteCollection::new()),
        }
    }

    fn save_quotes(&self, quotes: &QuoteCollection) -> RepoResult<()> {
        let blob = encode_quotes(quotes)?;
        self.put_value(QUOTES_KEY, &blob)?;
        debug!(
            "event=quotes_save module=repo status=ok backend=sqlite count={}",
            quotes.len()
        );
        Ok(())
    }

    fn load_last_viewed(&self) -> RepoResult<Option<QuoteId>> {
        self.get_value(LAST_VIEWED_KEY)
    }

    fn save_last_viewed(&self, id: &str) -> RepoResult<()> {
        self.put_value(LAST_VIEWED_KEY, id)
    }
}

/// Process-local quote store.
///
/// Holds the same JSON blob a persistent store would, so decode paths are
/// shared.
#[derive(Debug, Default)]
pub struct InMemoryQuoteStore {
    quotes_blob: RefCell<Option<String>>,
    last_viewed: RefCell<Option<QuoteId>>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `quotes`.
    pub fn with_quotes(quotes: &QuoteCollection) -> RepoResult<Self> {
        let store = Self::new();
        store.save_quotes(quotes)?;
        Ok(store)
    }

    /// Replaces the raw blob, bypassing encoding.
    pub fn set_raw_blob(&self, blob: impl Into<String>) {
        *self.quotes_blob.borrow_mut() = Some(blob.into());
    }
}

impl QuoteStore for InMemoryQuoteStore {
    fn load_quotes(&self) -> RepoResult<QuoteCollection> {
        match self.quotes_blob.borrow().as_deref() {
            Some(blob) => decode_quotes(blob),
            None => Ok(QuoteCollection::new()),
        }
    }

    fn save_quotes(&self, quotes: &QuoteCollection) -> RepoResult<()> {
        let blob = encode_quotes(quotes)?;
        *self.quotes_blob.borrow_mut() = Some(blob);
        Ok(())
    }

    fn load_last_viewed(&self) -> RepoResult<Option<QuoteId>> {
        Ok(self.last_viewed.borrow().clone())
    }

    fn save_last_viewed(&self, id: &str) -> RepoResult<()> {
        *self.last_viewed.borrow_mut() = Some(id.to_string());
        Ok(())
    }
}

/// Serializes a collection into the persisted JSON array shape.
pub fn encode_quotes(quotes: &QuoteCollection) -> RepoResult<String> {
    serde_json::to_string(quotes)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode quotes: {err}")))
}

/// Parses and validates the persisted JSON array shape.
pub fn decode_quotes(blob: &str) -> RepoResult<QuoteCollection> {
    let quotes: Vec<Quote> = serde_json::from_str(blob).map_err(|err| {
        error!("event=quotes_load module=repo status=error error_code=decode_failed");
        RepoError::InvalidData(format!("stored quotes are not a valid quote array: {err}"))
    })?;

    QuoteCollection::from_quotes(quotes)
        .map_err(|err| RepoError::InvalidData(format!("stored quotes violate invariants: {err}")))
}
