//! Remote snapshot sources.
//!
//! # Responsibility
//! - Define the pull contract the sync driver uses to obtain remote quotes.
//! - Provide in-memory and JSON-file sources.
//!
//! # Invariants
//! - Sources are read-only; nothing is ever pushed back.
//! - A source returns the whole snapshot or an error, never a partial list.

use crate::model::quote::RemoteQuote;
use crate::sync::SyncError;
use std::path::{Path, PathBuf};

/// Read-only provider of remote quote snapshots.
pub trait RemoteSource {
    /// Stable identifier used in logs.
    fn source_id(&self) -> &str;
    /// Fetches the full current remote snapshot.
    fn fetch(&self) -> Result<Vec<RemoteQuote>, SyncError>;
}

impl<R: RemoteSource + ?Sized> RemoteSource for &R {
    fn source_id(&self) -> &str {
        (**self).source_id()
    }

    fn fetch(&self) -> Result<Vec<RemoteQuote>, SyncError> {
        (**self).fetch()
    }
}

/// Source returning a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticRemoteSource {
    records: Vec<RemoteQuote>,
}

impl StaticRemoteSource {
    pub fn new(records: Vec<RemoteQuote>) -> Self {
        Self { records }
    }
}

impl RemoteSource for StaticRemoteSource {
    fn source_id(&self) -> &str {
        "static"
    }

    fn fetch(&self) -> Result<Vec<RemoteQuote>, SyncError> {
        Ok(self.records.clone())
    }
}

/// Source reading a JSON array of remote records from disk.
#[derive(Debug, Clone)]
pub struct JsonFileRemoteSource {
    path: PathBuf,
}

impl JsonFileRemoteSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Snapshot file this source reads on every fetch.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RemoteSource for JsonFileRemoteSource {
    fn source_id(&self) -> &str {
        "json_file"
    }

    fn fetch(&self) -> Result<Vec<RemoteQuote>, SyncError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            SyncError::Fetch(format!("failed to read `{}`: {err}", self.path.display()))
        })?;
        parse_remote_snapshot(&raw)
    }
}

/// Parses a remote snapshot JSON array.
pub fn parse_remote_snapshot(raw: &str) -> Result<Vec<RemoteQuote>, SyncError> {
    serde_json::from_str(raw)
        .map_err(|err| SyncError::Fetch(format!("remote snapshot is not a quote array: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{parse_remote_snapshot, JsonFileRemoteSource, RemoteSource, StaticRemoteSource};
    use crate::model::quote::RemoteQuote;
    use crate::sync::SyncError;
    use std::path::Path;

    #[test]
    fn json_file_source_reads_its_path_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let source = JsonFileRemoteSource::new(&path);
        assert_eq!(source.path(), Path::new(&path));

        let err = source.fetch().unwrap_err();
        assert!(matches!(err, SyncError::Fetch(message) if message.contains("snapshot.json")));

        std::fs::write(&path, r#"[{"id":"s-1","text":"Hello"}]"#).unwrap();
        assert_eq!(source.fetch().unwrap()[0].id.as_deref(), Some("s-1"));
    }

    #[test]
    fn parse_accepts_partial_records() {
        let records =
            parse_remote_snapshot(r#"[{"id":"s-1","text":"Hello"},{"id":"s-2"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, None);
        assert_eq!(records[1].text, None);
    }

    #[test]
    fn parse_rejects_non_array_payload() {
        let err = parse_remote_snapshot(r#"{"id":"s-1"}"#).unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
    }

    #[test]
    fn static_source_returns_snapshot() {
        let source = StaticRemoteSource::new(vec![RemoteQuote::new("s-1", "Hello", "Server")]);
        assert_eq!(source.fetch().unwrap().len(), 1);
        assert_eq!(source.source_id(), "static");
    }
}
