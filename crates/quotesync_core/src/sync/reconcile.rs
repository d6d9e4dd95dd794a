//! Local/remote quote reconciliation.
//!
//! # Responsibility
//! - Merge a remote snapshot into the local collection.
//! - Report every case where remote data replaced unacknowledged local edits.
//!
//! # Invariants
//! - Remote values always win; there is no three-way merge.
//! - Remote entries are applied in input order; a later entry may overwrite
//!   the result of an earlier one in the same pass.
//! - Every merged or appended quote ends with `origin = Remote`, `dirty = false`.
//! - Validation happens before any mutation (all-or-nothing).
//! - Time is read only through the injected `Clock`.

use crate::clock::Clock;
use crate::model::collection::QuoteCollection;
use crate::model::quote::{
    QuoteId, QuoteOrigin, QuoteValidationError, RemoteQuote, ValidRemoteQuote,
    DEFAULT_FALLBACK_CATEGORY,
};
use log::debug;
use std::fmt::{Display, Formatter};

/// Tunables for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Category substituted when a remote record has none.
    pub fallback_category: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
        }
    }
}

/// Which matching rule produced a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A dirty local quote with the same id had different content.
    OverwroteLocal,
    /// A dirty local quote with the same text was replaced.
    ReplacedDirtyDuplicate,
}

/// One conflict resolved in favor of remote data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    /// Id the local quote had before it was overwritten.
    pub quote_id: QuoteId,
    pub kind: ConflictKind,
}

impl Display for ConflictReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ConflictKind::OverwroteLocal => write!(f, "overwrote local id={}", self.quote_id),
            ConflictKind::ReplacedDirtyDuplicate => write!(f, "replaced dirty duplicate text"),
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub collection: QuoteCollection,
    /// Conflicts in the order they were encountered.
    pub conflicts: Vec<ConflictReport>,
    /// Number of remote entries appended as new quotes.
    pub appended: usize,
}

/// Merges `remote` into `local` with remote-wins semantics.
///
/// Per remote entry: match by id, else by first equal text, else append.
///
/// # Errors
/// - Returns a validation error if any remote entry lacks `id` or `text`.
///   No entry is merged in that case; the persisted copy stays authoritative.
pub fn reconcile(
    local: QuoteCollection,
    remote: &[RemoteQuote],
    clock: &dyn Clock,
    options: &ReconcileOptions,
) -> Result<ReconcileOutcome, QuoteValidationError> {
    let validated = remote
        .iter()
        .map(|record| record.validate(&options.fallback_category))
        .collect::<Result<Vec<_>, _>>()?;

    let now = clock.now_millis();
    let mut collection = local;
    let mut conflicts = Vec::new();
    let mut appended = 0;

    for record in validated {
        if let Some(index) = collection.position_by_id(&record.id) {
            let quote = collection.get_mut_at(index);
            if quote.dirty && quote.differs_from(&record) {
                conflicts.push(ConflictReport {
                    quote_id: quote.id.clone(),
                    kind: ConflictKind::OverwroteLocal,
                });
            }
            quote.adopt_remote(&record, now);
            continue;
        }

        if let Some(index) = collection.position_by_text(&record.text) {
            let quote = collection.get_mut_at(index);
            if is_dirty_duplicate(quote.dirty, &quote.category, quote.origin, &record) {
                conflicts.push(ConflictReport {
                    quote_id: quote.id.clone(),
                    kind: ConflictKind::ReplacedDirtyDuplicate,
                });
            } else {
                debug!(
                    "event=reconcile_adopt module=sync status=ok local_id={} remote_id={}",
                    quote.id, record.id
                );
            }
            quote.adopt_remote(&record, now);
            continue;
        }

        collection.push_unchecked(record.into_quote(now));
        appended += 1;
    }

    Ok(ReconcileOutcome {
        collection,
        conflicts,
        appended,
    })
}

fn is_dirty_duplicate(
    dirty: bool,
    category: &str,
    origin: QuoteOrigin,
    remote: &ValidRemoteQuote,
) -> bool {
    dirty && (category != remote.category || origin != QuoteOrigin::Remote)
}

#[cfg(test)]
mod tests {
    use super::{reconcile, ConflictKind, ConflictReport, ReconcileOptions};
    use crate::clock::FixedClock;
    use crate::model::collection::QuoteCollection;
    use crate::model::quote::{Quote, QuoteOrigin, RemoteQuote};

    fn local(id: &str, text: &str, category: &str, dirty: bool) -> Quote {
        Quote {
            id: id.to_string(),
            text: text.to_string(),
            category: category.to_string(),
            updated_at: 1,
            origin: if dirty {
                QuoteOrigin::Local
            } else {
                QuoteOrigin::Remote
            },
            dirty,
        }
    }

    #[test]
    fn conflict_report_display_matches_user_messages() {
        let by_id = ConflictReport {
            quote_id: "local-1".to_string(),
            kind: ConflictKind::OverwroteLocal,
        };
        let by_text = ConflictReport {
            quote_id: "local-2".to_string(),
            kind: ConflictKind::ReplacedDirtyDuplicate,
        };
        assert_eq!(by_id.to_string(), "overwrote local id=local-1");
        assert_eq!(by_text.to_string(), "replaced dirty duplicate text");
    }

    #[test]
    fn dirty_text_match_with_same_category_still_conflicts_for_local_origin() {
        let collection =
            QuoteCollection::from_quotes(vec![local("local-9", "Same", "A", true)]).unwrap();
        let remote = vec![RemoteQuote::new("s-9", "Same", "A")];

        let outcome = reconcile(
            collection,
            &remote,
            &FixedClock(10),
            &ReconcileOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].kind, ConflictKind::ReplacedDirtyDuplicate);
        let merged = outcome.collection.get("s-9").unwrap();
        assert!(!merged.dirty);
        assert_eq!(merged.origin, QuoteOrigin::Remote);
        assert!(outcome.collection.get("local-9").is_none());
    }

    #[test]
    fn validation_failure_happens_before_any_merge() {
        let collection =
            QuoteCollection::from_quotes(vec![local("local-1", "A", "X", true)]).unwrap();
        let remote = vec![
            RemoteQuote::new("local-1", "B", "Y"),
            RemoteQuote {
                id: Some("s-2".to_string()),
                ..RemoteQuote::default()
            },
        ];

        assert!(reconcile(
            collection,
            &remote,
            &FixedClock(10),
            &ReconcileOptions::default()
        )
        .is_err());
    }
}
