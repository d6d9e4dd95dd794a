//! Ordered, id-unique quote collection.
//!
//! # Invariants
//! - No two members share an `id`.
//! - Insertion order is preserved for stable display.

use crate::model::quote::{Quote, QuoteValidationError};
use serde::Serialize;
use std::collections::BTreeSet;

/// In-memory quote collection owned by one context at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuoteCollection {
    quotes: Vec<Quote>,
}

impl QuoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, validating each quote and id uniqueness.
    pub fn from_quotes(quotes: Vec<Quote>) -> Result<Self, QuoteValidationError> {
        let mut collection = Self::new();
        for quote in quotes {
            collection.push(quote)?;
        }
        Ok(collection)
    }

    /// Appends a quote after validation.
    ///
    /// # Errors
    /// - `DuplicateId` when a member already uses the quote's id.
    pub fn push(&mut self, quote: Quote) -> Result<(), QuoteValidationError> {
        quote.validate()?;
        if self.contains_id(&quote.id) {
            return Err(QuoteValidationError::DuplicateId(quote.id));
        }
        self.quotes.push(quote);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    pub fn as_slice(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn into_vec(self) -> Vec<Quote> {
        self.quotes
    }

    pub fn get(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Whether a member has exactly this text and category.
    pub fn contains_content(&self, text: &str, category: &str) -> bool {
        self.quotes
            .iter()
            .any(|quote| quote.text == text && quote.category == category)
    }

    /// Returns members with the exact category, in collection order.
    pub fn filter_by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Quote> {
        self.quotes
            .iter()
            .filter(move |quote| quote.category == category)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.quotes
            .iter()
            .map(|quote| quote.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub(crate) fn position_by_id(&self, id: &str) -> Option<usize> {
        self.quotes.iter().position(|quote| quote.id == id)
    }

    pub(crate) fn position_by_text(&self, text: &str) -> Option<usize> {
        self.quotes.iter().position(|quote| quote.text == text)
    }

    pub(crate) fn get_mut_at(&mut self, index: usize) -> &mut Quote {
        &mut self.quotes[index]
    }

    /// Appends without the duplicate-id check.
    ///
    /// Callers must have established that `quote.id` is absent.
    pub(crate) fn push_unchecked(&mut self, quote: Quote) {
        debug_assert!(!self.contains_id(&quote.id));
        self.quotes.push(quote);
    }
}

impl<'a> IntoIterator for &'a QuoteCollection {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}
