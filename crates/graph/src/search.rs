//! Free-text search predicate builder.
//!
//! Turns one search-box input into a disjunctive, case-insensitive substring
//! predicate over a fixed set of record fields. The predicate is handed to
//! the query collaborator for evaluation; nothing is matched in-process.

use greenstall_core::{ContainsClause, SearchFilter};

/// Builds [`SearchFilter`]s over a fixed, ordered set of field names.
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    fields: Vec<String>,
}

impl SearchQueryBuilder {
    /// Create a builder over the named fields, in order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the OR-across-fields predicate for one free-text input.
    ///
    /// The term is trimmed; a blank term produces an empty filter, which
    /// matches nothing - callers usually skip filtering entirely in that
    /// case.
    #[must_use]
    pub fn build(&self, term: &str) -> SearchFilter {
        let term = term.trim();
        if term.is_empty() {
            return SearchFilter::default();
        }

        SearchFilter::new(
            self.fields
                .iter()
                .map(|field| ContainsClause {
                    field: field.clone(),
                    needle: term.to_owned(),
                })
                .collect(),
        )
    }
}
