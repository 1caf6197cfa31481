//! Free-text search predicates.

use serde::{Deserialize, Serialize};

/// One disjunct of a [`SearchFilter`]: "this field's value contains this
/// needle, case-insensitively".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainsClause {
    /// Record field the clause applies to.
    pub field: String,
    /// Substring to look for.
    pub needle: String,
}

/// A disjunctive, case-insensitive substring predicate over named record
/// fields.
///
/// Query collaborators receive the filter as data and translate the clauses
/// into their own query language. [`SearchFilter::matches`] exists for
/// in-memory backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    clauses: Vec<ContainsClause>,
}

impl SearchFilter {
    /// Build a filter from its clauses.
    #[must_use]
    pub fn new(clauses: Vec<ContainsClause>) -> Self {
        Self { clauses }
    }

    /// The clauses, in field order.
    #[must_use]
    pub fn clauses(&self) -> &[ContainsClause] {
        &self.clauses
    }

    /// Whether the filter has no clauses (matches nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against a JSON record: true when any clause's
    /// field holds a string containing the clause's needle, ignoring case.
    #[must_use]
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        self.clauses.iter().any(|clause| {
            record
                .get(&clause.field)
                .and_then(serde_json::Value::as_str)
                .is_some_and(|value| {
                    value
                        .to_lowercase()
                        .contains(&clause.needle.to_lowercase())
                })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn name_or_description(needle: &str) -> SearchFilter {
        SearchFilter::new(vec![
            ContainsClause {
                field: "name".to_owned(),
                needle: needle.to_owned(),
            },
            ContainsClause {
                field: "description".to_owned(),
                needle: needle.to_owned(),
            },
        ])
    }

    #[test]
    fn test_matches_any_field_case_insensitively() {
        let filter = name_or_description("red");
        assert!(filter.matches(&json!({"name": "Red Shoe", "description": "classic"})));
        assert!(filter.matches(&json!({"name": "Sneaker", "description": "a RED item"})));
    }

    #[test]
    fn test_no_clause_matches() {
        let filter = name_or_description("red");
        assert!(!filter.matches(&json!({"name": "Blue Shoe", "description": "navy"})));
    }

    #[test]
    fn test_non_string_fields_are_skipped() {
        let filter = name_or_description("1");
        assert!(!filter.matches(&json!({"name": 1, "description": null})));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        assert!(!SearchFilter::default().matches(&json!({"name": "anything"})));
    }
}
