//! Field-scoped error taxonomy.
//!
//! Failures inside a single field's resolution are isolated to that field's
//! error slot; they never abort sibling fields in the same request. The
//! executor records a [`FieldError`] per failed field and leaves `null` in
//! the data slot.

use thiserror::Error;

/// An error scoped to one field resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No, invalid, or expired credential on a guarded field.
    #[error("unauthenticated: {0}")]
    Authentication(String),

    /// Credential valid but the caller lacks rights over the target.
    #[error("forbidden: {0}")]
    Authorization(String),

    /// The field arguments do not satisfy the field's contract.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Unexpected failure inside the resolver or a collaborator.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FieldError {
    /// Stable machine-readable code for the error category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "UNAUTHENTICATED",
            Self::Authorization(_) => "FORBIDDEN",
            Self::InvalidArguments(_) => "BAD_USER_INPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Shorthand for an [`FieldError::Internal`] from any displayable cause.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::Internal(cause.to_string())
    }

    /// The canonical "authentication required" error for guarded fields.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Authentication("authentication is required to resolve this field".to_owned())
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

/// Result alias for resolver outcomes.
pub type FieldResult<T> = Result<T, FieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(FieldError::unauthenticated().code(), "UNAUTHENTICATED");
        assert_eq!(
            FieldError::Authorization(String::new()).code(),
            "FORBIDDEN"
        );
        assert_eq!(
            FieldError::InvalidArguments(String::new()).code(),
            "BAD_USER_INPUT"
        );
        assert_eq!(FieldError::Internal(String::new()).code(), "INTERNAL");
    }
}
