//! Resolved caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// An entity resolved from the external user directory.
///
/// The execution pipeline only resolves and attaches identities; it never
/// mutates them. Whatever attributes the directory exposes beyond these are
/// its own business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Directory identifier for this caller.
    pub id: UserId,
    /// Primary email address.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account has staff privileges.
    pub is_staff: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Full display name, `"First Last"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let identity = Identity {
            id: UserId::random(),
            email: Email::parse("jo@example.com").unwrap(),
            first_name: "Jo".to_owned(),
            last_name: "Smith".to_owned(),
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
        };
        assert_eq!(identity.display_name(), "Jo Smith");
    }
}
