//! Per-request execution state.

use std::sync::Arc;

use http::HeaderMap;
use tokio::sync::OnceCell;

use greenstall_core::Identity;

use crate::auth::AuthenticationResolver;

/// The caller a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerIdentity {
    /// No usable credential was presented.
    Anonymous,
    /// A directory-backed identity.
    User(Identity),
}

impl CallerIdentity {
    /// The identity, when one was resolved.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::User(identity) => Some(identity),
        }
    }

    /// Whether the caller is anonymous.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Per-request context shared by every field resolution.
///
/// Created at request start, discarded at request end. The identity cell is
/// the only state shared across concurrently evaluated sibling resolutions:
/// written exactly once, read many times.
pub struct ExecutionContext {
    headers: HeaderMap,
    authenticator: Arc<AuthenticationResolver>,
    caller: OnceCell<CallerIdentity>,
}

impl ExecutionContext {
    /// Create the context for one request.
    #[must_use]
    pub fn new(headers: HeaderMap, authenticator: Arc<AuthenticationResolver>) -> Self {
        Self {
            headers,
            authenticator,
            caller: OnceCell::new(),
        }
    }

    /// The raw request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The resolved caller, resolving it on first use.
    ///
    /// Resolution runs exactly once per request: concurrent first calls
    /// race into the cell's initializer and all but one wait for the winner.
    /// Every later call observes the stored value.
    pub async fn caller(&self) -> &CallerIdentity {
        self.caller
            .get_or_init(|| self.authenticator.resolve(&self.headers))
            .await
    }

    /// The identity already stored in the cell, if resolution has happened.
    ///
    /// Mostly useful for assertions; resolvers should call
    /// [`ExecutionContext::caller`].
    #[must_use]
    pub fn caller_if_resolved(&self) -> Option<&CallerIdentity> {
        self.caller.get()
    }
}
