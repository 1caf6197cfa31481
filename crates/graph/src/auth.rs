//! Credential extraction and caller resolution.
//!
//! Maps raw request headers to a [`CallerIdentity`], fail closed: a missing
//! header, a rejected token, a non-access token, a directory miss, and a
//! directory failure or timeout all resolve to anonymous. Nothing in this
//! module ever fails a request.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use http::header::AUTHORIZATION;
use tracing::{debug, warn};

use greenstall_core::UserId;

use crate::collaborators::UserDirectory;
use crate::config::AuthConfig;
use crate::context::CallerIdentity;
use crate::token::{TokenManager, TokenType};

/// Resolves request headers to a caller identity.
pub struct AuthenticationResolver {
    tokens: TokenManager,
    directory: Arc<dyn UserDirectory>,
    scheme_prefix_len: usize,
    lookup_timeout: Duration,
}

impl AuthenticationResolver {
    /// Create a resolver over a token manager and user directory.
    #[must_use]
    pub fn new(tokens: TokenManager, directory: Arc<dyn UserDirectory>, config: &AuthConfig) -> Self {
        Self {
            tokens,
            directory,
            scheme_prefix_len: config.scheme_prefix_len,
            lookup_timeout: config.lookup_timeout,
        }
    }

    /// Pull the raw credential out of the authorization header by removing
    /// the configured fixed-length scheme prefix.
    ///
    /// Returns `None` when the header is absent, not valid UTF-8, shorter
    /// than the prefix, or empty after the strip.
    fn extract_credential<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = value.get(self.scheme_prefix_len..)?;
        if token.is_empty() {
            return None;
        }
        Some(token)
    }

    /// Resolve the caller for a request. Never errors.
    pub async fn resolve(&self, headers: &HeaderMap) -> CallerIdentity {
        let Some(raw) = self.extract_credential(headers) else {
            debug!("no usable authorization header; resolving anonymous");
            return CallerIdentity::Anonymous;
        };

        let claims = match self.tokens.verify(raw) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "credential rejected; resolving anonymous");
                return CallerIdentity::Anonymous;
            }
        };

        // verify() leaves the type check to its callers; this flow requires
        // an access token.
        if claims.token_type != TokenType::Access {
            warn!(
                token_type = claims.token_type.as_str(),
                "non-access token presented for authentication"
            );
            return CallerIdentity::Anonymous;
        }

        let Ok(user_id) = UserId::parse(&claims.sub) else {
            warn!(sub = %claims.sub, "token subject is not a valid user id");
            return CallerIdentity::Anonymous;
        };

        match tokio::time::timeout(self.lookup_timeout, self.directory.lookup(user_id)).await {
            Ok(Ok(Some(identity))) => {
                debug!(user = %identity.id, "caller resolved");
                CallerIdentity::User(identity)
            }
            Ok(Ok(None)) => {
                debug!(user = %user_id, "token subject not found in directory");
                CallerIdentity::Anonymous
            }
            Ok(Err(err)) => {
                warn!(error = %err, "directory lookup failed; resolving anonymous");
                CallerIdentity::Anonymous
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.lookup_timeout.as_millis(),
                    "directory lookup timed out; resolving anonymous"
                );
                CallerIdentity::Anonymous
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use http::HeaderValue;
    use secrecy::SecretString;

    use greenstall_core::{Email, Identity};

    use crate::collaborators::{CollaboratorError, NewUser, RecordSeq};
    use crate::config::TokenConfig;

    use super::*;

    struct EmptySeq;

    #[async_trait]
    impl RecordSeq for EmptySeq {
        async fn count(&self) -> Result<u64, CollaboratorError> {
            Ok(0)
        }

        async fn slice(
            &self,
            _offset: u64,
            _limit: u64,
        ) -> Result<Vec<serde_json::Value>, CollaboratorError> {
            Ok(Vec::new())
        }
    }

    /// Directory with one known user; optionally slow or failing.
    struct StubDirectory {
        known: Identity,
        delay: Option<Duration>,
        fail: bool,
    }

    #[async_trait]
    impl UserDirectory for StubDirectory {
        async fn lookup(&self, id: UserId) -> Result<Option<Identity>, CollaboratorError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(CollaboratorError::Unavailable("stub outage".to_owned()));
            }
            Ok((id == self.known.id).then(|| self.known.clone()))
        }

        async fn verify_credentials(
            &self,
            _email: &Email,
            _password: &str,
        ) -> Result<Option<Identity>, CollaboratorError> {
            Ok(None)
        }

        async fn register(&self, _profile: NewUser) -> Result<Identity, CollaboratorError> {
            Err(CollaboratorError::Unavailable("stub".to_owned()))
        }

        fn records(&self) -> Arc<dyn RecordSeq> {
            Arc::new(EmptySeq)
        }
    }

    fn identity() -> Identity {
        Identity {
            id: UserId::random(),
            email: Email::parse("alice@example.com").unwrap(),
            first_name: "Alice".to_owned(),
            last_name: "Moss".to_owned(),
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    fn token_manager() -> TokenManager {
        TokenManager::new(
            SecretString::from("k4T%bQ9@wZ2!nF7#xV5^mJ1&hL8*pD3$"),
            TokenConfig {
                access_ttl: chrono::Duration::minutes(5),
                refresh_ttl: chrono::Duration::days(7),
                clock_skew: chrono::Duration::zero(),
            },
        )
    }

    fn resolver_with(directory: StubDirectory, prefix_len: usize) -> AuthenticationResolver {
        AuthenticationResolver::new(
            token_manager(),
            Arc::new(directory),
            &AuthConfig {
                scheme_prefix_len: prefix_len,
                lookup_timeout: Duration::from_millis(50),
            },
        )
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_resolves_known_user_with_default_prefix() {
        let known = identity();
        let token = token_manager()
            .issue_access(&known.id.to_string())
            .unwrap();
        let resolver = resolver_with(
            StubDirectory {
                known: known.clone(),
                delay: None,
                fail: false,
            },
            4,
        );

        let caller = resolver.resolve(&headers(&format!("JWT {token}"))).await;
        assert_eq!(caller.identity().map(|i| i.id), Some(known.id));
    }

    #[tokio::test]
    async fn test_prefix_length_is_configuration() {
        let known = identity();
        let token = token_manager()
            .issue_access(&known.id.to_string())
            .unwrap();

        // A bearer-style scheme works once the prefix length says so.
        let resolver = resolver_with(
            StubDirectory {
                known: known.clone(),
                delay: None,
                fail: false,
            },
            7,
        );
        let caller = resolver
            .resolve(&headers(&format!("Bearer {token}")))
            .await;
        assert!(caller.identity().is_some());

        // And the same header under the 4-char default strips into garbage.
        let resolver = resolver_with(
            StubDirectory {
                known,
                delay: None,
                fail: false,
            },
            4,
        );
        let caller = resolver
            .resolve(&headers(&format!("Bearer {token}")))
            .await;
        assert!(caller.is_anonymous());
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let resolver = resolver_with(
            StubDirectory {
                known: identity(),
                delay: None,
                fail: false,
            },
            4,
        );
        assert!(resolver.resolve(&HeaderMap::new()).await.is_anonymous());
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let known = identity();
        let token = token_manager()
            .issue_refresh(&known.id.to_string())
            .unwrap();
        let resolver = resolver_with(
            StubDirectory {
                known,
                delay: None,
                fail: false,
            },
            4,
        );

        let caller = resolver.resolve(&headers(&format!("JWT {token}"))).await;
        assert!(caller.is_anonymous());
    }

    #[tokio::test]
    async fn test_unknown_subject_is_anonymous() {
        let token = token_manager()
            .issue_access(&UserId::random().to_string())
            .unwrap();
        let resolver = resolver_with(
            StubDirectory {
                known: identity(),
                delay: None,
                fail: false,
            },
            4,
        );

        let caller = resolver.resolve(&headers(&format!("JWT {token}"))).await;
        assert!(caller.is_anonymous());
    }

    #[tokio::test]
    async fn test_directory_failure_is_anonymous() {
        let known = identity();
        let token = token_manager()
            .issue_access(&known.id.to_string())
            .unwrap();
        let resolver = resolver_with(
            StubDirectory {
                known,
                delay: None,
                fail: true,
            },
            4,
        );

        let caller = resolver.resolve(&headers(&format!("JWT {token}"))).await;
        assert!(caller.is_anonymous());
    }

    #[tokio::test]
    async fn test_directory_timeout_is_anonymous() {
        let known = identity();
        let token = token_manager()
            .issue_access(&known.id.to_string())
            .unwrap();
        let resolver = resolver_with(
            StubDirectory {
                known,
                delay: Some(Duration::from_millis(500)),
                fail: false,
            },
            4,
        );

        let caller = resolver.resolve(&headers(&format!("JWT {token}"))).await;
        assert!(caller.is_anonymous());
    }
}
