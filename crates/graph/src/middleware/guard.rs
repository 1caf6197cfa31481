//! Permission guard middleware.
//!
//! Denies execution of the wrapped resolver when no caller identity is
//! present. The denial is a field-scoped [`FieldError::Authentication`]:
//! sibling fields in the same request are unaffected and return their own
//! results.

use std::sync::Arc;

use tracing::debug;

use crate::error::FieldError;

use super::Resolver;

/// Wrap a resolver so it only runs for authenticated callers.
///
/// The identity is read from the execution context (written earlier by the
/// auth middleware); the wrapped resolver reaches it the same way.
pub fn wrap(inner: Resolver) -> Resolver {
    Arc::new(move |ctx, args| {
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            if ctx.caller().await.is_anonymous() {
                debug!("guarded field denied for anonymous caller");
                return Err(FieldError::unauthenticated());
            }
            inner(ctx, args).await
        })
    })
}
