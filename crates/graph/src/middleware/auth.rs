//! Identity-resolution middleware.
//!
//! Wraps every field resolver. The first field resolution of a request runs
//! the authentication resolver and writes the outcome (including the
//! anonymous case) into the context's identity cell; every other field
//! resolution for the same request - nested or sibling, sequential or
//! concurrent - observes the stored value. The cell's initializer is a
//! one-shot: racing siblings wait for the winner instead of resolving twice.
//!
//! Applied outermost, so the identity write happens-before any guard or
//! pagination read for the same field.

use std::sync::Arc;

use super::Resolver;

/// Wrap a resolver so the caller identity is resolved (once) before it runs.
pub fn wrap(inner: Resolver) -> Resolver {
    Arc::new(move |ctx, args| {
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            ctx.caller().await;
            inner(ctx, args).await
        })
    })
}
