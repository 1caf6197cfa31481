//! Resolver middleware chain.
//!
//! A resolver is an ordinary boxed async function
//! `(Arc<ExecutionContext>, Args) -> Result<ResolverValue, FieldError>`;
//! middleware is ordinary function wrapping over that shape. The chain is
//! composed once at schema build, per field:
//!
//! 1. [`auth`] - resolves and memoizes the caller identity (always,
//!    outermost)
//! 2. [`pagination`] - slices lazy sequences into page envelopes (fields
//!    with the `paginated` capability)
//! 3. [`guard`] - denies anonymous callers (fields with the `guarded`
//!    capability)
//! 4. the business resolver

pub mod auth;
pub mod guard;
pub mod pagination;

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::collaborators::RecordSeq;
use crate::context::ExecutionContext;
use crate::error::FieldError;

/// Field arguments, a JSON object.
pub type Args = serde_json::Map<String, serde_json::Value>;

/// What a resolver produces: either a finished JSON value, or a lazy record
/// sequence for the pagination middleware to window.
pub enum ResolverValue {
    /// A materialized value, merged into the response as-is.
    Json(serde_json::Value),
    /// A lazy ordered sequence; must be consumed by pagination (or
    /// explicitly materialized by the resolver that produced it).
    Sequence(Arc<dyn RecordSeq>),
}

impl ResolverValue {
    /// Wrap any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Internal`] if the value fails to serialize.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, FieldError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

/// A composable resolver operation.
pub type Resolver = Arc<
    dyn Fn(Arc<ExecutionContext>, Args) -> BoxFuture<'static, Result<ResolverValue, FieldError>>
        + Send
        + Sync,
>;

/// Lift an async closure into a [`Resolver`].
pub fn resolver<F, Fut>(f: F) -> Resolver
where
    F: Fn(Arc<ExecutionContext>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResolverValue, FieldError>> + Send + 'static,
{
    Arc::new(move |ctx, args| Box::pin(f(ctx, args)))
}
