//! Pagination middleware.
//!
//! Applied only to fields whose result shape carries the `paginated`
//! capability, decided once at schema build. The middleware pops the
//! 1-based `page` argument before delegating - wrapped resolvers stay
//! pagination-agnostic - then materializes the resolver's lazy sequence
//! into a bounded [`Page`] envelope: `count()`, window math, one `slice()`.
//!
//! A page index past the last page yields an empty `items` with
//! `has_next = false`.

use std::sync::Arc;

use tracing::debug;

use greenstall_core::Page;

use crate::error::FieldError;

use super::{Args, Resolver, ResolverValue};

/// Builds page envelopes around lazy-sequence resolvers.
#[derive(Debug, Clone, Copy)]
pub struct PaginationMiddleware {
    page_size: u32,
}

impl PaginationMiddleware {
    /// Create the middleware with a fixed page size.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Wrap a sequence-producing resolver into an envelope-producing one.
    pub fn wrap(self, inner: Resolver) -> Resolver {
        Arc::new(move |ctx, mut args| {
            let inner = Arc::clone(&inner);
            Box::pin(async move {
                let page = take_page(&mut args)?;

                let ResolverValue::Sequence(seq) = inner(ctx, args).await? else {
                    return Err(FieldError::Internal(
                        "paginated field did not produce a record sequence".to_owned(),
                    ));
                };

                let total_count = seq.count().await.map_err(FieldError::internal)?;
                let (offset, limit) = Page::<serde_json::Value>::window(page, self.page_size);

                let items = if offset < total_count {
                    seq.slice(offset, limit).await.map_err(FieldError::internal)?
                } else {
                    debug!(page, total_count, "page window past the end of the sequence");
                    Vec::new()
                };

                let envelope = Page::assemble(items, page, self.page_size, total_count);
                ResolverValue::json(&envelope)
            })
        })
    }
}

/// Pop the `page` argument: 1-based, default 1, clamped to >= 1.
fn take_page(args: &mut Args) -> Result<u32, FieldError> {
    match args.remove("page") {
        None | Some(serde_json::Value::Null) => Ok(1),
        Some(value) => {
            let raw = value.as_i64().ok_or_else(|| {
                FieldError::InvalidArguments("page must be an integer".to_owned())
            })?;
            Ok(u32::try_from(raw.max(1)).unwrap_or(u32::MAX))
        }
    }
}
