//! Product and category fields.

use std::sync::Arc;

use crate::collaborators::ProductCatalog;
use crate::middleware::{Resolver, ResolverValue, resolver};
use crate::search::SearchQueryBuilder;

use super::{materialize, optional_str};

/// Record fields the free-text product search spans.
pub const PRODUCT_SEARCH_FIELDS: [&str; 2] = ["name", "description"];

/// `products(search)` - the catalog as a lazy sequence for pagination,
/// optionally narrowed by a free-text search over name and description.
pub fn products(catalog: Arc<dyn ProductCatalog>) -> Resolver {
    let search = SearchQueryBuilder::new(PRODUCT_SEARCH_FIELDS);
    resolver(move |_ctx, args| {
        let catalog = Arc::clone(&catalog);
        let search = search.clone();
        async move {
            let filter = optional_str(&args, "search")?
                .map(|term| search.build(&term))
                .filter(|filter| !filter.is_empty());

            Ok(ResolverValue::Sequence(catalog.products(filter)))
        }
    })
}

/// `categories` - all categories, materialized (small, unpaginated).
pub fn categories(catalog: Arc<dyn ProductCatalog>) -> Resolver {
    resolver(move |_ctx, _args| {
        let catalog = Arc::clone(&catalog);
        async move { materialize(catalog.categories()).await }
    })
}
