//! Bounded page envelope for ordered result sequences.

use serde::{Deserialize, Serialize};

/// A bounded slice of a larger ordered result, plus pagination metadata.
///
/// ## Invariants
///
/// - `items.len() <= page_size`
/// - `has_next` is true iff `page * page_size < total_count`
/// - `has_previous` is true iff `page > 1` and the sequence is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The records in this window, in sequence order.
    pub items: Vec<T>,
    /// 1-based page index this envelope covers.
    pub page: u32,
    /// Maximum number of items per page.
    pub page_size: u32,
    /// Total number of records in the underlying sequence.
    pub total_count: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Assemble a page envelope from an already-sliced window.
    ///
    /// `items` must be the window `[(page - 1) * page_size, page * page_size)`
    /// of the underlying sequence; the metadata is derived from `page`,
    /// `page_size`, and `total_count`.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `items` fits within `page_size`.
    #[must_use]
    pub fn assemble(items: Vec<T>, page: u32, page_size: u32, total_count: u64) -> Self {
        debug_assert!(items.len() as u64 <= u64::from(page_size));

        Self {
            has_next: u64::from(page) * u64::from(page_size) < total_count,
            has_previous: page > 1 && total_count > 0,
            items,
            page,
            page_size,
            total_count,
        }
    }

    /// The `(offset, limit)` window covered by a 1-based page index.
    #[must_use]
    pub const fn window(page: u32, page_size: u32) -> (u64, u64) {
        let offset = (page as u64 - 1) * page_size as u64;
        (offset, page_size as u64)
    }

    /// Number of the last non-empty page, or 0 for an empty sequence.
    #[must_use]
    pub const fn last_page(total_count: u64, page_size: u32) -> u64 {
        total_count.div_ceil(page_size as u64)
    }
}
