//! Cursor-based pagination.

/// One page of a bounded listing.
///
/// `next_cursor` is `Some` when more items remain; passing it back to the
/// producing call resumes strictly after the last item of this page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items in this page, in the listing's order.
    pub items: Vec<T>,
    /// Cursor for the next page, if any.
    pub next_cursor: Option<String>,
}
