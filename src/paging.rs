use std::fmt;

use serde::Serialize;

/// Page arithmetic for paged listings.
///
/// An empty listing, or a page index past the end, collapses to the first page with nothing
/// to fetch:
/// ```rust
/// use sql_mapper::prelude::*;
///
/// let page = Page::new(25, 3, 10);
/// assert_eq!((page.page_count, page.offset, page.limit), (3, 20, 10));
/// assert!(!page.has_next && page.has_previous);
///
/// let empty = Page::with_count(0);
/// assert_eq!((empty.offset, empty.limit, empty.page_index), (0, 0, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub item_count: u64,
    pub page_index: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub offset: u64,
    pub limit: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    /// A `page_size` of zero is treated as one item per page.
    #[must_use]
    pub fn new(item_count: u64, page_index: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let page_count = item_count.div_ceil(page_size);
        let (page_index, offset, limit) =
            if item_count == 0 || page_index > page_count || page_index == 0 {
                (1, 0, 0)
            } else {
                (page_index, page_size * (page_index - 1), page_size)
            };

        Self {
            item_count,
            page_index,
            page_size,
            page_count,
            offset,
            limit,
            has_next: page_index < page_count,
            has_previous: page_index > 1,
        }
    }

    /// First page, ten items per page.
    #[must_use]
    pub fn with_count(item_count: u64) -> Self {
        Self::new(item_count, 1, 10)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "item_count: {}, page_count: {}, page_index: {}, page_size: {}, offset: {}, limit: {}",
            self.item_count,
            self.page_count,
            self.page_index,
            self.page_size,
            self.offset,
            self.limit
        )
    }
}
