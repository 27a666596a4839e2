//! Presentation paging over schedule results.

use std::ops::Range;

/// Options shown per schedule page.
pub const PAGE_SIZE: usize = 5;

/// Number of pages needed for `count` items. Zero items still render one
/// (empty) page.
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Index range of page `page` within `count` items. Pages past the end are
/// empty.
pub fn page_bounds(count: usize, page: usize) -> Range<usize> {
    let start = page.saturating_mul(PAGE_SIZE).min(count);
    let end = start.saturating_add(PAGE_SIZE).min(count);
    start..end
}

/// The items on page `page`.
pub fn page<T>(items: &[T], page: usize) -> &[T] {
    &items[page_bounds(items.len(), page)]
}

pub fn has_prev(page: usize) -> bool {
    page > 0
}

pub fn has_next(count: usize, page: usize) -> bool {
    page + 1 < total_pages(count)
}

/// Whether `page` is a page that has items.
pub fn is_valid_page(count: usize, page: usize) -> bool {
    page < count.div_ceil(PAGE_SIZE)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Page count matches ceil(n / PAGE_SIZE) for non-empty results
        #[test]
        fn page_count(n in 1usize..500) {
            prop_assert_eq!(total_pages(n), n.div_ceil(PAGE_SIZE));
        }

        /// Concatenating all pages in order yields each item exactly once
        #[test]
        fn pages_partition_results(items in prop::collection::vec(any::<u32>(), 0..60)) {
            let joined: Vec<u32> = (0..total_pages(items.len()))
                .flat_map(|p| page(&items, p).iter().copied())
                .collect();
            prop_assert_eq!(joined, items);
        }

        /// No page holds more than PAGE_SIZE items
        #[test]
        fn pages_are_bounded(n in 0usize..200, p in 0usize..50) {
            prop_assert!(page_bounds(n, p).len() <= PAGE_SIZE);
        }
    }
}
