//! Schedule search and paging.

mod pager;
mod query;

pub use pager::{PAGE_SIZE, has_next, has_prev, is_valid_page, page, page_bounds, total_pages};
pub use query::{ScheduleQuery, ScheduleSearch};
