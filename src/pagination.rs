use serde::Serialize;

use crate::domain::page::PageResult;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current + 1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Pagination counters shown under a list, plus the clickable page window.
///
/// `pages` holds `None` where the window skips a run of pages.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PaginationView {
    pub current: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub pages: Vec<Option<usize>>,
}

impl PaginationView {
    /// Builds the view, keeping `current_page` within `1..=total_pages`.
    pub fn new(current_page: usize, page_size: usize, total: usize, total_pages: usize) -> Self {
        let current_page = current_page.clamp(1, total_pages.max(1));

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            current: current_page,
            page_size,
            total,
            total_pages,
            pages,
        }
    }
}

impl<T> From<&PageResult<T>> for PaginationView {
    fn from(page: &PageResult<T>) -> Self {
        Self::new(
            page.current_page,
            page.page_size,
            page.total_count,
            page.total_pages,
        )
    }
}
