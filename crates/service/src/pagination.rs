//! Pagination utilities for service layer
//!
//! `Pagination` carries the requested page; `paginate` slices an already
//! fetched, ordered list into a `Page` and decides the navigation controls.

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Clamp to sane defaults and convert to `u64` (zero-based page index, page size)
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 5 } }
}

/// One page of an ordered list.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, after clamping
    pub page: u32,
    pub per_page: u32,
    pub total_items: usize,
    /// `ceil(total_items / per_page)`, zero for an empty list
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool { self.page > 1 }

    pub fn has_next(&self) -> bool { self.page < self.total_pages }

    pub fn prev_page(&self) -> Option<u32> { self.has_prev().then(|| self.page - 1) }

    pub fn next_page(&self) -> Option<u32> { self.has_next().then(|| self.page + 1) }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

pub fn total_pages(total_items: usize, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as usize;
    total_items.div_ceil(per_page) as u32
}

/// Slice `items` into the requested page.
///
/// Page 0 is read as page 1 and a page past the end is clamped to the last
/// page, so a stale navigation button never yields an empty body.
pub fn paginate<T>(items: Vec<T>, opts: Pagination) -> Page<T> {
    let (page_idx, per_page) = opts.normalize();
    let per_page = per_page as u32;
    let total_items = items.len();
    let total_pages = total_pages(total_items, per_page);
    let page = (page_idx as u32 + 1).min(total_pages.max(1));

    let start = ((page - 1) as usize) * per_page as usize;
    let items: Vec<T> = items.into_iter().skip(start).take(per_page as usize).collect();

    Page { items, page, per_page, total_items, total_pages }
}
