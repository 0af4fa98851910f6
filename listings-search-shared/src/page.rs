//! Paginated response shape and the page arithmetic shared by both query paths.

use serde::{Deserialize, Serialize};

/// One page of listings.
///
/// `page` is always the page that was actually served, which may differ
/// from the requested one when the request pointed past the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Build a page; `page` must already be clamped into `[1, total_pages]`.
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = total_pages(total, per_page);
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// `max(1, ceil(total / per_page))`. An empty result still has one page.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

/// Zero-based offset of the first item on `page`.
pub fn page_offset(page: u32, per_page: u32) -> usize {
    (page.saturating_sub(1) as usize).saturating_mul(per_page as usize)
}
