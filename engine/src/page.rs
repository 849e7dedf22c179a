use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Offset/limit page request; `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Page floored to 1, limit clamped to `1..=MAX_PAGE_LIMIT`.
    pub(crate) fn clamped(self) -> (usize, usize) {
        (self.page.max(1), self.limit.max(1).min(MAX_PAGE_LIMIT))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

/// One page of an already-sorted result set.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(rename = "current_page")]
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Slice a sorted result set. Pages past the end come back empty with the
/// totals intact; an empty input is a page with `total` 0, not an error.
pub fn paginate<T>(items: Vec<T>, page: Page) -> Paginated<T> {
    let (page_no, limit) = page.clamped();
    let total = items.len();
    let total_pages = (total + limit - 1) / limit;
    let start = (page_no - 1).saturating_mul(limit);
    let items = items.into_iter().skip(start).take(limit).collect();
    Paginated { items, page: page_no, total_pages, total }
}
