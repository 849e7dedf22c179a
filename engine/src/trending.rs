use time::{Duration, OffsetDateTime};

use crate::document::Document;
use crate::page::{paginate, Page, Paginated};

/// Default lookback for the trending window.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// Posts created inside the window, most liked first, ties broken by the
/// newer post. An empty window is an empty page, not an error.
pub fn trending(
    docs: &[Document],
    window_days: i64,
    now: OffsetDateTime,
    page: Page,
) -> Paginated<Document> {
    let cutoff = now - Duration::days(window_days.max(0));
    let mut recent: Vec<Document> = docs
        .iter()
        .filter(|doc| doc.created_at >= cutoff)
        .cloned()
        .collect();
    recent.sort_by(|a, b| {
        b.likes
            .cmp(&a.likes)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    paginate(recent, page)
}
