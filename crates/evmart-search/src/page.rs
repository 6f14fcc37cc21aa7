use serde::Serialize;

/// One window over a filtered result set.
///
/// `next_offset` is the only state a caller needs to keep between pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub has_more: bool,
    pub total: usize,
    pub next_offset: Option<usize>,
}

/// Slices `records[offset..offset + page_size]`, clamping `offset` to the
/// collection length.
#[must_use]
pub fn paginate<T: Clone>(records: &[T], offset: usize, page_size: usize) -> Page<T> {
    let total = records.len();
    let offset = offset.min(total);
    let end = offset.saturating_add(page_size).min(total);
    let has_more = offset.saturating_add(page_size) < total;

    Page {
        items: records[offset..end].to_vec(),
        offset,
        has_more,
        total,
        next_offset: has_more.then_some(end),
    }
}
