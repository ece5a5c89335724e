use serde::Serialize;

/// Page links shown on either side of the current page
pub const DEFAULT_WINDOW_OFFSET: u64 = 3;

/// Page numbers to link to, centered on `current` and clamped to
/// `[start_page, max_page]`
///
/// The result always spans `min(page count, 2 * offset + 1)` pages.
pub fn compute_window(current: u64, max_page: u64, start_page: u64, offset: u64) -> Vec<u64> {
    let width = offset * 2 + 1;

    if max_page + 1 <= width + start_page {
        return (start_page..=max_page).collect();
    }

    if current < start_page + offset {
        return (start_page..start_page + width).collect();
    }

    if current + offset > max_page {
        return (max_page + 1 - width..=max_page).collect();
    }

    (current - offset..=current + offset).collect()
}

/// Pagination links for the page view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub pages: Vec<u64>,
    pub current: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageWindow {
    pub fn new(current: u64, max_page: u64) -> Self {
        Self {
            pages: compute_window(current, max_page, 1, DEFAULT_WINDOW_OFFSET),
            current,
            has_previous: current > 1,
            has_next: current < max_page,
        }
    }

    /// Window for a landing page with no search yet
    pub fn empty() -> Self {
        Self {
            pages: Vec::new(),
            current: 1,
            has_previous: false,
            has_next: false,
        }
    }
}

/// Last reachable page: bounded by the paging depth ceiling and by the hit count
pub fn max_page(total: u64, page_size: u64, max_depth: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    let by_depth = max_depth / page_size;
    let by_total = total.div_ceil(page_size);
    by_depth.min(by_total)
}
