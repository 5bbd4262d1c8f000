use std::ops::RangeInclusive;

/// Number of page links shown around the current page.
pub const WINDOW: u64 = 5;

/// Where we are in a paginated list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based
    pub current: u64,
    pub total_pages: u64,
    /// Total number of rows
    pub total: u64,
}

impl Pagination {
    pub fn new(current: u32, total: u64, page_size: u64) -> Self {
        Self {
            current: current.max(1).into(),
            total_pages: page_count(total, page_size),
            total,
        }
    }

    /// Pagination controls are pointless for a single page.
    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }

    pub fn is_first(&self) -> bool {
        self.current <= 1
    }

    pub fn is_last(&self) -> bool {
        self.current >= self.total_pages
    }

    /// The pages to link to directly: [`WINDOW`] pages centered on the current one when possible.
    pub fn window(&self) -> RangeInclusive<u64> {
        let mut start = self.current.saturating_sub(WINDOW / 2).max(1);
        let end = self.total_pages.min(start + WINDOW - 1);
        if (end + 1).saturating_sub(start) < WINDOW {
            start = (end + 1).saturating_sub(WINDOW).max(1);
        }
        start..=end
    }
}

/// Number of pages needed to show `total` rows, `page_size` at a time.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}
