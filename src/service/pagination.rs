//! Limit/page clamping for list requests.

/// Largest page a single request can ask for.
pub const MAX_PAGE_SIZE: i64 = 30;
pub const DEFAULT_LIMIT: i64 = MAX_PAGE_SIZE;
pub const DEFAULT_PAGE: i64 = 1;

/// A clamped `LIMIT`/`OFFSET` pair, always safe to hand to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Negative limits become 0, limits above [`MAX_PAGE_SIZE`] become the cap,
    /// pages below 1 become 1. Offset is `(page - 1) * limit`.
    pub fn clamp(limit: i64, page: i64) -> Self {
        let limit = limit.clamp(0, MAX_PAGE_SIZE);
        let page = page.max(1);
        PageWindow {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::clamp(DEFAULT_LIMIT, DEFAULT_PAGE)
    }
}
