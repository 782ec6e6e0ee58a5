//! Page/page-size pair for listing endpoints.

use serde::{Deserialize, Serialize};

/// Validated pagination window. Non-positive inputs fall back to the
/// defaults instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginacion {
    page: i64,
    page_size: i64,
}

impl Paginacion {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_PAGE_SIZE: i64 = 10;

    /// Build a window from raw query values, clamping `< 1` to the defaults.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => Self::DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 => s,
            _ => Self::DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip. Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Alias for `page_size`, named for SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for Paginacion {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let p = Paginacion::new(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn non_positive_values_clamp_to_defaults() {
        for (page, size) in [(0, 0), (-1, -5), (i64::MIN, 0), (0, 25), (3, -1)] {
            let p = Paginacion::new(Some(page), Some(size));
            assert!(p.page() >= 1, "page {page} not clamped");
            assert!(p.page_size() >= 1, "size {size} not clamped");
        }
        let p = Paginacion::new(Some(0), Some(25));
        assert_eq!((p.page(), p.page_size()), (1, 25));
        let p = Paginacion::new(Some(3), Some(-1));
        assert_eq!((p.page(), p.page_size()), (3, 10));
    }

    #[test]
    fn offset_is_zero_based() {
        let p = Paginacion::new(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn offset_saturates() {
        let p = Paginacion::new(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(p.offset(), i64::MAX);
    }
}
