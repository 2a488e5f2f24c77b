//! Page-at-a-time listing.

use serde::{Deserialize, Serialize};

/// Which page of a listing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Maximum number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Creates a request, clamping page and limit to at least 1.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of items skipped before this page starts.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.limit.max(1) as usize
    }

    /// Cuts this page out of an already ordered listing.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let limit = self.limit.max(1) as usize;
        let items = items.into_iter().skip(self.offset()).take(limit).collect();

        Page {
            items,
            total,
            total_pages: total.div_ceil(limit),
            current_page: self.page.max(1),
        }
    }
}

/// One page of a listing plus the totals needed to render page controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: usize,
    /// Total number of pages (0 for an empty listing).
    pub total_pages: usize,
    /// The page returned.
    pub current_page: u32,
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
