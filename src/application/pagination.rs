//! Page-number pagination for post listings.

use thiserror::Error;

/// Number of posts on one listing page.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page must be at least 1, got {0}")]
    InvalidPage(i64),
}

/// A validated, 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(i64);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(page: i64) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPage(page));
        }
        Ok(Self(page))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Row window for this page: offset = (page - 1) * PAGE_SIZE.
    pub fn window(self) -> PageWindow {
        let limit = i64::from(PAGE_SIZE);
        PageWindow {
            offset: (self.0 - 1).saturating_mul(limit),
            limit,
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// OFFSET/LIMIT pair handed to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}
