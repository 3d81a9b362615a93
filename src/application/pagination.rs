//! Offset pagination shared by admin listings.

use serde::Serialize;
use thiserror::Error;

pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Invalid limit")]
    InvalidLimit,
    #[error("Invalid offset")]
    InvalidOffset,
}

/// A validated `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetRequest {
    limit: i64,
    offset: i64,
}

impl OffsetRequest {
    pub fn new(limit: i64, offset: i64) -> Result<Self, PaginationError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(PaginationError::InvalidLimit);
        }
        if offset < 0 {
            return Err(PaginationError::InvalidOffset);
        }
        Ok(Self { limit, offset })
    }

    /// Parse raw query-string values. Both are required.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, PaginationError> {
        let limit = limit
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(PaginationError::InvalidLimit)?;
        let offset = offset
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(PaginationError::InvalidOffset)?;
        Self::new(limit, offset)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

/// One page of results plus the total number of rows matching the filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetPage<T> {
    pub results: Vec<T>,
    pub count: i64,
}

impl<T> OffsetPage<T> {
    pub fn new(results: Vec<T>, count: i64) -> Self {
        Self { results, count }
    }
}
