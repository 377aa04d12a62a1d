//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list endpoints.
pub const MAX_LIMIT: i64 = 100;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Limit clamped to `1..=MAX_LIMIT`, defaulting to [`DEFAULT_LIMIT`].
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
