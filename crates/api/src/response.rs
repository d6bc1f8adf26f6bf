//! Shared response envelope types for API handlers.

use serde::Serialize;

use crate::query::PageBounds;

/// One page of a paginated list: `{count, limit, offset, results}`.
///
/// `count` is the total number of matching rows, not the page length.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(count: i64, bounds: PageBounds, results: Vec<T>) -> Self {
        Self {
            count,
            limit: bounds.limit,
            offset: bounds.offset,
            results,
        }
    }
}
