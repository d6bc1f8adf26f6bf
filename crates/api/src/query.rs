//! Shared query parameter types for API handlers.
//!
//! Values are clamped here via `clamp_limit` / `clamp_offset` before they
//! reach the repository layer.

use critica_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use critica_db::models::title::TitleFilter;
use serde::Deserialize;

/// Clamped `(limit, offset)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub limit: i64,
    pub offset: i64,
}

impl PageBounds {
    fn clamp(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            offset: clamp_offset(offset),
        }
    }
}

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> PageBounds {
        PageBounds::clamp(self.limit, self.offset)
    }
}

/// `?search=&limit=&offset=` for users, categories and genres.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    /// The search term, with blank input treated as absent.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn page(&self) -> PageBounds {
        PageBounds::clamp(self.limit, self.offset)
    }
}

/// `GET /titles` filters plus pagination.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListParams {
    pub name: Option<String>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TitleListParams {
    pub fn filter(&self) -> TitleFilter {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        TitleFilter {
            name: non_blank(&self.name),
            genre: non_blank(&self.genre),
            category: non_blank(&self.category),
            year: self.year,
        }
    }

    pub fn page(&self) -> PageBounds {
        PageBounds::clamp(self.limit, self.offset)
    }
}
