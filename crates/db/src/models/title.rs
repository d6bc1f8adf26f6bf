//! Title entity model and DTOs.
//!
//! Titles are read with their category, genres and computed rating nested
//! in ([`TitleResponse`]) and written with category/genres referenced by
//! slug ([`CreateTitle`], [`UpdateTitle`]).

use critica_core::rating::compute_rating;
use critica_core::types::DbId;
use critica_core::validation::{merge_field_error, validate_release_year};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::category::Category;
use super::genre::Genre;
use super::present;

/// A title row joined with its category and review aggregates.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub review_count: i64,
    pub score_sum: Option<i64>,
}

impl TitleRow {
    /// Assemble the read representation with the given genres.
    pub fn into_response(self, genre: Vec<Genre>) -> TitleResponse {
        let rating = compute_rating(self.score_sum.unwrap_or(0), self.review_count);
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };
        TitleResponse {
            id: self.id,
            name: self.name,
            year: self.year,
            rating,
            description: self.description,
            genre,
            category,
        }
    }
}

/// Read representation of a title.
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    /// Mean review score rounded to one decimal; `null` without reviews.
    pub rating: Option<f64>,
    pub description: String,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
}

/// Query parameters for `GET /titles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFilter {
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

/// DTO for creating (POST) or fully replacing (PUT) a title.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTitle {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub description: String,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateTitle {
    /// Field validation plus the release-year bound for `current_year`.
    pub fn validate_at(&self, current_year: i32) -> Result<(), ValidationErrors> {
        merge_field_error(
            self.validate(),
            "year",
            validate_release_year(self.year, current_year),
        )
    }
}

/// DTO for a partial (PATCH) title update.
///
/// `category` distinguishes "absent" (`None`, keep) from `null`
/// (`Some(None)`, clear).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTitle {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
}

impl UpdateTitle {
    /// Field validation plus the release-year bound when a year is given.
    pub fn validate_at(&self, current_year: i32) -> Result<(), ValidationErrors> {
        let year_check = match self.year {
            Some(year) => validate_release_year(year, current_year),
            None => Ok(()),
        };
        merge_field_error(self.validate(), "year", year_check)
    }
}

impl From<CreateTitle> for UpdateTitle {
    /// A full replacement is a patch that sets every field.
    fn from(input: CreateTitle) -> Self {
        Self {
            name: Some(input.name),
            year: Some(input.year),
            description: Some(input.description),
            genre: Some(input.genre),
            category: Some(input.category),
        }
    }
}

/// Insert payload with category and genres already resolved to ids.
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// Update payload with references resolved to ids. `None` keeps a column.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<Option<DbId>>,
    pub genre_ids: Option<Vec<DbId>>,
}
