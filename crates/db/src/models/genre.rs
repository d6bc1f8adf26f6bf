//! Genre entity model and DTOs.

use critica_core::types::DbId;
use critica_core::validation::validate_slug;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `genres` table. Serialized as `{name, slug}`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Genre {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// A genre joined with the title it is attached to.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

impl From<TitleGenre> for Genre {
    fn from(row: TitleGenre) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

/// DTO for creating a genre.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGenre {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_genre_passes() {
        let input = CreateGenre {
            name: "Drama".into(),
            slug: "drama".into(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let input = CreateGenre {
            name: "x".repeat(101),
            slug: "x".into(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
