//! Comment entity model and DTOs.

use critica_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A comment joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub review_id: DbId,
    #[serde(skip_serializing)]
    pub author_id: DbId,
    pub text: String,
    /// Author username.
    pub author: String,
    pub pub_date: Timestamp,
}

/// DTO for creating (POST) or replacing (PUT) a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1))]
    pub text: String,
}

/// DTO for a partial (PATCH) comment update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateComment {
    #[validate(length(min = 1))]
    pub text: Option<String>,
}

impl From<CreateComment> for UpdateComment {
    fn from(input: CreateComment) -> Self {
        Self {
            text: Some(input.text),
        }
    }
}
