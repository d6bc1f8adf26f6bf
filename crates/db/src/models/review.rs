//! Review entity model and DTOs.

use critica_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A review joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub title_id: DbId,
    #[serde(skip_serializing)]
    pub author_id: DbId,
    pub text: String,
    /// Author username.
    pub author: String,
    pub score: i16,
    pub pub_date: Timestamp,
}

/// DTO for creating (POST) or replacing (PUT) a review.
///
/// Title and author come from the path and the token, never from the body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(range(min = 1, max = 10))]
    pub score: i32,
}

/// DTO for a partial (PATCH) review update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReview {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub score: Option<i32>,
}

impl From<CreateReview> for UpdateReview {
    fn from(input: CreateReview) -> Self {
        Self {
            text: Some(input.text),
            score: Some(input.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive() {
        for score in [1, 10] {
            let input = CreateReview {
                text: "ok".into(),
                score,
            };
            assert!(input.validate().is_ok(), "score {score} should be accepted");
        }
    }

    #[test]
    fn score_outside_bounds_is_rejected() {
        for score in [0, 11, -1] {
            let input = CreateReview {
                text: "ok".into(),
                score,
            };
            let errors = input.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("score"));
        }
    }

    #[test]
    fn client_supplied_author_is_ignored() {
        let input: CreateReview =
            serde_json::from_str(r#"{"text":"t","score":5,"author":"someone-else"}"#).unwrap();
        assert_eq!(input.score, 5);
    }

    #[test]
    fn huge_score_is_a_score_error() {
        let input: CreateReview =
            serde_json::from_str(r#"{"text":"t","score":40000}"#).unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("score"));
    }

    #[test]
    fn patch_validates_only_present_fields() {
        assert!(UpdateReview::default().validate().is_ok());
        let patch = UpdateReview {
            text: None,
            score: Some(42),
        };
        assert!(patch.validate().is_err());
    }
}
