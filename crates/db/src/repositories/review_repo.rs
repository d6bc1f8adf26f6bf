//! Repository for the `reviews` table.
//!
//! Every method is scoped to a title so a review id from another title is
//! treated as missing.

use critica_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review, UpdateReview};

/// Projection over `r` joined to the author as `u`.
const COLUMNS: &str = "r.id, r.title_id, r.author_id, r.text, u.username AS author, \
                       r.score, r.pub_date";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review by `author_id` on `title_id`.
    pub async fn create(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                INSERT INTO reviews (title_id, author_id, text, score)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {COLUMNS} FROM r JOIN users u ON u.id = r.author_id"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(author_id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_one(pool)
            .await
    }

    /// Find one review of a title.
    pub async fn find_in_title(
        pool: &PgPool,
        title_id: DbId,
        review_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews r JOIN users u ON u.id = r.author_id
             WHERE r.title_id = $1 AND r.id = $2"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(review_id)
            .fetch_optional(pool)
            .await
    }

    /// List a title's reviews, oldest first.
    pub async fn list_for_title(
        pool: &PgPool,
        title_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews r JOIN users u ON u.id = r.author_id
             WHERE r.title_id = $1
             ORDER BY r.pub_date, r.id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a title's reviews.
    pub async fn count_for_title(pool: &PgPool, title_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await
    }

    /// Whether `author_id` has already reviewed `title_id`.
    pub async fn exists_for_author(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// Update a review. Only non-`None` fields in `input` are applied; the
    /// author, title and publication date never change.
    pub async fn update(
        pool: &PgPool,
        title_id: DbId,
        review_id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                UPDATE reviews SET
                    text = COALESCE($3, text),
                    score = COALESCE($4, score)
                WHERE title_id = $1 AND id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM r JOIN users u ON u.id = r.author_id"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(title_id)
            .bind(review_id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_optional(pool)
            .await
    }

    /// Delete a review and, by cascade, its comments.
    pub async fn delete(pool: &PgPool, title_id: DbId, review_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE title_id = $1 AND id = $2")
            .bind(title_id)
            .bind(review_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
