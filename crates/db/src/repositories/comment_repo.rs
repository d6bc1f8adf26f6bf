//! Repository for the `comments` table.
//!
//! Callers resolve the parent review within its title first; methods here
//! are scoped by review id only.

use critica_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment, UpdateComment};

const COLUMNS: &str = "c.id, c.review_id, c.author_id, c.text, u.username AS author, c.pub_date";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment by `author_id` on `review_id`.
    pub async fn create(
        pool: &PgPool,
        review_id: DbId,
        author_id: DbId,
        input: &CreateComment,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(author_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Find one comment of a review.
    pub async fn find_in_review(
        pool: &PgPool,
        review_id: DbId,
        comment_id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1 AND c.id = $2"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(comment_id)
            .fetch_optional(pool)
            .await
    }

    /// List a review's comments, oldest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1
             ORDER BY c.pub_date, c.id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a review's comments.
    pub async fn count_for_review(pool: &PgPool, review_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(pool)
            .await
    }

    /// Update a comment's text.
    pub async fn update(
        pool: &PgPool,
        review_id: DbId,
        comment_id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                UPDATE comments SET text = COALESCE($3, text)
                WHERE review_id = $1 AND id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(review_id)
            .bind(comment_id)
            .bind(&input.text)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment.
    pub async fn delete(pool: &PgPool, review_id: DbId, comment_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE review_id = $1 AND id = $2")
            .bind(review_id)
            .bind(comment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
