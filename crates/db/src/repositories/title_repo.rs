//! Repository for the `titles` table and its `title_genres` links.
//!
//! Reads join the category and aggregate review scores in the same query,
//! so the rating always reflects the current set of reviews.

use std::collections::HashMap;

use critica_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use super::contains_pattern;
use crate::models::genre::{Genre, TitleGenre};
use crate::models::title::{NewTitle, TitleChanges, TitleFilter, TitleResponse, TitleRow};

/// Select list and joins producing a [`TitleRow`].
const SELECT_ROWS: &str = "SELECT t.id, t.name, t.year, t.description, t.category_id,
            c.name AS category_name, c.slug AS category_slug,
            COUNT(r.id) AS review_count, SUM(r.score)::BIGINT AS score_sum
     FROM titles t
     LEFT JOIN categories c ON c.id = t.category_id
     LEFT JOIN reviews r ON r.title_id = t.id";

/// Filter shared by list and count. Binds `$1..$4` from [`TitleFilter`].
const FILTER: &str = "WHERE ($1::text IS NULL OR t.name ILIKE $1 ESCAPE '\\')
       AND ($2::text IS NULL OR EXISTS (
             SELECT 1 FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id = t.id AND g.slug = $2))
       AND ($3::text IS NULL OR c.slug = $3)
       AND ($4::int IS NULL OR t.year = $4)";

/// Provides CRUD operations for titles.
pub struct TitleRepo;

impl TitleRepo {
    /// List titles matching `filter`, ordered by name.
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TitleResponse>, sqlx::Error> {
        let query = format!(
            "{SELECT_ROWS}
             {FILTER}
             GROUP BY t.id, c.id
             ORDER BY t.name, t.id
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.genre.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.year)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Self::attach_genres(pool, rows).await
    }

    /// Count titles matching `filter`.
    pub async fn count(pool: &PgPool, filter: &TitleFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM titles t
             LEFT JOIN categories c ON c.id = t.category_id
             {FILTER}"
        );
        sqlx::query_scalar(&query)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.genre.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.year)
            .fetch_one(pool)
            .await
    }

    /// Find a title by ID with its category, genres and rating.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TitleResponse>, sqlx::Error> {
        let query = format!("{SELECT_ROWS} WHERE t.id = $1 GROUP BY t.id, c.id");
        let Some(row) = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(Self::attach_genres(pool, vec![row]).await?.pop())
    }

    /// Whether a title with the given ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &NewTitle) -> Result<TitleResponse, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;
        Self::link_genres(&mut tx, id, &input.genre_ids).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply `changes` to a title. A present `genre_ids` replaces every link.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &TitleChanges,
    ) -> Result<Option<TitleResponse>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = CASE WHEN $5 THEN $6 ELSE category_id END
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.year)
        .bind(&changes.description)
        .bind(changes.category_id.is_some())
        .bind(changes.category_id.flatten())
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(genre_ids) = &changes.genre_ids {
            sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::link_genres(&mut tx, id, genre_ids).await?;
        }
        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    /// Delete a title. Its reviews, their comments and genre links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn link_genres(
        conn: &mut PgConnection,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(title_id)
        .bind(genre_ids)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Load genres for all `rows` in one query and assemble responses.
    async fn attach_genres(
        pool: &PgPool,
        rows: Vec<TitleRow>,
    ) -> Result<Vec<TitleResponse>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let links = sqlx::query_as::<_, TitleGenre>(
            "SELECT tg.title_id, g.id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id = ANY($1)
             ORDER BY g.name",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut by_title: HashMap<DbId, Vec<Genre>> = HashMap::new();
        for link in links {
            by_title.entry(link.title_id).or_default().push(link.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = by_title.remove(&row.id).unwrap_or_default();
                row.into_response(genres)
            })
            .collect())
    }
}
