//! Handlers for `/titles/{title_id}/reviews`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::permissions::{Action, Resource};
use critica_core::types::DbId;
use critica_core::validation::{check_duplicate_review, ReviewWrite};
use critica_db::models::review::{CreateReview, Review, UpdateReview};
use critica_db::repositories::ReviewRepo;
use critica_db::DbPool;
use validator::Validate;

use super::titles::ensure_title;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::Page;
use crate::state::AppState;

/// Resolve a review within its title, 404 if either is missing.
pub(crate) async fn find_review(pool: &DbPool, title_id: DbId, review_id: DbId) -> AppResult<Review> {
    ensure_title(pool, title_id).await?;
    Ok(ReviewRepo::find_in_title(pool, title_id, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?)
}

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Page<Review>>> {
    ensure_title(&state.pool, title_id).await?;
    let bounds = params.page();
    let results =
        ReviewRepo::list_for_title(&state.pool, title_id, bounds.limit, bounds.offset).await?;
    let count = ReviewRepo::count_for_title(&state.pool, title_id).await?;
    Ok(Json(Page::new(count, bounds, results)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(find_review(&state.pool, title_id, review_id).await?))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// The caller becomes the author. One review per author per title.
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    auth.require(Resource::Authored, false, Action::Create)?;
    ensure_title(&state.pool, title_id).await?;
    input.validate()?;

    let already_reviewed =
        ReviewRepo::exists_for_author(&state.pool, title_id, auth.user_id).await?;
    check_duplicate_review(already_reviewed, ReviewWrite::Create)?;

    let review = ReviewRepo::create(&state.pool, title_id, auth.user_id, &input).await?;
    tracing::info!(
        review_id = review.id,
        title_id,
        user_id = auth.user_id,
        score = review.score,
        "Review created",
    );
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Full replacement of `text` and `score`.
pub async fn replace_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CreateReview>,
) -> AppResult<Json<Review>> {
    write_review(
        &state,
        &auth,
        title_id,
        review_id,
        UpdateReview::from(input),
        ReviewWrite::Replace,
    )
    .await
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateReview>,
) -> AppResult<Json<Review>> {
    write_review(&state, &auth, title_id, review_id, input, ReviewWrite::Patch).await
}

async fn write_review(
    state: &AppState,
    auth: &AuthUser,
    title_id: DbId,
    review_id: DbId,
    input: UpdateReview,
    mode: ReviewWrite,
) -> AppResult<Json<Review>> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    auth.require(
        Resource::Authored,
        review.author_id == auth.user_id,
        Action::Update,
    )?;
    input.validate()?;

    let updated = ReviewRepo::update(&state.pool, title_id, review_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?;
    tracing::info!(
        review_id,
        title_id,
        user_id = auth.user_id,
        mode = ?mode,
        "Review updated",
    );
    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    auth.require(
        Resource::Authored,
        review.author_id == auth.user_id,
        Action::Delete,
    )?;
    ReviewRepo::delete(&state.pool, title_id, review_id).await?;
    tracing::info!(review_id, title_id, user_id = auth.user_id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}
