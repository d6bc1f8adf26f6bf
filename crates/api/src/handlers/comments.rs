//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::permissions::{Action, Resource};
use critica_core::types::DbId;
use critica_db::models::comment::{Comment, CreateComment, UpdateComment};
use critica_db::repositories::CommentRepo;
use validator::Validate;

use super::reviews::find_review;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::Page;
use crate::state::AppState;

async fn find_comment(
    state: &AppState,
    title_id: DbId,
    review_id: DbId,
    comment_id: DbId,
) -> AppResult<Comment> {
    find_review(&state.pool, title_id, review_id).await?;
    Ok(CommentRepo::find_in_review(&state.pool, review_id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?)
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Page<Comment>>> {
    find_review(&state.pool, title_id, review_id).await?;
    let bounds = params.page();
    let results =
        CommentRepo::list_for_review(&state.pool, review_id, bounds.limit, bounds.offset).await?;
    let count = CommentRepo::count_for_review(&state.pool, review_id).await?;
    Ok(Json(Page::new(count, bounds, results)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<Comment>> {
    Ok(Json(
        find_comment(&state, title_id, review_id, comment_id).await?,
    ))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    auth.require(Resource::Authored, false, Action::Create)?;
    find_review(&state.pool, title_id, review_id).await?;
    input.validate()?;

    let comment = CommentRepo::create(&state.pool, review_id, auth.user_id, &input).await?;
    tracing::info!(
        comment_id = comment.id,
        review_id,
        user_id = auth.user_id,
        "Comment created",
    );
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn replace_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
    AppJson(input): AppJson<CreateComment>,
) -> AppResult<Json<Comment>> {
    write_comment(
        &state,
        &auth,
        (title_id, review_id, comment_id),
        UpdateComment::from(input),
    )
    .await
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(ids): AppPath<(DbId, DbId, DbId)>,
    AppJson(input): AppJson<UpdateComment>,
) -> AppResult<Json<Comment>> {
    write_comment(&state, &auth, ids, input).await
}

async fn write_comment(
    state: &AppState,
    auth: &AuthUser,
    (title_id, review_id, comment_id): (DbId, DbId, DbId),
    input: UpdateComment,
) -> AppResult<Json<Comment>> {
    let comment = find_comment(state, title_id, review_id, comment_id).await?;
    auth.require(
        Resource::Authored,
        comment.author_id == auth.user_id,
        Action::Update,
    )?;
    input.validate()?;

    let updated = CommentRepo::update(&state.pool, review_id, comment_id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
    tracing::info!(comment_id, review_id, user_id = auth.user_id, "Comment updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state, title_id, review_id, comment_id).await?;
    auth.require(
        Resource::Authored,
        comment.author_id == auth.user_id,
        Action::Delete,
    )?;
    CommentRepo::delete(&state.pool, review_id, comment_id).await?;
    tracing::info!(comment_id, review_id, user_id = auth.user_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
