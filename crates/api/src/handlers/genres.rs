//! Handlers for the `/genres` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::permissions::{Action, Resource};
use critica_db::models::genre::{CreateGenre, Genre};
use critica_db::repositories::GenreRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/genres?search=
pub async fn list_genres(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Page<Genre>>> {
    let bounds = params.page();
    let results = GenreRepo::list(&state.pool, params.term(), bounds.limit, bounds.offset).await?;
    let count = GenreRepo::count(&state.pool, params.term()).await?;
    Ok(Json(Page::new(count, bounds, results)))
}

/// POST /api/v1/genres
pub async fn create_genre(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    auth.require(Resource::Catalog, false, Action::Create)?;
    input.validate()?;
    let genre = GenreRepo::create(&state.pool, &input).await?;
    tracing::info!(genre_id = genre.id, slug = %genre.slug, "Genre created");
    Ok((StatusCode::CREATED, Json(genre)))
}

/// GET /api/v1/genres/{slug}
pub async fn get_genre(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<Genre>> {
    let genre = GenreRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::not_found("Genre", &slug))?;
    Ok(Json(genre))
}

/// DELETE /api/v1/genres/{slug}
pub async fn delete_genre(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Catalog, false, Action::Delete)?;
    if !GenreRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Genre", &slug).into());
    }
    tracing::info!(slug = %slug, "Genre deleted");
    Ok(StatusCode::NO_CONTENT)
}
