//! Handlers for the `/categories` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::permissions::{Action, Resource};
use critica_db::models::category::{Category, CreateCategory};
use critica_db::repositories::CategoryRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

/// GET /api/v1/categories?search=
pub async fn list_categories(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Page<Category>>> {
    let bounds = params.page();
    let results =
        CategoryRepo::list(&state.pool, params.term(), bounds.limit, bounds.offset).await?;
    let count = CategoryRepo::count(&state.pool, params.term()).await?;
    Ok(Json(Page::new(count, bounds, results)))
}

/// POST /api/v1/categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    auth.require(Resource::Catalog, false, Action::Create)?;
    input.validate()?;
    let category = CategoryRepo::create(&state.pool, &input).await?;
    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/{slug}
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::not_found("Category", &slug))?;
    Ok(Json(category))
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category are kept with no category.
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Catalog, false, Action::Delete)?;
    if !CategoryRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Category", &slug).into());
    }
    tracing::info!(slug = %slug, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
