//! Handlers for the `/titles` resource.
//!
//! Writes reference the category and genres by slug; both are resolved to
//! ids here and unknown slugs are reported against the offending field.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::permissions::{Action, Resource};
use critica_core::types::DbId;
use critica_core::validation::{current_year, single_field_error};
use critica_db::models::title::{CreateTitle, NewTitle, TitleChanges, TitleResponse, UpdateTitle};
use critica_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};
use critica_db::DbPool;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::TitleListParams;
use crate::response::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

async fn resolve_category(pool: &DbPool, slug: Option<&str>) -> AppResult<Option<DbId>> {
    let Some(slug) = slug else {
        return Ok(None);
    };
    let category = CategoryRepo::find_by_slug(pool, slug).await?.ok_or_else(|| {
        single_field_error(
            "category",
            "unknown_slug",
            format!("Category with slug '{slug}' does not exist"),
        )
    })?;
    Ok(Some(category.id))
}

async fn resolve_genres(pool: &DbPool, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
    let unique: Vec<String> = wanted.iter().map(|s| s.to_string()).collect();
    let found = GenreRepo::find_by_slugs(pool, &unique).await?;

    if let Some(missing) = wanted
        .iter()
        .find(|slug| !found.iter().any(|g| g.slug == **slug))
    {
        return Err(single_field_error(
            "genre",
            "unknown_slug",
            format!("Genre with slug '{missing}' does not exist"),
        )
        .into());
    }
    Ok(found.into_iter().map(|g| g.id).collect())
}

async fn resolve_changes(pool: &DbPool, input: UpdateTitle) -> AppResult<TitleChanges> {
    let category_id = match &input.category {
        Some(slug) => Some(resolve_category(pool, slug.as_deref()).await?),
        None => None,
    };
    let genre_ids = match &input.genre {
        Some(slugs) => Some(resolve_genres(pool, slugs).await?),
        None => None,
    };
    Ok(TitleChanges {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
        genre_ids,
    })
}

/// 404 unless the title exists.
pub(crate) async fn ensure_title(pool: &DbPool, title_id: DbId) -> AppResult<()> {
    if TitleRepo::exists(pool, title_id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("Title", title_id).into())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles?name=&genre=&category=&year=
pub async fn list_titles(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TitleListParams>,
) -> AppResult<Json<Page<TitleResponse>>> {
    let filter = params.filter();
    let bounds = params.page();
    let results = TitleRepo::list(&state.pool, &filter, bounds.limit, bounds.offset).await?;
    let count = TitleRepo::count(&state.pool, &filter).await?;
    Ok(Json(Page::new(count, bounds, results)))
}

/// GET /api/v1/titles/{title_id}
pub async fn get_title(
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
) -> AppResult<Json<TitleResponse>> {
    let title = TitleRepo::find_by_id(&state.pool, title_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", title_id))?;
    Ok(Json(title))
}

/// POST /api/v1/titles
pub async fn create_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTitle>,
) -> AppResult<(StatusCode, Json<TitleResponse>)> {
    auth.require(Resource::Catalog, false, Action::Create)?;
    input.validate_at(current_year())?;

    let new_title = NewTitle {
        category_id: resolve_category(&state.pool, input.category.as_deref()).await?,
        genre_ids: resolve_genres(&state.pool, &input.genre).await?,
        name: input.name,
        year: input.year,
        description: input.description,
    };
    let title = TitleRepo::create(&state.pool, &new_title).await?;
    tracing::info!(title_id = title.id, name = %title.name, "Title created");
    Ok((StatusCode::CREATED, Json(title)))
}

/// PUT /api/v1/titles/{title_id}
///
/// Full replacement: omitted optional fields are reset.
pub async fn replace_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateTitle>,
) -> AppResult<Json<TitleResponse>> {
    auth.require(Resource::Catalog, false, Action::Update)?;
    ensure_title(&state.pool, title_id).await?;
    input.validate_at(current_year())?;
    apply_update(&state, title_id, UpdateTitle::from(input)).await
}

/// PATCH /api/v1/titles/{title_id}
pub async fn update_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTitle>,
) -> AppResult<Json<TitleResponse>> {
    auth.require(Resource::Catalog, false, Action::Update)?;
    ensure_title(&state.pool, title_id).await?;
    input.validate_at(current_year())?;
    apply_update(&state, title_id, input).await
}

async fn apply_update(
    state: &AppState,
    title_id: DbId,
    input: UpdateTitle,
) -> AppResult<Json<TitleResponse>> {
    let changes = resolve_changes(&state.pool, input).await?;
    let title = TitleRepo::update(&state.pool, title_id, &changes)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", title_id))?;
    tracing::info!(title_id, "Title updated");
    Ok(Json(title))
}

/// DELETE /api/v1/titles/{title_id}
///
/// Reviews of the title and their comments are removed with it.
pub async fn delete_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Catalog, false, Action::Delete)?;
    if !TitleRepo::delete(&state.pool, title_id).await? {
        return Err(CoreError::not_found("Title", title_id).into());
    }
    tracing::info!(title_id, "Title deleted");
    Ok(StatusCode::NO_CONTENT)
}
