//! Handlers for the `/users` resource.
//!
//! Every route except `/users/me` is admin-only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::permissions::{Action, Resource};
use critica_db::models::user::{CreateUser, UpdateProfile, UpdateUser, User, UserResponse};
use critica_db::repositories::UserRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    Ok(UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username))?)
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/users?search=
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Page<UserResponse>>> {
    let bounds = params.page();
    let users = UserRepo::list(&state.pool, params.term(), bounds.limit, bounds.offset).await?;
    let count = UserRepo::count(&state.pool, params.term()).await?;
    let results = users.iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(count, bounds, results)))
}

/// POST /api/v1/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        created_by = admin.user_id,
        "User created",
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/{username}
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(input): AppJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    input.validate()?;
    let updated = UserRepo::update(&state.pool, user.id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;
    tracing::info!(user_id = updated.id, updated_by = admin.user_id, "User updated");
    Ok(Json(UserResponse::from(&updated)))
}

/// DELETE /api/v1/users/{username}
///
/// The user's reviews and comments are removed with them.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete_by_username(&state.pool, &username).await? {
        return Err(CoreError::not_found("User", &username).into());
    }
    tracing::info!(username = %username, deleted_by = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    auth.require(Resource::OwnProfile, true, Action::Read)?;
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &auth.username))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/me
///
/// Edits the caller's own profile. A submitted `role` is ignored.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateProfile>,
) -> AppResult<Json<UserResponse>> {
    auth.require(Resource::OwnProfile, true, Action::Update)?;
    input.validate()?;
    let updated = UserRepo::update(&state.pool, auth.user_id, &UpdateUser::from(input))
        .await?
        .ok_or_else(|| CoreError::not_found("User", &auth.username))?;
    tracing::info!(user_id = updated.id, "Profile updated");
    Ok(Json(UserResponse::from(&updated)))
}
