//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use critica_core::error::CoreError;
use critica_core::permissions::{authorize, Access, Action, Resource};
use critica_core::roles::Role;
use critica_core::types::DbId;
use critica_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The token only proves identity; the role is read from the database on
/// every request so role changes apply immediately.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Run the access policy for this caller.
    pub fn require(&self, resource: Resource, is_owner: bool, action: Action) -> Result<(), AppError> {
        access_result(authorize(Some(self.role), resource, is_owner, action))
    }
}

/// Turn a policy decision into the matching error.
pub fn access_result(access: Access) -> Result<(), AppError> {
    match access {
        Access::Granted => Ok(()),
        Access::Unauthenticated => Err(AppError::Core(CoreError::Unauthorized(
            "Authentication credentials were not provided".into(),
        ))),
        Access::Forbidden => Err(AppError::Core(CoreError::Forbidden(
            "You do not have permission to perform this action".into(),
        ))),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
            })?;

        Ok(AuthUser {
            user_id: user.id,
            role: user.role()?,
            username: user.username,
        })
    }
}
