//! Handlers for the `/auth` resource (signup, token).

use axum::extract::State;
use axum::Json;
use critica_core::error::CoreError;
use critica_core::validation::{single_field_error, validate_username};
use critica_db::models::user::{CreateUser, User};
use critica_db::repositories::UserRepo;
use critica_mail::confirmation_mail;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::confirmation::{issue_code, verify_code};
use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    #[validate(email, length(max = 254))]
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1))]
    pub confirmation_code: String,
}

/// Response for `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register (or re-register) a username/email pair and mail a confirmation
/// code. Repeating the request with the same pair re-sends a fresh code.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<Json<SignupRequest>> {
    input.validate()?;

    let user = find_or_create_user(&state, &input).await?;

    let code = issue_code(&state.config.confirmation, &user);
    state
        .mailer
        .send(confirmation_mail(&user.email, &user.username, &code))
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Confirmation code sent");
    Ok(Json(input))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for an access token. A successful exchange
/// stamps `last_login_at`, which invalidates every outstanding code.
pub async fn token(
    State(state): State<AppState>,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    input.validate()?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    if !verify_code(&state.config.confirmation, &user, &input.confirmation_code) {
        return Err(single_field_error(
            "confirmation_code",
            "invalid_code",
            "Invalid or expired confirmation code",
        )
        .into());
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let role = user.role()?;
    let token = generate_access_token(user.id, role.as_str(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");
    Ok(Json(TokenResponse { token }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reuse the account owning exactly this username and email, or create one.
///
/// Either value being held by a different account is a field error.
async fn find_or_create_user(state: &AppState, input: &SignupRequest) -> AppResult<User> {
    let by_username = UserRepo::find_by_username(&state.pool, &input.username).await?;
    if let Some(user) = by_username {
        if user.email == input.email {
            return Ok(user);
        }
        return Err(single_field_error(
            "username",
            "username_taken",
            "A user with that username already exists",
        )
        .into());
    }

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(single_field_error(
            "email",
            "email_taken",
            "A user with that email already exists",
        )
        .into());
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser::with_identity(&input.username, &input.email),
    )
    .await?;
    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    Ok(user)
}
