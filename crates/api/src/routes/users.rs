//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// `/me` is matched before `/{username}`; the username `me` is reserved.
///
/// ```text
/// GET, POST           /              -> list_users, create_user
/// GET, PATCH          /me            -> get_me, update_me
/// GET, PATCH, DELETE  /{username}    -> get_user, update_user, delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/me", get(users::get_me).patch(users::update_me))
        .route(
            "/{username}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
