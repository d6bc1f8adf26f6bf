pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                        register, mail code (public)
/// /auth/token                                         code -> JWT (public)
///
/// /users                                              list, create (admin only)
/// /users/me                                           get, patch own profile (auth)
/// /users/{username}                                   get, patch, delete (admin only)
///
/// /categories                                         list, create
/// /categories/{slug}                                  get, delete
/// /genres                                             list, create
/// /genres/{slug}                                      get, delete
///
/// /titles                                             list (filtered), create
/// /titles/{title_id}                                  get, put, patch, delete
/// /titles/{title_id}/reviews                          list, create
/// /titles/{title_id}/reviews/{review_id}              get, put, patch, delete
/// /titles/{title_id}/reviews/{review_id}/comments     list, create
/// /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///                                                     get, put, patch, delete
/// ```
///
/// Reads of catalog and authored content are public; every write needs a
/// Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
}
