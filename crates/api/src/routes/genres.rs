//! Route definitions for the `/genres` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::genres;
use crate::state::AppState;

/// Routes mounted at `/genres`.
///
/// ```text
/// GET, POST    /         -> list_genres, create_genre
/// GET, DELETE  /{slug}   -> get_genre, delete_genre
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(genres::list_genres).post(genres::create_genre))
        .route("/{slug}", get(genres::get_genre).delete(genres::delete_genre))
}
