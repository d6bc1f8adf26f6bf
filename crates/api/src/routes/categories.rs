//! Route definitions for the `/categories` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET, POST    /         -> list_categories, create_category
/// GET, DELETE  /{slug}   -> get_category, delete_category
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{slug}",
            get(categories::get_category).delete(categories::delete_category),
        )
}
