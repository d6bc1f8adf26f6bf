//! Route definitions for `/titles` and the reviews/comments nested under it.

use axum::routing::get;
use axum::Router;

use crate::handlers::{comments, reviews, titles};
use crate::state::AppState;

/// Routes mounted at `/titles`.
///
/// ```text
/// GET, POST                  /                                    -> list_titles, create_title
/// GET, PUT, PATCH, DELETE    /{title_id}                          -> title detail
/// GET, POST                  /{title_id}/reviews                  -> list_reviews, create_review
/// GET, PUT, PATCH, DELETE    /{title_id}/reviews/{review_id}      -> review detail
/// GET, POST                  /{title_id}/reviews/{review_id}/comments
/// GET, PUT, PATCH, DELETE    /{title_id}/reviews/{review_id}/comments/{comment_id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(titles::list_titles).post(titles::create_title))
        .route(
            "/{title_id}",
            get(titles::get_title)
                .put(titles::replace_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
        .route(
            "/{title_id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/{title_id}/reviews/{review_id}",
            get(reviews::get_review)
                .put(reviews::replace_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/{title_id}/reviews/{review_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(comments::get_comment)
                .put(comments::replace_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
}
