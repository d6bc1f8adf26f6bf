//! Reviews and comments over HTTP.

mod common;

use axum::http::StatusCode;
use common::*;
use critica_core::roles::Role;
use critica_db::models::title::NewTitle;
use critica_db::models::user::User;
use critica_db::repositories::TitleRepo;
use serde_json::{json, Value};
use sqlx::PgPool;

struct Fixture {
    app: axum::Router,
    author: User,
    title_uri: String,
}

async fn fixture(pool: PgPool) -> Fixture {
    let author = create_user(&pool, "bob", Role::User).await;
    let title = TitleRepo::create(
        &pool,
        &NewTitle {
            name: "Solaris".into(),
            year: 1972,
            description: String::new(),
            category_id: None,
            genre_ids: Vec::new(),
        },
    )
    .await
    .unwrap();
    Fixture {
        app: build_test_app(pool),
        author,
        title_uri: format!("/api/v1/titles/{}", title.id),
    }
}

async fn post_review(f: &Fixture, token: &str, body: Value) -> Value {
    expect_status(
        post_json_auth(f.app.clone(), &format!("{}/reviews", f.title_uri), token, body).await,
        StatusCode::CREATED,
    )
    .await
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_review_is_rejected_but_author_can_patch(pool: PgPool) {
    let f = fixture(pool).await;
    let token = token_for(&f.author);

    let review = post_review(&f, &token, json!({ "text": "Slow", "score": 6 })).await;
    assert_eq!(review["author"], "bob");

    let json = expect_status(
        post_json_auth(
            f.app.clone(),
            &format!("{}/reviews", f.title_uri),
            &token,
            json!({ "text": "Again", "score": 9 }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["fields"]["non_field_errors"].is_array());

    let uri = format!("{}/reviews/{}", f.title_uri, review["id"]);
    let json = expect_status(
        patch_json_auth(f.app.clone(), &uri, &token, json!({ "score": 8 })).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["score"], 8);
    assert_eq!(json["text"], "Slow");

    let title = expect_status(get(f.app, &f.title_uri).await, StatusCode::OK).await;
    assert_eq!(title["rating"], 8.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_score_is_field_error(pool: PgPool) {
    let f = fixture(pool).await;
    let token = token_for(&f.author);

    let json = expect_status(
        post_json_auth(
            f.app.clone(),
            &format!("{}/reviews", f.title_uri),
            &token,
            json!({ "text": "Off the scale", "score": 11 }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["fields"]["score"].is_array());

    let json = expect_status(
        post_json_auth(
            f.app.clone(),
            &format!("{}/reviews", f.title_uri),
            &token,
            json!({ "text": "Way off the scale", "score": 40000 }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["score"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_author_and_staff_may_edit(pool: PgPool) {
    let other = create_user(&pool, "eve", Role::User).await;
    let moderator = create_user(&pool, "mod", Role::Moderator).await;
    let admin = create_user(&pool, "root", Role::Admin).await;
    let f = fixture(pool).await;

    let review = post_review(&f, &token_for(&f.author), json!({ "text": "Fine", "score": 7 })).await;
    let uri = format!("{}/reviews/{}", f.title_uri, review["id"]);

    let response =
        patch_json_auth(f.app.clone(), &uri, &token_for(&other), json!({ "score": 1 })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(f.app.clone(), &uri, &token_for(&other)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    for (user, score) in [(&f.author, 5), (&moderator, 4), (&admin, 3)] {
        let json = expect_status(
            patch_json_auth(f.app.clone(), &uri, &token_for(user), json!({ "score": score })).await,
            StatusCode::OK,
        )
        .await;
        assert_eq!(json["score"], score);
    }

    let response = delete_auth(f.app.clone(), &uri, &token_for(&moderator)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let title = expect_status(get(f.app, &f.title_uri).await, StatusCode::OK).await;
    assert!(title["rating"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn put_replaces_review(pool: PgPool) {
    let f = fixture(pool).await;
    let token = token_for(&f.author);
    let review = post_review(&f, &token, json!({ "text": "Fine", "score": 7 })).await;
    let uri = format!("{}/reviews/{}", f.title_uri, review["id"]);

    let json = expect_status(
        put_json_auth(f.app.clone(), &uri, &token, json!({ "text": "Masterpiece", "score": 10 }))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["text"], "Masterpiece");
    assert_eq!(json["score"], 10);

    let response = put_json_auth(f.app, &uri, &token, json!({ "score": 9 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_under_wrong_title_is_not_found(pool: PgPool) {
    let f = fixture(pool).await;
    let token = token_for(&f.author);
    let review = post_review(&f, &token, json!({ "text": "Fine", "score": 7 })).await;

    let response = get(f.app.clone(), &format!("/api/v1/titles/999999/reviews/{}", review["id"])).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(f.app.clone(), &format!("{}/reviews/999999", f.title_uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        f.app,
        "/api/v1/titles/999999/reviews",
        &token,
        json!({ "text": "Nowhere", "score": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reviews_list_is_public_and_paginated(pool: PgPool) {
    let other = create_user(&pool, "eve", Role::User).await;
    let f = fixture(pool).await;
    post_review(&f, &token_for(&f.author), json!({ "text": "A", "score": 7 })).await;
    post_review(&f, &token_for(&other), json!({ "text": "B", "score": 8 })).await;

    let page = expect_status(
        get(f.app, &format!("{}/reviews?limit=1&offset=1", f.title_uri)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(page["count"], 2);
    assert_eq!(page["limit"], 1);
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert_eq!(page["results"][0]["author"], "eve");
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_lifecycle(pool: PgPool) {
    let other = create_user(&pool, "eve", Role::User).await;
    let f = fixture(pool).await;
    let review = post_review(&f, &token_for(&f.author), json!({ "text": "Fine", "score": 7 })).await;
    let comments_uri = format!("{}/reviews/{}/comments", f.title_uri, review["id"]);

    let eve = token_for(&other);
    let comment = expect_status(
        post_json_auth(f.app.clone(), &comments_uri, &eve, json!({ "text": "Agreed" })).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(comment["author"], "eve");
    let uri = format!("{comments_uri}/{}", comment["id"]);

    let response =
        patch_json_auth(f.app.clone(), &uri, &token_for(&f.author), json!({ "text": "No" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = expect_status(
        patch_json_auth(f.app.clone(), &uri, &eve, json!({ "text": "Strongly agreed" })).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["text"], "Strongly agreed");

    let list = expect_status(get(f.app.clone(), &comments_uri).await, StatusCode::OK).await;
    assert_eq!(list["count"], 1);

    let response = delete_auth(f.app.clone(), &uri, &eve).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(f.app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_comment_is_rejected(pool: PgPool) {
    let f = fixture(pool).await;
    let token = token_for(&f.author);
    let review = post_review(&f, &token, json!({ "text": "Fine", "score": 7 })).await;
    let uri = format!("{}/reviews/{}/comments", f.title_uri, review["id"]);

    let json = expect_status(
        post_json_auth(f.app, &uri, &token, json!({ "text": "" })).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["fields"]["text"].is_array());
}
