//! End-to-end tests driving the axum router directly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use chirp::api::{self, AppState};
use chirp::db::Database;
use chirp::search::{MemoryIndex, SearchIndex};
use chirp::search_sync::SearchSync;
use chirp::store::PostStore;

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Router over a fresh temporary database with an in-memory search index
/// wired through the commit observer.
fn test_app() -> Router {
    let path = std::env::temp_dir().join(format!(
        "chirp-api-test-{}-{}.db",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_file(&path);
    let db = Database::with_url(path.to_str().expect("temp path is not utf-8"), 4)
        .expect("failed to create test database");

    let index: Arc<dyn SearchIndex> = Arc::new(MemoryIndex::new());
    let mut store = PostStore::new(db.get_pool().clone());
    store.register_observer(Arc::new(SearchSync::new(index.clone())));

    api::router(AppState {
        pool: db.get_pool().clone(),
        posts: Arc::new(store),
        search: Some(index),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> i32 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["user"]["id"].as_i64().unwrap() as i32
}

async fn create_post(app: &Router, user_id: i32, text: &str) -> i32 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/posts",
        Some(json!({ "user_id": user_id, "body": text })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "post failed: {body}");
    body["post"]["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn registration_rejects_duplicates() {
    let app = test_app();
    register(&app, "dave").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "dave",
            "email": "elsewhere@example.com",
            "password": "secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username already taken");
}

#[tokio::test]
async fn login_accepts_good_and_rejects_bad_credentials() {
    let app = test_app();
    register(&app, "dave").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "username": "dave", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "dave");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "username": "dave", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid username or password");
}

#[tokio::test]
async fn follow_feed_unfollow_scenario() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    let miri = register(&app, "miri").await;

    // dave follows miri, miri posts, dave's feed picks it up
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/miri/follow",
        Some(json!({ "user_id": dave })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    create_post(&app, miri, "hello").await;

    let (status, body) = send(&app, Method::GET, "/api/feed/dave", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["body"], "hello");

    // after unfollow a fresh feed no longer carries miri's post
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/miri/unfollow",
        Some(json!({ "user_id": dave })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/feed/dave", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn self_follow_and_unknown_target_are_rejected() {
    let app = test_app();
    let dave = register(&app, "dave").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/dave/follow",
        Some(json!({ "user_id": dave })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/ghost/follow",
        Some(json!({ "user_id": dave })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn follower_listings_reflect_the_graph() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    register(&app, "miri").await;

    send(
        &app,
        Method::POST,
        "/api/users/miri/follow",
        Some(json!({ "user_id": dave })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/users/miri/followers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followers"][0]["username"], "dave");

    let (status, body) = send(&app, Method::GET, "/api/users/dave/following", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["following"][0]["username"], "miri");
}

#[tokio::test]
async fn posts_paginate_strictly() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    for i in 0..5 {
        create_post(&app, dave, &format!("post number {i}")).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/dave/posts?page=1&per_page=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_prev"], false);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/dave/posts?page=3&per_page=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_next"], false);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users/dave/posts?page=9&per_page=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_round_trip_through_the_api() {
    let app = test_app();
    let miri = register(&app, "miri").await;
    let post = create_post(&app, miri, "looking for 5 woodchucks...").await;
    create_post(&app, miri, "unrelated musings").await;

    let (status, body) = send(&app, Method::GET, "/api/search?q=woodchucks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["posts"][0]["id"].as_i64().unwrap() as i32, post);

    // deleting the post removes it from the index as well
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{post}"),
        Some(json!({ "user_id": miri })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/search?q=woodchucks", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn search_rejects_hostile_page_parameters() {
    let app = test_app();
    let miri = register(&app, "miri").await;
    create_post(&app, miri, "hello world").await;

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/search?q=hello&page=2&per_page=-5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/search?q=hello&page=0&per_page=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/search?q=hello&page={}&per_page=100", i64::MAX),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn explore_lists_posts_from_everyone() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    let miri = register(&app, "miri").await;
    create_post(&app, dave, "first!").await;
    create_post(&app, miri, "second!").await;

    let (status, body) = send(&app, Method::GET, "/api/explore", None).await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["second!", "first!"]);

    let (status, _) = send(&app, Method::GET, "/api/explore?page=5&per_page=10", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_someone_elses_post_is_forbidden() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    let miri = register(&app, "miri").await;
    let post = create_post(&app, miri, "mine alone").await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{post}"),
        Some(json!({ "user_id": dave })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_shows_counts_and_avatar() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    register(&app, "miri").await;
    send(
        &app,
        Method::POST,
        "/api/users/miri/follow",
        Some(json!({ "user_id": dave })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/users/miri", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followers_count"], 1);
    assert_eq!(body["following_count"], 0);
    assert!(body["avatar_url"]
        .as_str()
        .unwrap()
        .contains("gravatar.com/avatar/"));
}

#[tokio::test]
async fn profile_edit_is_owner_only() {
    let app = test_app();
    let dave = register(&app, "dave").await;
    register(&app, "miri").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/dave",
        Some(json!({ "user_id": dave, "about_me": "likes woodchucks" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["about_me"], "likes woodchucks");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/users/miri",
        Some(json!({ "user_id": dave, "about_me": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn password_reset_endpoints_do_not_leak() {
    let app = test_app();
    register(&app, "dave").await;

    // Unknown and known emails get the same acknowledgement.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset_password_request",
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let unknown_message = body["message"].clone();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset_password_request",
        Some(json!({ "email": "dave@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], unknown_message);

    // A malformed token is rejected without detail.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/reset_password",
        Some(json!({ "token": "garbage", "password": "new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
