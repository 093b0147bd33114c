use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::users::lookup_user;
use super::PageQuery;
use crate::api::AppState;
use crate::db;
use crate::error::Error;
use crate::feed;
use crate::users;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub user_id: i32,
    pub body: String,
}

/// Create a post; the search index is reconciled by the store's commit
/// observers.
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let post = state.posts.create_post(req.user_id, &req.body).await?;

    let author_id = req.user_id;
    db::run(&state.pool, move |conn| {
        users::touch_last_seen(conn, author_id)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "your post has been sent to the void",
            "post": post,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct DeletePostRequest {
    pub user_id: i32,
}

/// Delete one of your own posts.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    Json(req): Json<DeletePostRequest>,
) -> Result<Json<Value>, Error> {
    let post = state.posts.delete_post(post_id, req.user_id).await?;
    Ok(Json(json!({
        "message": "post deleted",
        "post": post,
    })))
}

/// Get a user's own posts, newest first
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, Error> {
    let page = query.page();
    let per_page = query.per_page();

    let posts = db::run(&state.pool, move |conn| {
        let user = lookup_user(conn, &username)?;
        feed::user_posts(conn, user.id, page, per_page)
    })
    .await?;

    Ok(Json(serde_json::to_value(posts).unwrap_or_default()))
}
