use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use super::users::lookup_user;
use super::PageQuery;
use crate::api::AppState;
use crate::db;
use crate::error::Error;
use crate::feed;
use crate::users;

/// The aggregated feed for a user: their own posts plus posts of everyone
/// they follow, newest first.
pub async fn get_feed(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, Error> {
    let page = query.page();
    let per_page = query.per_page();

    let posts = db::run(&state.pool, move |conn| {
        let user = lookup_user(conn, &username)?;
        users::touch_last_seen(conn, user.id)?;
        feed::following_posts(conn, user.id, page, per_page)
    })
    .await?;

    Ok(Json(serde_json::to_value(posts).unwrap_or_default()))
}

/// The explore page: every post on the site, newest first.
pub async fn explore(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, Error> {
    let page = query.page();
    let per_page = query.per_page();

    let posts = db::run(&state.pool, move |conn| {
        feed::all_posts(conn, page, per_page)
    })
    .await?;

    Ok(Json(serde_json::to_value(posts).unwrap_or_default()))
}
