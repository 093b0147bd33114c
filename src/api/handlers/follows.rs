use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::users::lookup_user;
use crate::api::AppState;
use crate::db;
use crate::error::Error;
use crate::social_graph;
use crate::users;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub user_id: i32,
}

/// Follow a user by username. Self-follow is rejected here, not by the
/// data layer.
pub async fn follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<FollowRequest>,
) -> Result<Json<Value>, Error> {
    let message = db::run(&state.pool, move |conn| {
        let target = users::find_by_username(conn, &username)?.ok_or_else(|| {
            Error::NotFound(format!("{username} has not been invited to the party"))
        })?;
        if target.id == req.user_id {
            return Err(Error::Validation(
                "nice try, but you can't follow yourself".to_string(),
            ));
        }

        social_graph::follow(conn, req.user_id, target.id)?;
        users::touch_last_seen(conn, req.user_id)?;
        debug!(follower = req.user_id, followed = target.id, "follow edge ensured");
        Ok(format!("you're now following {}!", target.username))
    })
    .await?;

    Ok(Json(json!({ "message": message })))
}

/// Unfollow a user by username; a no-op if there was no edge.
pub async fn unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<FollowRequest>,
) -> Result<Json<Value>, Error> {
    let message = db::run(&state.pool, move |conn| {
        let target = users::find_by_username(conn, &username)?.ok_or_else(|| {
            Error::NotFound(format!("{username} has not been invited to the party"))
        })?;
        if target.id == req.user_id {
            return Err(Error::Validation("thou cannot unfollow oneself".to_string()));
        }

        social_graph::unfollow(conn, req.user_id, target.id)?;
        users::touch_last_seen(conn, req.user_id)?;
        Ok(format!("unfollowed {}", target.username))
    })
    .await?;

    Ok(Json(json!({ "message": message })))
}

fn user_summaries(members: Vec<crate::models::User>) -> Vec<Value> {
    members
        .into_iter()
        .map(|user| {
            json!({
                "id": user.id,
                "username": user.username,
                "about_me": user.about_me,
                "avatar_url": user.avatar_url(128),
            })
        })
        .collect()
}

/// Get the users following a user
pub async fn get_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, Error> {
    let followers = db::run(&state.pool, move |conn| {
        let user = lookup_user(conn, &username)?;
        social_graph::followers_of(conn, user.id)
    })
    .await?;

    Ok(Json(json!({ "followers": user_summaries(followers) })))
}

/// Get the users a user is following
pub async fn get_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, Error> {
    let following = db::run(&state.pool, move |conn| {
        let user = lookup_user(conn, &username)?;
        social_graph::following_of(conn, user.id)
    })
    .await?;

    Ok(Json(json!({ "following": user_summaries(following) })))
}
