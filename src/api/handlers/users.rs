use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::sqlite::SqliteConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::AppState;
use crate::db;
use crate::error::Error;
use crate::models::User;
use crate::social_graph;
use crate::users;

/// Profile payload with social graph counts and the avatar URL.
pub(crate) fn profile_json(conn: &mut SqliteConnection, user: &User) -> Result<Value, Error> {
    let followers = social_graph::follower_count(conn, user.id)?;
    let following = social_graph::following_count(conn, user.id)?;
    Ok(json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "about_me": user.about_me,
        "last_seen": user.last_seen,
        "avatar_url": user.avatar_url(128),
        "followers_count": followers,
        "following_count": following,
    }))
}

pub(crate) fn lookup_user(conn: &mut SqliteConnection, username: &str) -> Result<User, Error> {
    users::find_by_username(conn, username)?
        .ok_or_else(|| Error::NotFound(format!("user {username} not found")))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let user = db::run(&state.pool, move |conn| {
        users::create_user(conn, &req.username, &req.email, &req.password)
    })
    .await?;

    debug!(user_id = user.id, username = %user.username, "registered new user");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "you're in",
            "user": user,
        })),
    ))
}

/// Get a profile by username
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, Error> {
    let profile = db::run(&state.pool, move |conn| {
        let user = lookup_user(conn, &username)?;
        profile_json(conn, &user)
    })
    .await?;

    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub user_id: i32,
    pub username: Option<String>,
    pub about_me: Option<String>,
}

/// Edit a profile; only the profile owner may do so.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, Error> {
    let profile = db::run(&state.pool, move |conn| {
        let target = lookup_user(conn, &username)?;
        if target.id != req.user_id {
            return Err(Error::Forbidden(
                "you can only edit your own profile".to_string(),
            ));
        }

        let updated = users::update_profile(
            conn,
            target.id,
            req.username.as_deref(),
            req.about_me.as_deref(),
        )?;
        users::touch_last_seen(conn, updated.id)?;

        let mut payload = profile_json(conn, &updated)?;
        payload["message"] = json!("updates saved successfully");
        Ok(payload)
    })
    .await?;

    Ok(Json(profile))
}
