use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::AppState;
use crate::auth;
use crate::config::Config;
use crate::db;
use crate::error::Error;
use crate::users;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Check credentials and report the user back. Session handling is the
/// caller's concern.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, Error> {
    let user = db::run(&state.pool, move |conn| {
        let user = users::verify_login(conn, &req.username, &req.password)?;
        users::touch_last_seen(conn, user.id)?;
        Ok(user)
    })
    .await?;

    debug!(user_id = user.id, "login succeeded");
    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// Issue a reset token if the email is known. The response is the same
/// either way, so the endpoint does not leak which emails are registered.
/// Token delivery (email) is an external collaborator; here the token only
/// reaches the debug log.
pub async fn reset_password_request(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<Value>, Error> {
    let config = Config::get();
    let user = db::run(&state.pool, move |conn| {
        users::find_by_email(conn, &req.email)
    })
    .await?;

    if let Some(user) = user {
        let token = auth::generate_reset_token(
            user.id,
            config.auth.reset_token_ttl_secs,
            &config.auth.secret_key,
        )?;
        debug!(user_id = user.id, %token, "issued password reset token");
    }

    Ok(Json(json!({
        "message": "if ur legit, you'll receive a reset link in your inbox"
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Redeem a reset token. Expired and malformed tokens are rejected
/// identically.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, Error> {
    let config = Config::get();
    let user_id = auth::verify_reset_token(&req.token, &config.auth.secret_key)
        .ok_or_else(|| Error::NotFound("invalid or expired reset token".to_string()))?;

    db::run(&state.pool, move |conn| {
        users::find_by_id(conn, user_id)?
            .ok_or_else(|| Error::NotFound("invalid or expired reset token".to_string()))?;
        users::set_password(conn, user_id, &req.password)
    })
    .await?;

    Ok(Json(json!({ "message": "your password has been reset" })))
}
