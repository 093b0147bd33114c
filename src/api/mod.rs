pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::DbPool;
use crate::search::SearchIndex;
use crate::store::PostStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub posts: Arc<PostStore>,
    pub search: Option<Arc<dyn SearchIndex>>,
}

/// Create the router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        // User routes
        .route("/api/users", post(handlers::users::register))
        .route("/api/login", post(handlers::auth::login))
        .route(
            "/api/users/:username",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route(
            "/api/users/:username/posts",
            get(handlers::posts::get_user_posts),
        )
        .route(
            "/api/users/:username/followers",
            get(handlers::follows::get_followers),
        )
        .route(
            "/api/users/:username/following",
            get(handlers::follows::get_following),
        )
        .route(
            "/api/users/:username/follow",
            post(handlers::follows::follow),
        )
        .route(
            "/api/users/:username/unfollow",
            post(handlers::follows::unfollow),
        )
        // Post routes
        .route("/api/posts", post(handlers::posts::create_post))
        .route("/api/posts/:id", delete(handlers::posts::delete_post))
        .route("/api/feed/:username", get(handlers::feed::get_feed))
        .route("/api/explore", get(handlers::feed::explore))
        .route("/api/search", get(handlers::search::search))
        // Password reset routes
        .route(
            "/api/auth/reset_password_request",
            post(handlers::auth::reset_password_request),
        )
        .route(
            "/api/auth/reset_password",
            post(handlers::auth::reset_password),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port).parse::<SocketAddr>()?;

    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
