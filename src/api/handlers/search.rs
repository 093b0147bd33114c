use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::AppState;
use crate::config::Config;
use crate::error::Error;
use crate::search_sync;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Full-text search over post bodies, ranked by the external index.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, Error> {
    let page = query.page.unwrap_or(1);
    let per_page = query
        .per_page
        .unwrap_or_else(|| Config::get().server.posts_per_page)
        .min(100);
    if page < 1 || per_page < 1 {
        return Err(Error::PageOutOfRange);
    }

    // No index configured: search is disabled, not an error.
    let Some(index) = &state.search else {
        return Ok(Json(json!({
            "query": query.q,
            "posts": [],
            "total": 0,
        })));
    };

    let (posts, total) =
        search_sync::search_posts(&state.pool, index, &query.q, page, per_page).await?;

    Ok(Json(json!({
        "query": query.q,
        "posts": posts,
        "total": total,
    })))
}
