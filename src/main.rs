use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chirp::api::{self, AppState};
use chirp::config::Config;
use chirp::db::init_database;
use chirp::search::{MeiliIndex, SearchIndex};
use chirp::search_sync::SearchSync;
use chirp::store::PostStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,chirp=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::get();
    info!("Initialized configuration");

    // Initialize database
    let db = init_database()?;
    info!("Connected to database");

    // Set up the search index if one is configured
    let search: Option<Arc<dyn SearchIndex>> = match &config.search.url {
        Some(url) => match MeiliIndex::new(url, config.search.api_key.as_deref()) {
            Ok(index) => {
                info!("Search index configured at {}", url);
                Some(Arc::new(index))
            }
            Err(e) => {
                warn!("Search index misconfigured, search disabled: {e:#}");
                None
            }
        },
        None => {
            info!("MEILISEARCH_URL not set, search disabled");
            None
        }
    };

    // Wire the post store; search sync observes its commits
    let mut post_store = PostStore::new(db.get_pool().clone());
    if let Some(index) = &search {
        post_store.register_observer(Arc::new(SearchSync::new(index.clone())));
    }

    let state = AppState {
        pool: db.get_pool().clone(),
        posts: Arc::new(post_store),
        search,
    };

    // Start API server
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_api_server(state).await {
            error!("API server error: {}", e);
        }
    });

    // Run until the API server stops or a shutdown signal arrives
    tokio::select! {
        _ = api_handle => {},
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received, shutting down"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        }
    }

    info!("chirp shutdown complete");
    Ok(())
}
