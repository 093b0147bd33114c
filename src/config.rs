use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub posts_per_page: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the Meilisearch instance. Search is disabled when unset.
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub reset_token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env file if present
        let _ = dotenv::dotenv();

        Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "chirp.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("DATABASE_MAX_CONNECTIONS must be a number"),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .expect("SERVER_PORT must be a number"),
                enable_cors: env::var("ENABLE_CORS")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(true),
                posts_per_page: env::var("POSTS_PER_PAGE")
                    .unwrap_or_else(|_| "25".to_string())
                    .parse()
                    .expect("POSTS_PER_PAGE must be a number"),
            },
            search: SearchConfig {
                url: env::var("MEILISEARCH_URL").ok(),
                api_key: env::var("MEILISEARCH_API_KEY").ok(),
            },
            auth: AuthConfig {
                secret_key: env::var("SECRET_KEY")
                    .unwrap_or_else(|_| "you-will-never-guess".to_string()),
                reset_token_ttl_secs: env::var("RESET_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .expect("RESET_TOKEN_TTL_SECS must be a number"),
            },
        }
    }

    /// Global configuration, loaded from the environment on first access.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}
