pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod pagination;
pub mod schema;
pub mod search;
pub mod search_sync;
pub mod social_graph;
pub mod store;
pub mod users;
