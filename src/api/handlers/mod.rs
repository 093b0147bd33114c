pub mod auth;
pub mod feed;
pub mod follows;
pub mod health;
pub mod posts;
pub mod search;
pub mod users;

use serde::Deserialize;

use crate::config::Config;

/// Pagination query parameters shared by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or_else(|| Config::get().server.posts_per_page)
            .min(100)
    }
}
