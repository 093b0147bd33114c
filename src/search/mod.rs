//! External text index interface and its implementations.

pub mod meili;
pub mod memory;

pub use meili::MeiliIndex;
pub use memory::MemoryIndex;

use async_trait::async_trait;

/// Collection holding post documents.
pub const POSTS_INDEX: &str = "posts";

/// Best-match text index consumed through add/remove/query only. Ranking is
/// entirely the index's business; callers get back ordered ids plus a total
/// match count.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn add_document(&self, collection: &str, id: i32, body: &str) -> anyhow::Result<()>;

    async fn remove_document(&self, collection: &str, id: i32) -> anyhow::Result<()>;

    /// Returns the ranked ids for the requested page and the total number
    /// of matches across all pages.
    async fn query(
        &self,
        collection: &str,
        expression: &str,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<i32>, i64)>;
}
