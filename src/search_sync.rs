//! Keeps the external text index consistent with the post store.
//!
//! [`SearchSync`] is a [`CommitObserver`]: it sees each committed
//! [`ChangeSet`] and reconciles the index, so no write path has to remember
//! to call the index itself. Consistency is eventual; if the index is down
//! the primary data stays committed and the failure is logged upstream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use tracing::debug;

use crate::db::{self, DbPool};
use crate::error::Error;
use crate::models::Post;
use crate::pagination;
use crate::schema::posts;
use crate::search::{SearchIndex, POSTS_INDEX};
use crate::store::{ChangeSet, CommitObserver};

pub struct SearchSync {
    index: Arc<dyn SearchIndex>,
}

impl SearchSync {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl CommitObserver for SearchSync {
    async fn after_commit(&self, changes: &ChangeSet) -> anyhow::Result<()> {
        for post in changes.added.iter().chain(changes.updated.iter()) {
            self.index
                .add_document(POSTS_INDEX, post.id, &post.body)
                .await?;
        }
        for post in &changes.deleted {
            self.index.remove_document(POSTS_INDEX, post.id).await?;
        }
        debug!(
            added = changes.added.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "search index reconciled"
        );
        Ok(())
    }
}

/// Query the index, then re-hydrate matching rows from the primary store in
/// the index's relevance order. A zero-match result never touches the
/// database.
pub async fn search_posts(
    pool: &DbPool,
    index: &Arc<dyn SearchIndex>,
    expression: &str,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Post>, i64), Error> {
    let (ids, total) = index
        .query(POSTS_INDEX, expression, page, per_page)
        .await
        .map_err(|e| Error::Internal(format!("search index query failed: {e:#}")))?;

    // Same strict rule as the feed: a page past the last match is an error.
    pagination::offset_for_page(page, per_page, total)?;

    if total == 0 {
        return Ok((Vec::new(), 0));
    }

    let fetch_ids = ids.clone();
    let rows = db::run(pool, move |conn| {
        Ok(posts::table
            .filter(posts::id.eq_any(fetch_ids))
            .load::<Post>(conn)?)
    })
    .await?;

    // Reorder rows by position in the ranked id list, not store order.
    let position: HashMap<i32, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut rows = rows;
    rows.sort_by_key(|post| position.get(&post.id).copied().unwrap_or(usize::MAX));

    Ok((rows, total))
}

/// Rebuild the posts collection from the primary store, for recovering an
/// index that fell behind.
pub async fn reindex_posts(pool: &DbPool, index: &Arc<dyn SearchIndex>) -> anyhow::Result<()> {
    let all = db::run(pool, |conn| Ok(posts::table.load::<Post>(conn)?)).await?;
    for post in all {
        index.add_document(POSTS_INDEX, post.id, &post.body).await?;
    }
    Ok(())
}
