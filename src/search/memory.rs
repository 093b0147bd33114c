//! In-process [`SearchIndex`] with naive substring ranking. Used by the
//! tests and available for running without a Meilisearch instance.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SearchIndex;

#[derive(Default)]
pub struct MemoryIndex {
    collections: RwLock<HashMap<String, BTreeMap<i32, String>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn add_document(&self, collection: &str, id: i32, body: &str) -> anyhow::Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, body.to_string());
        Ok(())
    }

    async fn remove_document(&self, collection: &str, id: i32) -> anyhow::Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(&id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        expression: &str,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<i32>, i64)> {
        let needle = expression.to_lowercase();
        let collections = self.collections.read().await;

        // Rank by occurrence count, then by id for a stable order.
        let mut matches: Vec<(usize, i32)> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter_map(|(id, body)| {
                        let haystack = body.to_lowercase();
                        let hits = haystack.matches(&needle).count();
                        (hits > 0).then_some((hits, *id))
                    })
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let total = matches.len() as i64;
        if page < 1 || per_page < 1 {
            return Ok((Vec::new(), total));
        }
        let start = (page - 1)
            .checked_mul(per_page)
            .map_or(matches.len(), |offset| offset.min(total) as usize);
        let end = start.saturating_add(per_page as usize).min(matches.len());
        let ids = matches[start..end].iter().map(|(_, id)| *id).collect();
        Ok((ids, total))
    }
}
