//! Meilisearch-backed implementation of [`SearchIndex`].

use async_trait::async_trait;
use meilisearch_sdk::client::Client;
use serde::{Deserialize, Serialize};

use super::SearchIndex;

/// Document shape stored per post: the id plus the one searchable field.
#[derive(Debug, Serialize, Deserialize)]
struct SearchDoc {
    id: i32,
    body: String,
}

pub struct MeiliIndex {
    client: Client,
}

impl MeiliIndex {
    pub fn new(url: &str, api_key: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::new(url, api_key)?,
        })
    }
}

#[async_trait]
impl SearchIndex for MeiliIndex {
    async fn add_document(&self, collection: &str, id: i32, body: &str) -> anyhow::Result<()> {
        self.client
            .index(collection)
            .add_or_update(
                &[SearchDoc {
                    id,
                    body: body.to_string(),
                }],
                Some("id"),
            )
            .await?;
        Ok(())
    }

    async fn remove_document(&self, collection: &str, id: i32) -> anyhow::Result<()> {
        self.client.index(collection).delete_document(id).await?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        expression: &str,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<i32>, i64)> {
        if page < 1 || per_page < 1 {
            return Ok((Vec::new(), 0));
        }
        let offset = (page - 1).checked_mul(per_page).unwrap_or(i64::MAX);
        let results = self
            .client
            .index(collection)
            .search()
            .with_query(expression)
            .with_offset(offset as usize)
            .with_limit(per_page as usize)
            .execute::<SearchDoc>()
            .await?;

        let total = results.estimated_total_hits.unwrap_or(results.hits.len()) as i64;
        let ids = results.hits.into_iter().map(|hit| hit.result.id).collect();
        Ok((ids, total))
    }
}
