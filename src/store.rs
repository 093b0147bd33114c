//! Post store with explicit post-commit observation.
//!
//! Handlers never talk to the index directly: every write path goes through
//! [`PostStore`], which captures a [`ChangeSet`] inside the transaction and
//! hands it to the registered observers only once the transaction has
//! durably committed. A rolled-back transaction notifies nobody.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tracing::error;

use crate::db::{self, DbPool};
use crate::error::Error;
use crate::models::{NewPost, Post};
use crate::schema::{posts, users};

pub const POST_BODY_MAX_LEN: usize = 140;

/// Entities touched by a committed transaction, threaded through the commit
/// call as a plain value.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    pub added: Vec<Post>,
    pub updated: Vec<Post>,
    pub deleted: Vec<Post>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Observer invoked after a transaction has committed. Failures are logged
/// by the store and never unwind the already-persisted write.
#[async_trait]
pub trait CommitObserver: Send + Sync {
    async fn after_commit(&self, changes: &ChangeSet) -> anyhow::Result<()>;
}

pub struct PostStore {
    pool: DbPool,
    observers: Vec<Arc<dyn CommitObserver>>,
}

impl PostStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            observers: Vec::new(),
        }
    }

    pub fn register_observer(&mut self, observer: Arc<dyn CommitObserver>) {
        self.observers.push(observer);
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Create a post for `author_id` and notify observers once committed.
    pub async fn create_post(&self, author_id: i32, body: &str) -> Result<Post, Error> {
        let body = body.trim().to_string();
        if body.is_empty() {
            return Err(Error::Validation("post body must not be empty".to_string()));
        }
        if body.chars().count() > POST_BODY_MAX_LEN {
            return Err(Error::Validation(format!(
                "post body must be at most {POST_BODY_MAX_LEN} characters"
            )));
        }

        let post = db::run(&self.pool, move |conn| {
            conn.transaction::<Post, Error, _>(|conn| {
                let author_exists: i64 = users::table
                    .filter(users::id.eq(author_id))
                    .count()
                    .get_result(conn)?;
                if author_exists == 0 {
                    return Err(Error::NotFound("author not found".to_string()));
                }

                Ok(diesel::insert_into(posts::table)
                    .values(&NewPost {
                        body,
                        timestamp: Utc::now().naive_utc(),
                        user_id: author_id,
                    })
                    .get_result::<Post>(conn)?)
            })
        })
        .await?;

        self.notify(ChangeSet {
            added: vec![post.clone()],
            ..Default::default()
        })
        .await;

        Ok(post)
    }

    /// Delete a post the acting user owns and notify observers once
    /// committed.
    pub async fn delete_post(&self, post_id: i32, acting_user_id: i32) -> Result<Post, Error> {
        let post = db::run(&self.pool, move |conn| {
            conn.transaction::<Post, Error, _>(|conn| {
                let post = posts::table
                    .find(post_id)
                    .first::<Post>(conn)
                    .optional()?
                    .ok_or_else(|| Error::NotFound("post not found".to_string()))?;

                if post.user_id != acting_user_id {
                    return Err(Error::Forbidden(
                        "you can only delete your own posts".to_string(),
                    ));
                }

                diesel::delete(posts::table.find(post_id)).execute(conn)?;
                Ok(post)
            })
        })
        .await?;

        self.notify(ChangeSet {
            deleted: vec![post.clone()],
            ..Default::default()
        })
        .await;

        Ok(post)
    }

    /// Hand the change-set to every observer. The primary transaction has
    /// already committed, so observer errors are reported and swallowed;
    /// the index catches up on the next reindex.
    async fn notify(&self, changes: ChangeSet) {
        if changes.is_empty() {
            return;
        }
        for observer in &self.observers {
            if let Err(e) = observer.after_commit(&changes).await {
                error!("post-commit observer failed: {e:#}");
            }
        }
    }
}
