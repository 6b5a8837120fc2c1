use anyhow::Result;
use async_trait::async_trait;
use domain::{Post, PostId};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::traits::PostStore;

/// Process-local store, for tests and throwaway dev servers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn load(&self, id: &PostId) -> Result<Option<Post>> {
        Ok(self.inner.read().await.get(id).cloned())
    }

    async fn save(&self, post: &Post) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn remove(&self, id: &PostId) -> Result<bool> {
        Ok(self.inner.write().await.remove(id).is_some())
    }

    async fn list(&self, include_blocked: bool) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .inner
            .read()
            .await
            .values()
            .filter(|p| include_blocked || !p.blocked)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}
