use anyhow::Result;
use async_trait::async_trait;
use domain::{Post, PostId};
use storage::Db;

use crate::traits::PostStore;

#[async_trait]
impl PostStore for Db {
    async fn load(&self, id: &PostId) -> Result<Option<Post>> {
        self.get_post(id).await
    }

    async fn save(&self, post: &Post) -> Result<()> {
        self.upsert_post(post).await
    }

    async fn remove(&self, id: &PostId) -> Result<bool> {
        self.delete_post(id).await
    }

    async fn list(&self, include_blocked: bool) -> Result<Vec<Post>> {
        self.list_posts(include_blocked).await
    }
}
