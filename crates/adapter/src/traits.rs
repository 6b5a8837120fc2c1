use anyhow::Result;
use async_trait::async_trait;
use domain::{Post, PostId};

/// Durable home of posts. The worker is the only writer.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn load(&self, id: &PostId) -> Result<Option<Post>>;

    async fn save(&self, post: &Post) -> Result<()>;

    /// Returns whether the post existed.
    async fn remove(&self, id: &PostId) -> Result<bool>;

    /// Newest first.
    async fn list(&self, include_blocked: bool) -> Result<Vec<Post>>;
}
