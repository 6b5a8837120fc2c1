mod ids;
mod stores;
mod traits;
mod worker;

pub use stores::MemoryStore;
pub use traits::PostStore;

use domain::{AppCommand, Post, PostId, ThreadError, ThreadEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A command plus the channel its result is sent back on.
pub struct CommandEnvelope {
    pub cmd: AppCommand,
    pub resp: oneshot::Sender<Result<Outcome, DispatchError>>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Saved(Post),
    Deleted(PostId),
}

impl Outcome {
    pub fn to_event(&self) -> ThreadEvent {
        match self {
            Outcome::Saved(post) => ThreadEvent::PostSaved { post: post.clone() },
            Outcome::Deleted(post_id) => ThreadEvent::PostDeleted {
                post_id: post_id.clone(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Domain(#[from] ThreadError),

    #[error("post {0} not found")]
    PostNotFound(PostId),

    #[error("not allowed to {0} this post")]
    Forbidden(&'static str),

    #[error("title and content must not be empty")]
    EmptyPost,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub async fn start_with_cancel_token(
    store: Arc<dyn PostStore>,
    rx: mpsc::Receiver<CommandEnvelope>,
    tx_events: broadcast::Sender<ThreadEvent>,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    info!("Initializing thread adapter...");
    worker::run(store, rx, tx_events, cancel_token).await
}
