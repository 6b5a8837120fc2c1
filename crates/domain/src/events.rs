use crate::models::{Post, PostId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThreadEvent {
    PostSaved { post: Post },
    PostDeleted { post_id: PostId },
}

impl ThreadEvent {
    pub fn post_id(&self) -> &PostId {
        match self {
            ThreadEvent::PostSaved { post } => &post.id,
            ThreadEvent::PostDeleted { post_id } => post_id,
        }
    }
}
