use crate::models::{Actor, PostDraft, PostId};
use crate::post::ThreadAction;

#[derive(Debug, Clone)]
pub enum AppCommand {
    CreatePost {
        actor: Actor,
        draft: PostDraft,
    },
    RevisePost {
        actor: Actor,
        post_id: PostId,
        draft: PostDraft,
    },
    DeletePost {
        actor: Actor,
        post_id: PostId,
    },
    SetPostBlocked {
        actor: Actor,
        post_id: PostId,
        blocked: bool,
    },
    TogglePostLike {
        actor: Actor,
        post_id: PostId,
    },
    Thread {
        actor: Actor,
        post_id: PostId,
        action: ThreadAction,
    },
}

impl AppCommand {
    pub fn actor(&self) -> &Actor {
        match self {
            AppCommand::CreatePost { actor, .. }
            | AppCommand::RevisePost { actor, .. }
            | AppCommand::DeletePost { actor, .. }
            | AppCommand::SetPostBlocked { actor, .. }
            | AppCommand::TogglePostLike { actor, .. }
            | AppCommand::Thread { actor, .. } => actor,
        }
    }

    /// Target post, `None` for creation.
    pub fn post_id(&self) -> Option<&PostId> {
        match self {
            AppCommand::CreatePost { .. } => None,
            AppCommand::RevisePost { post_id, .. }
            | AppCommand::DeletePost { post_id, .. }
            | AppCommand::SetPostBlocked { post_id, .. }
            | AppCommand::TogglePostLike { post_id, .. }
            | AppCommand::Thread { post_id, .. } => Some(post_id),
        }
    }
}
