mod commands;
mod error;
mod events;
mod models;
mod post;
mod reply_target;
pub mod session;
pub mod thread;

pub use commands::AppCommand;
pub use error::{SessionError, ThreadError};
pub use events::ThreadEvent;
pub use models::{
    Actor, Comment, CommentId, Post, PostCategory, PostDraft, PostId, UserId, UserRole,
};
pub use post::ThreadAction;
pub use reply_target::{Composer, ReplyTarget};
