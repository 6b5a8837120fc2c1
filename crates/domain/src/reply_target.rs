use serde::{Deserialize, Serialize};

use crate::error::ThreadError;
use crate::models::{Actor, Comment, CommentId};
use crate::post::ThreadAction;

/// What the next submission of the comment box will do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReplyTarget {
    /// New root reply.
    #[default]
    Idle,
    Replying {
        comment_id: CommentId,
        author_name: String,
    },
    Editing {
        comment_id: CommentId,
    },
}

/// Comment box state: the pending target plus the text typed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    target: ReplyTarget,
    input: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> &ReplyTarget {
        &self.target
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn reply_to(&mut self, comment: &Comment) {
        if matches!(self.target, ReplyTarget::Editing { .. }) {
            self.input.clear();
        }
        self.target = ReplyTarget::Replying {
            comment_id: comment.id.clone(),
            author_name: comment.author_name.clone(),
        };
    }

    /// Switches to editing `comment` and pre-fills the input with its content.
    pub fn edit(&mut self, comment: &Comment, actor: &Actor) -> Result<(), ThreadError> {
        if comment.author_id != actor.id {
            return Err(ThreadError::Forbidden("edit this comment"));
        }
        self.target = ReplyTarget::Editing {
            comment_id: comment.id.clone(),
        };
        self.input = comment.content.clone();
        Ok(())
    }

    pub fn cancel(&mut self) {
        if matches!(self.target, ReplyTarget::Editing { .. }) {
            self.input.clear();
        }
        self.target = ReplyTarget::Idle;
    }

    /// Turns the current input into an action and resets to `Idle`.
    ///
    /// Blank input produces nothing and leaves the state as it was.
    pub fn submit(&mut self) -> Option<ThreadAction> {
        if self.input.trim().is_empty() {
            return None;
        }
        let content = std::mem::take(&mut self.input);
        let action = match std::mem::take(&mut self.target) {
            ReplyTarget::Idle => ThreadAction::AddReply {
                reply_to: None,
                content,
            },
            ReplyTarget::Replying { comment_id, .. } => ThreadAction::AddReply {
                reply_to: Some(comment_id),
                content,
            },
            ReplyTarget::Editing { comment_id } => ThreadAction::EditComment {
                comment_id,
                content,
            },
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::NaiveDate;

    fn actor(id: &str) -> Actor {
        Actor {
            id: id.into(),
            name: format!("{} name", id),
            role: UserRole::Student,
        }
    }

    fn comment(id: &str, author: &Actor) -> Comment {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Comment::new(id.into(), author, "original", ts)
    }

    #[test]
    fn idle_submission_is_root_reply() {
        let mut composer = Composer::new();
        composer.set_input("Bonjour");
        assert_eq!(
            composer.submit(),
            Some(ThreadAction::AddReply {
                reply_to: None,
                content: "Bonjour".into()
            })
        );
        assert_eq!(composer.target(), &ReplyTarget::Idle);
        assert_eq!(composer.input(), "");
    }

    #[test]
    fn reply_then_submit_nests_and_resets() {
        let alice = actor("alice");
        let target = comment("c1", &alice);
        let mut composer = Composer::new();

        composer.reply_to(&target);
        assert_eq!(
            composer.target(),
            &ReplyTarget::Replying {
                comment_id: "c1".into(),
                author_name: "alice name".into()
            }
        );
        composer.set_input("D'accord");
        assert_eq!(
            composer.submit(),
            Some(ThreadAction::AddReply {
                reply_to: Some("c1".into()),
                content: "D'accord".into()
            })
        );
        assert_eq!(composer.target(), &ReplyTarget::Idle);
    }

    #[test]
    fn edit_prefills_and_submits_update() {
        let alice = actor("alice");
        let target = comment("c1", &alice);
        let mut composer = Composer::new();

        composer.edit(&target, &alice).unwrap();
        assert_eq!(composer.input(), "original");
        composer.set_input("corrected");
        assert_eq!(
            composer.submit(),
            Some(ThreadAction::EditComment {
                comment_id: "c1".into(),
                content: "corrected".into()
            })
        );
        assert_eq!(composer.target(), &ReplyTarget::Idle);
    }

    #[test]
    fn edit_refused_for_other_authors() {
        let alice = actor("alice");
        let bob = actor("bob");
        let mut composer = Composer::new();
        assert!(composer.edit(&comment("c1", &alice), &bob).is_err());
        assert_eq!(composer.target(), &ReplyTarget::Idle);
    }

    #[test]
    fn modes_are_exclusive() {
        let alice = actor("alice");
        let first = comment("c1", &alice);
        let second = comment("c2", &alice);
        let mut composer = Composer::new();

        composer.edit(&first, &alice).unwrap();
        composer.reply_to(&second);
        assert!(matches!(composer.target(), ReplyTarget::Replying { .. }));
        assert_eq!(composer.input(), "");
    }

    #[test]
    fn cancel_returns_to_idle() {
        let alice = actor("alice");
        let mut composer = Composer::new();
        composer.edit(&comment("c1", &alice), &alice).unwrap();
        composer.cancel();
        assert_eq!(composer.target(), &ReplyTarget::Idle);
        assert_eq!(composer.input(), "");
    }

    #[test]
    fn blank_submit_keeps_state() {
        let alice = actor("alice");
        let mut composer = Composer::new();
        composer.reply_to(&comment("c1", &alice));
        composer.set_input("  ");
        assert_eq!(composer.submit(), None);
        assert!(matches!(composer.target(), ReplyTarget::Replying { .. }));
    }
}
