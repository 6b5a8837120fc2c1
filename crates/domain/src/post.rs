use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ThreadError;
use crate::models::{Actor, Comment, CommentId, Post, PostDraft, PostId, UserId};
use crate::thread;

/// A mutation of a post's discussion tree, as requested by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ThreadAction {
    AddReply {
        reply_to: Option<CommentId>,
        content: String,
    },
    EditComment {
        comment_id: CommentId,
        content: String,
    },
    DeleteComment {
        comment_id: CommentId,
    },
    ToggleLike {
        comment_id: CommentId,
    },
}

impl Post {
    pub fn new(id: PostId, draft: PostDraft, author: &Actor, now: NaiveDateTime) -> Self {
        Self {
            id,
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            likes: 0,
            liked_by: BTreeSet::new(),
            comments: 0,
            replies: Vec::new(),
            blocked: false,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn revise(&self, draft: PostDraft, now: NaiveDateTime) -> Post {
        Post {
            title: draft.title,
            content: draft.content,
            category: draft.category,
            updated_at: Some(now),
            ..self.clone()
        }
    }

    pub fn toggle_post_like(&self, user: &UserId) -> Post {
        let mut next = self.clone();
        thread::flip_like(&mut next.likes, &mut next.liked_by, user);
        next
    }

    pub fn with_blocked(&self, blocked: bool) -> Post {
        Post {
            blocked,
            ..self.clone()
        }
    }

    /// Blocked posts are only shown to admins.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        !self.blocked || actor.is_admin()
    }

    /// Post-level edit and delete rights.
    pub fn can_manage(&self, actor: &Actor) -> bool {
        self.author_id == actor.id || actor.is_admin()
    }

    pub fn find_comment(&self, id: &CommentId) -> Option<&Comment> {
        thread::find(&self.replies, id)
    }

    // --- total operations ---

    /// Adds a comment at the root, or under `target` when given.
    /// A missing target leaves the post unchanged.
    pub fn add_reply(
        &self,
        target: Option<&CommentId>,
        content: &str,
        author: &Actor,
        id: CommentId,
        created_at: NaiveDateTime,
    ) -> Post {
        if let Some(t) = target {
            if self.find_comment(t).is_none() {
                return self.clone();
            }
        }
        let comment = Comment::new(id, author, content, created_at);
        Post {
            replies: thread::insert(&self.replies, target, comment),
            comments: self.comments.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn edit_comment(&self, target: &CommentId, content: &str) -> Post {
        Post {
            replies: thread::update(&self.replies, target, content),
            ..self.clone()
        }
    }

    pub fn delete_comment(&self, target: &CommentId) -> Post {
        let (replies, removed) = thread::delete(&self.replies, target);
        let removed = u32::try_from(removed).unwrap_or(u32::MAX);
        Post {
            replies,
            comments: self.comments.saturating_sub(removed),
            ..self.clone()
        }
    }

    pub fn toggle_like(&self, target: &CommentId, user: &UserId) -> Post {
        Post {
            replies: thread::toggle_like(&self.replies, target, user),
            ..self.clone()
        }
    }

    // --- checked entry point ---

    /// Applies `action` on behalf of `actor`, refusing what the total
    /// operations would silently ignore.
    ///
    /// `mint` supplies the id and timestamp of a new comment and is only
    /// called for `AddReply`.
    pub fn apply(
        &self,
        action: &ThreadAction,
        actor: &Actor,
        mint: impl FnOnce() -> (CommentId, NaiveDateTime),
    ) -> Result<Post, ThreadError> {
        if self.blocked && !actor.is_admin() {
            return Err(ThreadError::PostBlocked);
        }

        match action {
            ThreadAction::AddReply { reply_to, content } => {
                let content = non_blank(content)?;
                if let Some(target) = reply_to {
                    self.require(target)?;
                }
                let (id, created_at) = mint();
                Ok(self.add_reply(reply_to.as_ref(), content, actor, id, created_at))
            }
            ThreadAction::EditComment {
                comment_id,
                content,
            } => {
                let content = non_blank(content)?;
                let target = self.require(comment_id)?;
                if target.author_id != actor.id {
                    return Err(ThreadError::Forbidden("edit this comment"));
                }
                Ok(self.edit_comment(comment_id, content))
            }
            ThreadAction::DeleteComment { comment_id } => {
                let target = self.require(comment_id)?;
                if target.author_id != actor.id {
                    return Err(ThreadError::Forbidden("delete this comment"));
                }
                Ok(self.delete_comment(comment_id))
            }
            ThreadAction::ToggleLike { comment_id } => {
                self.require(comment_id)?;
                Ok(self.toggle_like(comment_id, &actor.id))
            }
        }
    }

    fn require(&self, id: &CommentId) -> Result<&Comment, ThreadError> {
        self.find_comment(id)
            .ok_or_else(|| ThreadError::CommentNotFound(id.clone()))
    }
}

fn non_blank(content: &str) -> Result<&str, ThreadError> {
    if content.trim().is_empty() {
        Err(ThreadError::EmptyContent)
    } else {
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostCategory, UserRole};
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn user(id: &str, role: UserRole) -> Actor {
        Actor {
            id: id.into(),
            name: format!("User {}", id),
            role,
        }
    }

    fn empty_post() -> Post {
        let draft = PostDraft {
            title: "Projet de fin d'année".into(),
            content: "Qui a des retours ?".into(),
            category: PostCategory::Discussion,
        };
        Post::new("post-1".into(), draft, &user("owner", UserRole::Student), ts())
    }

    fn minted(id: &str) -> impl FnOnce() -> (CommentId, NaiveDateTime) + '_ {
        move || (CommentId::from(id), ts())
    }

    #[test]
    fn walkthrough() {
        let a = user("a", UserRole::Student);
        let b = user("b", UserRole::Student);

        // 1. root reply
        let post = empty_post();
        assert_eq!(post.comments, 0);
        let post = post.add_reply(None, "Hello", &a, "hello".into(), ts());
        assert_eq!(post.comments, 1);
        assert_eq!(post.replies.len(), 1);

        // 2. nested reply
        let hello = CommentId::from("hello");
        let post = post.add_reply(Some(&hello), "Nice point", &b, "nice".into(), ts());
        assert_eq!(post.comments, 2);
        assert_eq!(post.replies[0].replies[0].content, "Nice point");

        // 3. like / unlike
        let post = post.toggle_like(&hello, &b.id);
        assert_eq!(post.replies[0].likes, 1);
        assert!(post.replies[0].is_liked_by(&b.id));
        let post = post.toggle_like(&hello, &b.id);
        assert_eq!(post.replies[0].likes, 0);
        assert!(post.replies[0].liked_by.is_empty());

        // 4. cascade delete
        let post = post.delete_comment(&hello);
        assert_eq!(post.comments, 0);
        assert!(post.replies.is_empty());

        // 5. edit of a missing comment
        let again = post.edit_comment(&"ghost".into(), "new text");
        assert_eq!(again, post);
    }

    #[test]
    fn counter_matches_tree_after_every_step() {
        let a = user("a", UserRole::Student);
        let mut post = empty_post();
        let mut ids: Vec<CommentId> = Vec::new();

        for i in 0..30 {
            let id = CommentId::new(format!("c{}", i));
            let parent = match i % 3 {
                0 => None,
                _ => ids.get(i / 2).cloned(),
            };
            post = post.add_reply(parent.as_ref(), "x", &a, id.clone(), ts());
            ids.push(id);
            assert_eq!(post.comments as usize, thread::count(&post.replies));

            if i % 7 == 6 {
                post = post.delete_comment(&ids[i / 3]);
                assert_eq!(post.comments as usize, thread::count(&post.replies));
            }
        }
    }

    #[test]
    fn delete_decrements_by_subtree_size() {
        let a = user("a", UserRole::Student);
        let post = empty_post()
            .add_reply(None, "root", &a, "r".into(), ts())
            .add_reply(Some(&"r".into()), "child", &a, "c1".into(), ts())
            .add_reply(Some(&"c1".into()), "grandchild", &a, "g1".into(), ts())
            .add_reply(Some(&"r".into()), "child 2", &a, "c2".into(), ts())
            .add_reply(None, "other", &a, "o".into(), ts());
        assert_eq!(post.comments, 5);

        let after = post.delete_comment(&"r".into());
        assert_eq!(after.comments, 1);
        assert!(after.find_comment(&"g1".into()).is_none());
        assert!(after.find_comment(&"o".into()).is_some());
    }

    #[test]
    fn missing_targets_leave_counter_alone() {
        let a = user("a", UserRole::Student);
        let post = empty_post().add_reply(None, "root", &a, "r".into(), ts());
        let ghost = CommentId::from("ghost");

        assert_eq!(post.add_reply(Some(&ghost), "x", &a, "n".into(), ts()), post);
        assert_eq!(post.edit_comment(&ghost, "x"), post);
        assert_eq!(post.delete_comment(&ghost), post);
        assert_eq!(post.toggle_like(&ghost, &a.id), post);
    }

    #[test]
    fn apply_rejects_non_author_edit_and_delete() {
        let a = user("a", UserRole::Student);
        let b = user("b", UserRole::Lecturer);
        let post = empty_post().add_reply(None, "mine", &a, "r".into(), ts());

        let edit = ThreadAction::EditComment {
            comment_id: "r".into(),
            content: "hijacked".into(),
        };
        assert_eq!(
            post.apply(&edit, &b, minted("unused")),
            Err(ThreadError::Forbidden("edit this comment"))
        );

        let delete = ThreadAction::DeleteComment {
            comment_id: "r".into(),
        };
        assert!(matches!(
            post.apply(&delete, &b, minted("unused")),
            Err(ThreadError::Forbidden(_))
        ));

        let edited = post.apply(&edit, &a, minted("unused")).unwrap();
        assert_eq!(edited.replies[0].content, "hijacked");
    }

    #[test]
    fn apply_reports_missing_comment() {
        let a = user("a", UserRole::Student);
        let post = empty_post();
        let action = ThreadAction::AddReply {
            reply_to: Some("ghost".into()),
            content: "hi".into(),
        };
        assert_eq!(
            post.apply(&action, &a, minted("c")),
            Err(ThreadError::CommentNotFound("ghost".into()))
        );
    }

    #[test]
    fn apply_rejects_blank_content() {
        let a = user("a", UserRole::Student);
        let action = ThreadAction::AddReply {
            reply_to: None,
            content: "   \n".into(),
        };
        assert_eq!(
            empty_post().apply(&action, &a, minted("c")),
            Err(ThreadError::EmptyContent)
        );
    }

    #[test]
    fn blocked_post_is_read_only_except_for_admins() {
        let student = user("s", UserRole::Student);
        let admin = user("root", UserRole::Admin);
        let post = empty_post().with_blocked(true);
        let action = ThreadAction::AddReply {
            reply_to: None,
            content: "hello".into(),
        };

        assert_eq!(
            post.apply(&action, &student, minted("c")),
            Err(ThreadError::PostBlocked)
        );
        let after = post.apply(&action, &admin, minted("c")).unwrap();
        assert_eq!(after.comments, 1);

        assert!(!post.is_visible_to(&student));
        assert!(post.is_visible_to(&admin));
    }

    #[test]
    fn post_like_clamps_and_tracks_users() {
        let a = user("a", UserRole::Student);
        let post = empty_post().toggle_post_like(&a.id);
        assert_eq!(post.likes, 1);
        let post = post.toggle_post_like(&a.id);
        assert_eq!(post.likes, 0);
        assert!(post.liked_by.is_empty());
    }

    #[test]
    fn reply_on_saturated_counter_does_not_overflow() {
        let mut post = empty_post();
        post.comments = u32::MAX;
        let post = post.add_reply(None, "encore", &user("a", UserRole::Student), "c-max".into(), ts());
        assert_eq!(post.comments, u32::MAX);
        assert_eq!(post.replies.len(), 1);
    }

    #[test]
    fn revise_keeps_thread() {
        let a = user("a", UserRole::Student);
        let post = empty_post().add_reply(None, "root", &a, "r".into(), ts());
        let draft = PostDraft {
            title: "Nouveau titre".into(),
            content: "Corps".into(),
            category: PostCategory::Aide,
        };
        let revised = post.revise(draft, ts());
        assert_eq!(revised.title, "Nouveau titre");
        assert_eq!(revised.category, PostCategory::Aide);
        assert_eq!(revised.replies, post.replies);
        assert_eq!(revised.comments, 1);
        assert_eq!(revised.updated_at, Some(ts()));
    }

    #[test]
    fn action_wire_format() {
        let action: ThreadAction = serde_json::from_str(
            r#"{"type":"addReply","replyTo":"c-1","content":"Merci"}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            ThreadAction::AddReply {
                reply_to: Some("c-1".into()),
                content: "Merci".into()
            }
        );
    }
}
