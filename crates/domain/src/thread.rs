//! Copy-on-write mutations over a comment tree.
//!
//! Every function takes the current root sequence by reference and returns a
//! new one; the input is left untouched so older snapshots stay valid. A
//! target id that does not occur in the tree is a silent no-op.

use crate::models::{Comment, CommentId, UserId};

pub fn find<'a>(comments: &'a [Comment], id: &CommentId) -> Option<&'a Comment> {
    for c in comments {
        if c.id == *id {
            return Some(c);
        }
        if let Some(res) = find(&c.replies, id) {
            return Some(res);
        }
    }
    None
}

fn find_mut<'a>(comments: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
    for c in comments.iter_mut() {
        if c.id == *id {
            return Some(c);
        }
        if let Some(res) = find_mut(&mut c.replies, id) {
            return Some(res);
        }
    }
    None
}

fn remove_in(comments: &mut Vec<Comment>, id: &CommentId) -> Option<Comment> {
    if let Some(pos) = comments.iter().position(|c| c.id == *id) {
        return Some(comments.remove(pos));
    }
    comments
        .iter_mut()
        .find_map(|c| remove_in(&mut c.replies, id))
}

/// Total node count of the tree, root replies included.
pub fn count(comments: &[Comment]) -> usize {
    comments.iter().map(|c| 1 + c.descendant_count()).sum()
}

/// Appends `new` at the end of the root list, or at the end of the target's replies.
pub fn insert(roots: &[Comment], target: Option<&CommentId>, new: Comment) -> Vec<Comment> {
    let mut out = roots.to_vec();
    match target {
        None => out.push(new),
        Some(id) => {
            if let Some(parent) = find_mut(&mut out, id) {
                parent.replies.push(new);
            }
        }
    }
    out
}

/// Replaces the content of the target; every other field is preserved.
pub fn update(roots: &[Comment], target: &CommentId, content: &str) -> Vec<Comment> {
    let mut out = roots.to_vec();
    if let Some(node) = find_mut(&mut out, target) {
        node.content = content.to_string();
    }
    out
}

/// Removes the target and its whole subtree.
///
/// Returns the new tree together with `1 + descendants` of the removed node,
/// or `0` when nothing matched.
pub fn delete(roots: &[Comment], target: &CommentId) -> (Vec<Comment>, usize) {
    let mut out = roots.to_vec();
    match remove_in(&mut out, target) {
        Some(removed) => (out, 1 + removed.descendant_count()),
        None => (out, 0),
    }
}

/// Flips `user`'s like on the target. The count never drops below zero.
pub fn toggle_like(roots: &[Comment], target: &CommentId, user: &UserId) -> Vec<Comment> {
    let mut out = roots.to_vec();
    if let Some(node) = find_mut(&mut out, target) {
        flip_like(&mut node.likes, &mut node.liked_by, user);
    }
    out
}

pub(crate) fn flip_like(
    likes: &mut u32,
    liked_by: &mut std::collections::BTreeSet<UserId>,
    user: &UserId,
) {
    if liked_by.remove(user) {
        *likes = likes.saturating_sub(1);
    } else {
        liked_by.insert(user.clone());
        *likes = likes.saturating_add(1);
    }
}
