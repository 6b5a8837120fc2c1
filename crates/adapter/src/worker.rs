use domain::{AppCommand, Post, PostDraft, PostId, ThreadEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::ids::{new_comment_id, new_post_id, now};
use crate::traits::PostStore;
use crate::{CommandEnvelope, DispatchError, Outcome};

/// Single consumer of the command queue: each command is loaded, applied,
/// persisted and broadcast before the next one is read.
pub async fn run(
    store: Arc<dyn PostStore>,
    mut rx_cmd: mpsc::Receiver<CommandEnvelope>,
    tx_events: broadcast::Sender<ThreadEvent>,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    info!("Thread worker started");
    loop {
        tokio::select! {
            cmd_opt = rx_cmd.recv() => {
                let envelope = match cmd_opt {
                    Some(e) => e,
                    None => break,
                };
                let CommandEnvelope { cmd, resp } = envelope;
                let actor_id = cmd.actor().id.clone();
                let target = cmd
                    .post_id()
                    .map_or_else(|| "<new post>".to_string(), |id| id.to_string());

                let result = execute(store.as_ref(), cmd).await;
                match &result {
                    Ok(outcome) => {
                        // no subscribers is fine
                        let _ = tx_events.send(outcome.to_event());
                    }
                    Err(DispatchError::Storage(e)) => {
                        error!("Storage failure on {} (actor {}): {:?}", target, actor_id, e)
                    }
                    Err(e) => warn!("Command by {} on {} rejected: {}", actor_id, target, e),
                }

                if resp.send(result).is_err() {
                    warn!("Command caller went away before the reply");
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Thread worker shutting down");
                break;
            }
        }
    }
    Ok(())
}

async fn execute(store: &dyn PostStore, cmd: AppCommand) -> Result<Outcome, DispatchError> {
    match cmd {
        AppCommand::CreatePost { actor, draft } => {
            let draft = checked_draft(draft)?;
            let post = Post::new(new_post_id(), draft, &actor, now());
            store.save(&post).await?;
            info!("Post {} created by {}", post.id, actor.id);
            Ok(Outcome::Saved(post))
        }
        AppCommand::RevisePost {
            actor,
            post_id,
            draft,
        } => {
            let post = load(store, &post_id).await?;
            if post.author_id != actor.id {
                return Err(DispatchError::Forbidden("edit"));
            }
            if post.blocked && !actor.is_admin() {
                return Err(domain::ThreadError::PostBlocked.into());
            }
            let post = post.revise(checked_draft(draft)?, now());
            store.save(&post).await?;
            Ok(Outcome::Saved(post))
        }
        AppCommand::DeletePost { actor, post_id } => {
            let post = load(store, &post_id).await?;
            if !post.can_manage(&actor) {
                return Err(DispatchError::Forbidden("delete"));
            }
            if !store.remove(&post_id).await? {
                return Err(DispatchError::PostNotFound(post_id));
            }
            info!("Post {} deleted by {}", post_id, actor.id);
            Ok(Outcome::Deleted(post_id))
        }
        AppCommand::SetPostBlocked {
            actor,
            post_id,
            blocked,
        } => {
            if !actor.is_admin() {
                return Err(DispatchError::Forbidden("moderate"));
            }
            let post = load(store, &post_id).await?.with_blocked(blocked);
            store.save(&post).await?;
            info!("Post {} blocked={} by {}", post_id, blocked, actor.id);
            Ok(Outcome::Saved(post))
        }
        AppCommand::TogglePostLike { actor, post_id } => {
            let post = load(store, &post_id).await?;
            if post.blocked && !actor.is_admin() {
                return Err(domain::ThreadError::PostBlocked.into());
            }
            let post = post.toggle_post_like(&actor.id);
            store.save(&post).await?;
            Ok(Outcome::Saved(post))
        }
        AppCommand::Thread {
            actor,
            post_id,
            action,
        } => {
            let post = load(store, &post_id).await?;
            let post = post.apply(&action, &actor, || (new_comment_id(), now()))?;
            store.save(&post).await?;
            Ok(Outcome::Saved(post))
        }
    }
}

async fn load(store: &dyn PostStore, id: &PostId) -> Result<Post, DispatchError> {
    store
        .load(id)
        .await?
        .ok_or_else(|| DispatchError::PostNotFound(id.clone()))
}

fn checked_draft(draft: PostDraft) -> Result<PostDraft, DispatchError> {
    if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
        return Err(DispatchError::EmptyPost);
    }
    Ok(draft)
}
