use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{AppCommand, CommentId, Post, PostId, ThreadAction};
use serde::Deserialize;

use super::saved_post;
use crate::{auth::CurrentUser, error::ApiError, state::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub reply_to: Option<CommentId>,
}

#[derive(Deserialize)]
pub struct EditCommentRequest {
    pub content: String,
}

async fn run_action(
    state: &AppState,
    actor: domain::Actor,
    post_id: PostId,
    action: ThreadAction,
) -> Result<Json<Post>, ApiError> {
    let outcome = state
        .dispatch(AppCommand::Thread {
            actor,
            post_id,
            action,
        })
        .await?;
    saved_post(outcome)
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<PostId>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let action = ThreadAction::AddReply {
        reply_to: payload.reply_to,
        content: payload.content,
    };
    let post = run_action(&state, actor, post_id, action).await?;
    Ok((StatusCode::CREATED, post))
}

pub async fn edit_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
    Json(payload): Json<EditCommentRequest>,
) -> Result<Json<Post>, ApiError> {
    let action = ThreadAction::EditComment {
        comment_id,
        content: payload.content,
    };
    run_action(&state, actor, post_id, action).await
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
) -> Result<Json<Post>, ApiError> {
    run_action(
        &state,
        actor,
        post_id,
        ThreadAction::DeleteComment { comment_id },
    )
    .await
}

pub async fn like_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
) -> Result<Json<Post>, ApiError> {
    run_action(
        &state,
        actor,
        post_id,
        ThreadAction::ToggleLike { comment_id },
    )
    .await
}
