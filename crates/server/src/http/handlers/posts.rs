use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{AppCommand, Post, PostDraft, PostId};
use serde::Deserialize;

use super::saved_post;
use crate::{auth::CurrentUser, error::ApiError, state::AppState};

#[derive(Deserialize)]
pub struct BlockRequest {
    pub blocked: bool,
}

pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.store.list(actor.is_admin()).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<PostId>,
) -> Result<Json<Post>, ApiError> {
    match state.store.load(&post_id).await? {
        Some(post) if post.is_visible_to(&actor) => Ok(Json(post)),
        _ => Err(ApiError::NotFound(format!("post {} not found", post_id))),
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let outcome = state
        .dispatch(AppCommand::CreatePost { actor, draft })
        .await?;
    Ok((StatusCode::CREATED, saved_post(outcome)?))
}

pub async fn revise_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<PostId>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, ApiError> {
    let outcome = state
        .dispatch(AppCommand::RevisePost {
            actor,
            post_id,
            draft,
        })
        .await?;
    saved_post(outcome)
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<PostId>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(AppCommand::DeletePost { actor, post_id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<PostId>,
) -> Result<Json<Post>, ApiError> {
    let outcome = state
        .dispatch(AppCommand::TogglePostLike { actor, post_id })
        .await?;
    saved_post(outcome)
}

pub async fn block_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<PostId>,
    Json(payload): Json<BlockRequest>,
) -> Result<Json<Post>, ApiError> {
    let outcome = state
        .dispatch(AppCommand::SetPostBlocked {
            actor,
            post_id,
            blocked: payload.blocked,
        })
        .await?;
    saved_post(outcome)
}
