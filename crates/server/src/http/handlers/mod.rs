pub mod comments;
pub mod posts;
pub mod sse;

use adapter::Outcome;
use axum::Json;
use domain::Post;

use crate::error::ApiError;

fn saved_post(outcome: Outcome) -> Result<Json<Post>, ApiError> {
    match outcome {
        Outcome::Saved(post) => Ok(Json(post)),
        Outcome::Deleted(id) => Err(ApiError::NotFound(format!("post {} was deleted", id))),
    }
}
