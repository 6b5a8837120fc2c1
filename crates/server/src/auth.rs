use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use domain::{session, Actor};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// The caller, as proven by a signed `Authorization: Bearer` session token.
pub struct CurrentUser(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".into()))?;

        actor_from_token(token, &state.session_secret).map(CurrentUser)
    }
}

pub fn actor_from_token(token: &str, secret: &str) -> Result<Actor, ApiError> {
    session::verify(token, secret).map_err(|e| {
        warn!("Rejected session token: {}", e);
        ApiError::Unauthorized(e.to_string())
    })
}
