use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use domain::{Actor, PostId, ThreadEvent};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::{auth::actor_from_token, error::ApiError, state::AppState};

#[derive(Deserialize)]
pub struct SseParams {
    /// `EventSource` cannot set headers, so the session token rides in the query.
    pub token: String,
}

pub async fn sse_handler(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Query(params): Query<SseParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let actor = actor_from_token(&params.token, &state.session_secret)?;
    let rx = state.tx_events.subscribe();
    tracing::info!("SSE Connected: post={} user={}", post_id, actor.id);

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.post_id() == &post_id => Some(to_sse(event, &actor)),
        Ok(_) => None,
        Err(_lagged) => {
            tracing::warn!("SSE Client lagged for post {}", post_id);
            None
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15))))
}

fn to_sse(event: ThreadEvent, actor: &Actor) -> Result<Event, axum::Error> {
    let (name, data) = frame(event, actor).map_err(|e| {
        tracing::error!("SSE serialization error: {}", e);
        axum::Error::new(e)
    })?;
    Ok(Event::default().event(name).data(data.to_string()))
}

/// Event name and payload sent to `actor`. A blocked post is reduced to its id
/// for anyone who may not see it.
fn frame(event: ThreadEvent, actor: &Actor) -> Result<(&'static str, Value), serde_json::Error> {
    Ok(match event {
        ThreadEvent::PostSaved { post } if post.is_visible_to(actor) => {
            ("post_saved", serde_json::to_value(post)?)
        }
        ThreadEvent::PostSaved { post } => ("post_blocked", json!({ "id": post.id })),
        ThreadEvent::PostDeleted { post_id } => ("post_deleted", json!({ "id": post_id })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{Post, PostCategory, PostDraft, UserRole};

    fn actor(id: &str, role: UserRole) -> Actor {
        Actor {
            id: id.into(),
            name: id.to_string(),
            role,
        }
    }

    fn post(blocked: bool) -> Post {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let draft = PostDraft {
            title: "Rendu TP2".into(),
            content: "Date limite ?".into(),
            category: PostCategory::Aide,
        };
        Post::new("post-7".into(), draft, &actor("alice", UserRole::Student), now)
            .with_blocked(blocked)
    }

    #[test]
    fn blocked_post_is_masked_for_students() {
        let saved = ThreadEvent::PostSaved { post: post(true) };
        let (name, data) = frame(saved, &actor("bob", UserRole::Student)).unwrap();
        assert_eq!(name, "post_blocked");
        assert_eq!(data, json!({ "id": "post-7" }));
    }

    #[test]
    fn blocked_post_is_sent_whole_to_admins() {
        let saved = ThreadEvent::PostSaved { post: post(true) };
        let (name, data) = frame(saved, &actor("root", UserRole::Admin)).unwrap();
        assert_eq!(name, "post_saved");
        assert_eq!(data["title"], "Rendu TP2");
        assert_eq!(data["blocked"], true);
    }

    #[test]
    fn visible_post_and_deletion() {
        let student = actor("bob", UserRole::Student);
        let (name, data) = frame(ThreadEvent::PostSaved { post: post(false) }, &student).unwrap();
        assert_eq!(name, "post_saved");
        assert_eq!(data["content"], "Date limite ?");

        let deleted = ThreadEvent::PostDeleted {
            post_id: "post-7".into(),
        };
        let (name, data) = frame(deleted, &student).unwrap();
        assert_eq!(name, "post_deleted");
        assert_eq!(data, json!({ "id": "post-7" }));
    }
}
