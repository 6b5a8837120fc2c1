use super::handlers::{comments, posts, sse};
use crate::state::AppState;
use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(METHODS).allow_headers(Any);
    if allowed_origins == "*" {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        base.allow_origin(Any)
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        base.allow_origin(origins)
    }
}

/// Request span without the query string, which carries the SSE session token.
fn request_span(req: &Request) -> tracing::Span {
    tracing::debug_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        version = ?req.version(),
    )
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/:post_id",
            get(posts::get_post)
                .put(posts::revise_post)
                .delete(posts::delete_post),
        )
        .route("/api/posts/:post_id/like", post(posts::like_post))
        .route("/api/posts/:post_id/block", post(posts::block_post))
        .route("/api/posts/:post_id/comments", post(comments::add_comment))
        .route(
            "/api/posts/:post_id/comments/:comment_id",
            put(comments::edit_comment).delete(comments::delete_comment),
        )
        .route(
            "/api/posts/:post_id/comments/:comment_id/like",
            post(comments::like_comment),
        )
        .route("/api/posts/:post_id/sse", get(sse::sse_handler))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
