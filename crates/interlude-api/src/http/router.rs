//! Axum router configuration with middleware.
//!
//! Routes:
//! - `POST /start`
//! - `POST /chat/{thread_id}` (SSE) and `GET /chat/{thread_id}`
//! - `GET /health`
//!
//! Middleware: permissive CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/start", post(handlers::conversation::start))
        .route(
            "/chat/{thread_id}",
            post(handlers::chat::chat).get(handlers::conversation::get_conversation),
        )
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
