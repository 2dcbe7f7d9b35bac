//! Axum router construction for the control surface.
//!
//! Assembles all routes into a single [`Router`] with request tracing and
//! CORS middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- dashboard page
/// - `GET /api/stats` -- current snapshot
/// - `POST /api/start` -- start a new generation
/// - `POST /api/stop` -- stop throwing
///
/// Any other method on these paths is answered with
/// `405 Method Not Allowed` by the router itself.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/start", post(handlers::start))
        .route("/api/stop", post(handlers::stop))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
