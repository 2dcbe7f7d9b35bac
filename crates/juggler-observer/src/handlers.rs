//! REST API endpoint handlers for the control surface.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML dashboard |
//! | `GET` | `/api/stats` | Current [`JugglerSnapshot`] |
//! | `POST` | `/api/start` | Configure a new generation and start throwing |
//! | `POST` | `/api/stop` | Stop throwing |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{Html, IntoResponse};
use juggler_types::{ControlResponse, ControlStatus, JugglerSnapshot, StartRequest};

use crate::error::ObserverError;
use crate::state::AppState;

/// The dashboard page. Static; it polls `/api/stats` for live data.
const DASHBOARD_HTML: &str = include_str!("../static/index.html");

// ---------------------------------------------------------------------------
// GET / -- dashboard
// ---------------------------------------------------------------------------

/// Serve the single-page dashboard.
pub async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// GET /api/stats
// ---------------------------------------------------------------------------

/// Return the current snapshot: counts, every ball, and run status.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<JugglerSnapshot> {
    Json(state.controller.query_snapshot().await)
}

// ---------------------------------------------------------------------------
// POST /api/start
// ---------------------------------------------------------------------------

/// Start a new generation with the requested ball count and duration.
///
/// Any running generation is replaced. Malformed bodies and non-positive
/// values are rejected with `400 Bad Request`.
pub async fn start(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(req) = payload?;

    let params = state
        .controller
        .configure_and_start(req.total_balls, req.time_minutes)
        .await?;

    Ok(Json(ControlResponse {
        status: ControlStatus::Started,
        message: format!(
            "Juggling started with {} balls for {} minutes",
            params.total_balls, params.duration_minutes
        ),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/stop
// ---------------------------------------------------------------------------

/// Stop throwing. Balls in flight still land. Always succeeds.
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    state.controller.request_stop().await;

    Json(ControlResponse {
        status: ControlStatus::Stopped,
        message: String::from("Juggling stopped"),
    })
}
