//! Request and response payloads for the control surface.
//!
//! Field names are the `snake_case` JSON the dashboard reads, so renaming
//! a field here is a breaking change for the front-end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ball::{Ball, BallStatus};
use crate::ids::BallId;

/// Public view of a single ball inside a [`JugglerSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BallView {
    /// Ball identifier.
    pub id: BallId,
    /// Current status.
    pub status: BallStatus,
    /// Flight duration in seconds (meaningful while in flight).
    pub flight_time: u32,
    /// Seconds elapsed in the current flight.
    pub elapsed: u32,
    /// When the ball was last thrown, if ever.
    pub start_time: Option<DateTime<Utc>>,
}

impl From<&Ball> for BallView {
    fn from(ball: &Ball) -> Self {
        Self {
            id: ball.id,
            status: ball.status,
            flight_time: ball.flight_duration_secs,
            elapsed: ball.elapsed_secs,
            start_time: ball.flight_start,
        }
    }
}

/// Full state of the simulation as served by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct JugglerSnapshot {
    /// Number of balls in hand.
    pub in_hand: u32,
    /// Number of balls in the air.
    pub in_air: u32,
    /// Every ball of the current generation, ordered by id.
    pub balls: Vec<BallView>,
    /// Whole seconds since the generation started; 0 when not running.
    #[ts(type = "number")]
    pub time_elapsed: u64,
    /// Whether the throw scheduler has terminated for this generation.
    pub is_finished: bool,
    /// Whether the generation is active and within its duration.
    pub is_running: bool,
    /// Configured number of balls.
    pub total_balls: u32,
    /// Configured duration in minutes.
    pub total_time: u32,
}

/// Request body for `POST /api/start`.
///
/// Signed so that negative input deserializes and is rejected by
/// validation with a meaningful error instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StartRequest {
    /// Number of balls to juggle.
    #[ts(type = "number")]
    pub total_balls: i64,
    /// How long to juggle, in minutes.
    #[ts(type = "number")]
    pub time_minutes: i64,
}

/// Outcome tag of a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ControlStatus {
    /// A new generation was configured and the scheduler started.
    Started,
    /// The scheduler was told to stop throwing.
    Stopped,
}

/// Response body for `POST /api/start` and `POST /api/stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ControlResponse {
    /// What happened.
    pub status: ControlStatus,
    /// Human-readable message for the dashboard.
    pub message: String,
}
