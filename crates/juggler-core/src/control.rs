//! Control contract between the transport layer and the simulation.
//!
//! [`Controller`] is what the HTTP handlers talk to. It validates
//! external input before anything reaches the [`Juggler`], so the core
//! only ever sees well-formed configuration.

use std::sync::Arc;

use juggler_types::JugglerSnapshot;
use tracing::{info, warn};

use crate::juggler::Juggler;

/// Largest ball count a start command may request. Every ball in the air
/// owns a timer task, so this bounds the tasks one request can spawn.
pub const MAX_BALLS: u32 = 1_000;

/// Errors returned by the control contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// Ball count or duration was non-positive or out of range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Validated configuration for a new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartParams {
    /// Number of balls.
    pub total_balls: u32,
    /// Duration in minutes.
    pub duration_minutes: u32,
}

impl StartParams {
    /// Validate raw values from a request.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidParameters`] if either value is not
    /// positive, if the ball count exceeds [`MAX_BALLS`], or if the
    /// duration does not fit in a `u32`.
    pub fn validate(total_balls: i64, duration_minutes: i64) -> Result<Self, ControlError> {
        if total_balls <= 0 || duration_minutes <= 0 {
            return Err(ControlError::InvalidParameters(String::from(
                "balls and time must be positive",
            )));
        }
        let total_balls = u32::try_from(total_balls)
            .ok()
            .filter(|n| *n <= MAX_BALLS)
            .ok_or_else(|| {
                ControlError::InvalidParameters(format!("at most {MAX_BALLS} balls"))
            })?;
        let duration_minutes = u32::try_from(duration_minutes).map_err(|e| {
            ControlError::InvalidParameters(format!("time out of range: {e}"))
        })?;
        Ok(Self {
            total_balls,
            duration_minutes,
        })
    }
}

/// Entry point for start/stop commands and snapshot queries.
#[derive(Debug, Clone)]
pub struct Controller {
    juggler: Arc<Juggler>,
}

impl Controller {
    /// Wrap a shared juggler.
    pub const fn new(juggler: Arc<Juggler>) -> Self {
        Self { juggler }
    }

    /// The juggler this controller drives.
    pub const fn juggler(&self) -> &Arc<Juggler> {
        &self.juggler
    }

    /// Validate, reset the juggler to a new generation, and start its
    /// throw scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidParameters`] without touching the
    /// juggler if the values are not acceptable.
    pub async fn configure_and_start(
        &self,
        total_balls: i64,
        duration_minutes: i64,
    ) -> Result<StartParams, ControlError> {
        let params = StartParams::validate(total_balls, duration_minutes).inspect_err(|e| {
            warn!(total_balls, duration_minutes, error = %e, "Rejected start request");
        })?;

        let generation = self
            .juggler
            .reset(params.total_balls, params.duration_minutes)
            .await;
        // Detached: the scheduler ends on its own when time is up, on
        // stop, or when a later reset supersedes it.
        drop(self.juggler.start(generation));

        info!(
            total_balls = params.total_balls,
            duration_minutes = params.duration_minutes,
            "Juggling started"
        );
        Ok(params)
    }

    /// Stop throwing. Always succeeds.
    pub async fn request_stop(&self) {
        self.juggler.stop().await;
    }

    /// Current state for the dashboard.
    pub async fn query_snapshot(&self) -> JugglerSnapshot {
        self.juggler.snapshot().await
    }
}
