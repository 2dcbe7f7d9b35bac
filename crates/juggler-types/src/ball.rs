//! The ball entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::BallId;

/// Where a ball currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BallStatus {
    /// Resting in the juggler's hand, waiting to be thrown.
    InHand,
    /// Airborne, counting up towards its flight duration.
    InFlight,
    /// Reserved. No transition currently produces a dropped ball.
    Dropped,
}

impl BallStatus {
    /// The wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InHand => "in_hand",
            Self::InFlight => "in_flight",
            Self::Dropped => "dropped",
        }
    }
}

impl core::fmt::Display for BallStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single juggling ball.
///
/// Plain data: all transitions are made by the simulation state while it
/// holds its write lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    /// Identity within the current generation.
    pub id: BallId,
    /// Current status; agrees with the queue the ball sits in.
    pub status: BallStatus,
    /// Seconds the ball stays airborne, drawn at throw time.
    pub flight_duration_secs: u32,
    /// Seconds elapsed in the current flight. Zero while in hand.
    pub elapsed_secs: u32,
    /// Wall-clock time of the most recent throw.
    pub flight_start: Option<DateTime<Utc>>,
}

impl Ball {
    /// A fresh ball resting in hand that has never been thrown.
    pub const fn in_hand(id: BallId) -> Self {
        Self {
            id,
            status: BallStatus::InHand,
            flight_duration_secs: 0,
            elapsed_secs: 0,
            flight_start: None,
        }
    }
}
