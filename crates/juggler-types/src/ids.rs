//! Type-safe identifier wrappers.
//!
//! Ball ids are small sequential integers assigned per generation starting
//! at 1. Generation ids are a process-wide monotonic counter bumped by
//! every reset. Keeping them as distinct newtypes prevents passing one
//! where the other is expected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a ball, unique within one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct BallId(pub u32);

impl BallId {
    /// The id given to the first ball of every generation.
    pub const FIRST: Self = Self(1);

    /// Return the id that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Return the inner integer value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for BallId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier of a simulation generation.
///
/// Generation 0 is the empty state a juggler is constructed with; each
/// reset moves to the next generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(pub u64);

impl GenerationId {
    /// Return the generation that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for GenerationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
