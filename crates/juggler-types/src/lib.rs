//! Shared type definitions for the juggler simulation.
//!
//! This crate holds the passive data types used across the workspace: the
//! ball entity, its status, and the JSON payloads exchanged with the
//! dashboard. Types flow downstream to `TypeScript` via `ts-rs` so the
//! front-end and the server agree on the wire shapes.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers for balls and generations
//! - [`ball`] -- The [`Ball`] entity and its [`BallStatus`]
//! - [`api`] -- Request/response payloads for the control surface

pub mod api;
pub mod ball;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use api::{BallView, ControlResponse, ControlStatus, JugglerSnapshot, StartRequest};
pub use ball::{Ball, BallStatus};
pub use ids::{BallId, GenerationId};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::BallId::export_all();
        let _ = crate::ball::BallStatus::export_all();
        let _ = crate::api::BallView::export_all();
        let _ = crate::api::JugglerSnapshot::export_all();
        let _ = crate::api::StartRequest::export_all();
        let _ = crate::api::ControlResponse::export_all();
    }
}
