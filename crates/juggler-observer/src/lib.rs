//! HTTP control surface for the juggler simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Control endpoints** to start a new generation and to stop throwing
//! - **A stats endpoint** returning a consistent snapshot of every ball
//! - **An HTML dashboard** (`GET /`) that polls the stats once a second
//!
//! # Architecture
//!
//! Handlers never touch the juggler directly. They go through the
//! [`Controller`](juggler_core::Controller) held in [`AppState`], which
//! validates input before it reaches the core. Reads take only the shared
//! half of the juggler's lock, so frequent polling does not stall the
//! throw scheduler or the flight timers.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, shutdown_signal, start_server};
pub use state::AppState;
