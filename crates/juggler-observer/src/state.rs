//! Shared application state for the control surface.

use std::sync::Arc;

use juggler_core::{Controller, Juggler};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Every
/// handler reaches the simulation through the [`Controller`].
#[derive(Debug, Clone)]
pub struct AppState {
    /// Validated entry point to the juggler.
    pub controller: Controller,
}

impl AppState {
    /// Create application state around an existing juggler.
    pub const fn new(juggler: Arc<Juggler>) -> Self {
        Self {
            controller: Controller::new(juggler),
        }
    }

    /// The juggler behind the controller.
    pub const fn juggler(&self) -> &Arc<Juggler> {
        self.controller.juggler()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(Juggler::default()))
    }
}
