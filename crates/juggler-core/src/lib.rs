//! Ball/flight state machine and throw scheduling for the juggler simulation.
//!
//! A juggler holds a fixed set of balls for one *generation*. A throw
//! scheduler wakes every half second and throws every ball in hand; each
//! thrown ball gets its own flight timer that counts seconds and catches
//! the ball when its randomly drawn flight duration is reached.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `juggler-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`Controller`], the validated start/stop/snapshot
//!   contract used by the HTTP layer.
//! - [`juggler`] -- [`Juggler`], the shared state behind one `RwLock`.
//! - `scheduler` -- The throw scheduler and per-ball flight timer tasks.
//!
//! [`Controller`]: control::Controller
//! [`Juggler`]: juggler::Juggler

pub mod config;
pub mod control;
pub mod juggler;
mod scheduler;

pub use control::{ControlError, Controller, StartParams};
pub use juggler::{Juggler, JugglerStats};
