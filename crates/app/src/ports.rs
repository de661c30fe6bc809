//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the bridge core and the outside world.
//! They are defined here (in `app`) so that both the core and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod controller;
pub mod notifier;
pub mod presentation;

pub use controller::{Controller, ControllerEvent, ControllerEvents};
pub use notifier::Notifier;
pub use presentation::Presentation;
