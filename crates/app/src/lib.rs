//! # unibridge-app
//!
//! Application layer — the bridge core and its **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `Controller` — the I/O controller transport (connect, enumerate, read, write)
//!   - `Presentation` — the consumer that renders exposed circuits
//!   - `Notifier` — the external webhook behind the `ifft` rule action
//! - Own the **Circuit Registry** and the **Rule Engine**
//! - Supervise the controller connection (retry, idle watchdog, dry-run resync)
//! - Serialise every input through one **event queue** consumed by the [`bridge::Bridge`] loop
//! - Hand out a cloneable [`handle::BridgeHandle`] for consumer intents
//!
//! ## Dependency rule
//! Depends on `unibridge-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod event_queue;
pub mod handle;
pub mod output;
pub mod ports;
pub mod registry;
pub mod rule_engine;
pub mod scheduler;
pub mod supervisor;

#[cfg(test)]
mod fakes;
