//! # unibridge-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Implement the `Presentation` port with a [`board::CircuitBoard`]: the
//!   consumer-visible circuits and their latest state
//! - Serve a **JSON API** over that board (`/api/circuits`, …)
//! - Map HTTP requests into consumer intents on the bridge handle (driving
//!   adapter) and their replies into HTTP responses
//!
//! ## Dependency rule
//! Depends on `unibridge-app` (port traits and the bridge handle) and
//! `unibridge-domain` (views and exposures used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod board;
pub mod error;
pub mod router;
pub mod state;
