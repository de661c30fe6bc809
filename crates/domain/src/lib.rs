//! # unibridge-domain
//!
//! Pure domain model for the unibridge controller bridge.
//!
//! ## Responsibilities
//! - Foundational types: aliases, timestamps, error conventions
//! - Define **Circuits** (relays, digital I/O, analog I/O) and the unit
//!   conversions between controller units and canonical units
//! - Define the **Event Normalizer** that classifies raw controller records
//! - Define the **Gesture** state machine for digital inputs
//! - Define **Rules** (trigger → condition → action) as a parsed AST
//! - Define the **Layout** that decides what the consumer gets to see
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! Timers are expressed as the [`gesture::Timers`] trait; the `app` crate
//! provides the scheduler behind it.

pub mod alias;
pub mod error;

pub mod circuit;
pub mod gesture;
pub mod layout;
pub mod normalizer;
pub mod raw;
pub mod rule;
