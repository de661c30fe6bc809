//! Common error types used across the workspace.
//!
//! Each failure class gets its own typed error; [`BridgeError`] is the
//! umbrella handed back to consumers and converts from the others via
//! `#[from]`.

use crate::circuit::CircuitType;

/// Errors surfaced to consumers of the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("circuit not found")]
    NotFound(#[from] NotFoundError),

    #[error("unsupported operation")]
    Unsupported(#[from] UnsupportedError),

    #[error("rule error")]
    Rule(#[from] RuleError),

    #[error("controller unreachable")]
    Connectivity(#[from] ConnectivityError),

    /// The bridge event loop is gone; no reply can be produced.
    #[error("bridge stopped")]
    Stopped,
}

/// Invariant violations on domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("alias must not be empty")]
    EmptyAlias,

    #[error("alias {0:?} must not contain whitespace")]
    AliasWhitespace(String),
}

/// A circuit alias that is not present in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("circuit {alias} not found")]
pub struct NotFoundError {
    pub alias: String,
}

/// An operation requested on a circuit type that cannot honour it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} is not supported by {circuit_type} circuit {alias}")]
pub struct UnsupportedError {
    pub alias: String,
    pub circuit_type: CircuitType,
    pub operation: &'static str,
}

/// Rule-authoring mistakes.
///
/// `Malformed` is detected while compiling the configuration, the other
/// variants only once the rule fires against the live registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("malformed rule expression {expression:?}: {reason}")]
    Malformed {
        expression: String,
        reason: &'static str,
    },

    #[error("unknown circuit {0}")]
    UnknownCircuit(String),

    #[error("command {command} is not supported by {circuit_type} circuit {alias}")]
    UnsupportedCommand {
        command: String,
        alias: String,
        circuit_type: CircuitType,
    },

    #[error("condition {condition} cannot be evaluated on {circuit_type} circuit {alias}")]
    UnsupportedCondition {
        condition: String,
        alias: String,
        circuit_type: CircuitType,
    },
}

/// A read or write could not reach the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectivityError {
    #[error("not connected to the controller")]
    NotConnected,

    #[error("controller call on {address} failed")]
    Call {
        address: String,
        #[source]
        source: TransportError,
    },
}

/// Failures reported by the controller transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("connection lost: {0}")]
    Lost(String),

    #[error("connection already closed")]
    Closed,

    #[error("controller rejected {address}: {reason}")]
    Rejected { address: String, reason: String },
}

/// Raw controller records that cannot be mapped onto a circuit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("unsupported device kind {dev} ({relay_type:?})")]
    UnsupportedKind {
        dev: String,
        relay_type: Option<String>,
    },

    #[error("no alias for {circuit_type} {address}")]
    NoAlias {
        circuit_type: CircuitType,
        address: String,
    },
}
