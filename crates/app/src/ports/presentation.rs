//! Presentation port — the consumer that renders exposed circuits.

use unibridge_domain::circuit::CircuitView;
use unibridge_domain::layout::Exposure;

/// Receives the consumer-visible circuits and their state changes.
///
/// Consumer intents travel the other way, through
/// [`BridgeHandle`](crate::handle::BridgeHandle).
pub trait Presentation: Send {
    /// Called once per exposed circuit, right after registration.
    fn expose(&mut self, exposure: &Exposure, view: &CircuitView);

    /// Called after every state change of an exposed circuit.
    fn update(&mut self, view: &CircuitView);
}
