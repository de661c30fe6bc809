//! Controller port — the transport client of the I/O controller.
//!
//! The controller is a black box: it pushes connection events and batches of
//! changed device records, and accepts reads and writes addressed by the
//! hardware `circuit` identifier. Every call returns immediately; writes are
//! queued by the transport without waiting for an acknowledgment.

use unibridge_domain::error::TransportError;
use unibridge_domain::raw::RawDevice;

use crate::event_queue::{BridgeEvent, EventSender};

/// Something the transport reports on its own initiative.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The connection is up; the device list can be enumerated.
    Connected,
    /// A batch of changed device records.
    Message(Vec<RawDevice>),
    /// The connection failed after having been established.
    Error(TransportError),
}

/// Sink handed to [`Controller::connect`], feeding the bridge event queue.
#[derive(Debug, Clone)]
pub struct ControllerEvents {
    sender: EventSender,
}

impl ControllerEvents {
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self { sender }
    }

    pub fn connected(&self) {
        self.emit(ControllerEvent::Connected);
    }

    pub fn message(&self, batch: Vec<RawDevice>) {
        self.emit(ControllerEvent::Message(batch));
    }

    pub fn error(&self, error: TransportError) {
        self.emit(ControllerEvent::Error(error));
    }

    fn emit(&self, event: ControllerEvent) {
        if !self.sender.send(BridgeEvent::Controller(event)) {
            tracing::debug!("bridge stopped, dropping controller event");
        }
    }
}

/// Transport client of the I/O controller.
///
/// Implementations live in adapter crates (e.g. `adapter_virtual`).
pub trait Controller: Send {
    /// Start a connection attempt. The outcome is reported through `events`;
    /// an error here means the attempt could not even be started.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] when the attempt fails synchronously.
    fn connect(&mut self, events: ControllerEvents) -> Result<(), TransportError>;

    /// Drop the current connection. No event of that connection is reported
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when there is no open connection.
    fn close(&mut self) -> Result<(), TransportError>;

    /// Enumerate every device with its current value.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the controller cannot be reached.
    fn devices(&self) -> Result<Vec<RawDevice>, TransportError>;

    /// Switch a physical relay.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the write cannot be dispatched.
    fn set_relay(&mut self, address: &str, on: bool) -> Result<(), TransportError>;

    /// Switch a digital output.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the write cannot be dispatched.
    fn set_digital(&mut self, address: &str, on: bool) -> Result<(), TransportError>;

    /// Drive an analog output, in volts.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the write cannot be dispatched.
    fn set_analog(&mut self, address: &str, volts: f64) -> Result<(), TransportError>;

    /// Read back a relay.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the read fails.
    fn get_relay(&self, address: &str) -> Result<bool, TransportError>;

    /// Read back a digital output.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the read fails.
    fn get_digital(&self, address: &str) -> Result<bool, TransportError>;
}
