//! # unibridge-adapter-virtual
//!
//! Virtual controller that simulates an I/O board for testing and
//! demonstration purposes.
//!
//! ## Behaviour
//!
//! | Call | Effect |
//! |------|--------|
//! | `connect` | Reports `connected` at once, unless made unreachable |
//! | `set_relay` / `set_digital` / `set_analog` | Stores the value and echoes the record as a change event |
//! | `get_relay` / `get_digital` | Returns the stored value |
//! | [`VirtualController::set_input`] | Simulates a hardware edge on an input or sensor |
//!
//! ## Dependency rule
//!
//! Depends on `unibridge-app` (port traits) and `unibridge-domain` only.

pub mod board;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use unibridge_app::ports::{Controller, ControllerEvents};
use unibridge_domain::error::TransportError;
use unibridge_domain::raw::{RawDevice, RawValue};

type DeviceKey = (String, String);

fn key(dev: &str, circuit: &str) -> DeviceKey {
    (dev.to_string(), circuit.to_string())
}

#[derive(Default)]
struct Board {
    devices: BTreeMap<DeviceKey, RawDevice>,
    events: Option<ControllerEvents>,
    unreachable: bool,
}

impl Board {
    fn events(&self) -> Result<&ControllerEvents, TransportError> {
        self.events
            .as_ref()
            .ok_or_else(|| TransportError::Lost("not connected".to_string()))
    }

    fn write(&mut self, dev: &str, address: &str, value: RawValue) -> Result<(), TransportError> {
        self.events()?;
        let device = self
            .devices
            .get_mut(&key(dev, address))
            .ok_or_else(|| unknown(address))?;
        device.value = value;
        let echo = device.clone();
        tracing::debug!(dev, address, ?value, "virtual write");
        if let Some(events) = &self.events {
            events.message(vec![echo]);
        }
        Ok(())
    }

    fn read(&self, address: &str) -> Result<bool, TransportError> {
        self.devices
            .get(&key("relay", address))
            .map(|device| device.value.as_bool())
            .ok_or_else(|| unknown(address))
    }
}

fn unknown(address: &str) -> TransportError {
    TransportError::Rejected {
        address: address.to_string(),
        reason: "no such circuit".to_string(),
    }
}

/// Simulated controller. Clones share the same board, so one clone can be
/// handed to the bridge while another drives inputs.
#[derive(Clone, Default)]
pub struct VirtualController {
    board: Arc<Mutex<Board>>,
}

impl VirtualController {
    #[must_use]
    pub fn new(devices: Vec<RawDevice>) -> Self {
        let controller = Self::default();
        {
            let mut board = controller.lock();
            for device in devices {
                board.devices.insert(key(&device.dev, &device.circuit), device);
            }
        }
        controller
    }

    /// The [`board::demo`] device set.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(board::demo())
    }

    /// Make subsequent connect attempts fail, or succeed again.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().unreachable = !reachable;
    }

    /// Simulate a hardware change on any device and report it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Rejected`] for an unknown device.
    pub fn set_input(&self, dev: &str, address: &str, value: impl Into<RawValue>) -> Result<(), TransportError> {
        let mut board = self.lock();
        let device = board
            .devices
            .get_mut(&key(dev, address))
            .ok_or_else(|| unknown(address))?;
        device.value = value.into();
        let changed = device.clone();
        if let Some(events) = &board.events {
            events.message(vec![changed]);
        }
        Ok(())
    }

    /// Drop the link as a network failure would.
    pub fn drop_connection(&self) {
        let board = self.lock();
        if let Some(events) = &board.events {
            events.error(TransportError::Lost("simulated link failure".to_string()));
        }
    }

    /// Current value of a device, if it exists.
    #[must_use]
    pub fn value(&self, dev: &str, address: &str) -> Option<RawValue> {
        self.lock()
            .devices
            .get(&key(dev, address))
            .map(|device| device.value)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock().events.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Controller for VirtualController {
    fn connect(&mut self, events: ControllerEvents) -> Result<(), TransportError> {
        let mut board = self.lock();
        if board.unreachable {
            return Err(TransportError::Connect("virtual board unreachable".to_string()));
        }
        tracing::info!(devices = board.devices.len(), "virtual controller connected");
        events.connected();
        board.events = Some(events);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.lock()
            .events
            .take()
            .map(|_| ())
            .ok_or(TransportError::Closed)
    }

    fn devices(&self) -> Result<Vec<RawDevice>, TransportError> {
        let board = self.lock();
        board.events()?;
        Ok(board.devices.values().cloned().collect())
    }

    fn set_relay(&mut self, address: &str, on: bool) -> Result<(), TransportError> {
        self.lock().write("relay", address, RawValue::Bool(on))
    }

    fn set_digital(&mut self, address: &str, on: bool) -> Result<(), TransportError> {
        self.lock().write("relay", address, RawValue::Bool(on))
    }

    fn set_analog(&mut self, address: &str, volts: f64) -> Result<(), TransportError> {
        self.lock().write("ao", address, RawValue::Number(volts))
    }

    fn get_relay(&self, address: &str) -> Result<bool, TransportError> {
        self.lock().read(address)
    }

    fn get_digital(&self, address: &str) -> Result<bool, TransportError> {
        self.lock().read(address)
    }
}
