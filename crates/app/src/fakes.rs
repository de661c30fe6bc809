//! In-memory port implementations shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use unibridge_domain::circuit::CircuitView;
use unibridge_domain::error::TransportError;
use unibridge_domain::layout::Exposure;
use unibridge_domain::raw::{RawDevice, RawValue};

use crate::ports::{Controller, ControllerEvents, Notifier, Presentation};

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Relay(String, bool),
    Digital(String, bool),
    Analog(String, f64),
}

#[derive(Default)]
struct ControllerState {
    devices: BTreeMap<String, RawDevice>,
    events: Option<ControllerEvents>,
    connects: usize,
    closes: usize,
    failing_connects: usize,
    failing_enumerations: usize,
    failing_writes: bool,
    writes: Vec<Write>,
}

/// Controller double. Clones share state, so a test keeps one to drive and
/// inspect the one owned by the bridge.
#[derive(Clone, Default)]
pub struct FakeController {
    state: Arc<Mutex<ControllerState>>,
}

impl FakeController {
    pub fn with_devices(devices: Vec<RawDevice>) -> Self {
        let controller = Self::default();
        {
            let mut state = controller.state.lock().unwrap();
            for device in devices {
                state.devices.insert(device.circuit.clone(), device);
            }
        }
        controller
    }

    /// Change a device and report it, like a hardware edge would.
    pub fn inject(&self, device: RawDevice) {
        let mut state = self.state.lock().unwrap();
        state.devices.insert(device.circuit.clone(), device.clone());
        if let Some(events) = &state.events {
            events.message(vec![device]);
        }
    }

    pub fn set_value(&self, address: &str, value: RawValue) {
        let mut state = self.state.lock().unwrap();
        let device = state
            .devices
            .entry(address.to_string())
            .or_insert_with(|| RawDevice::digital_output(address, false));
        device.value = value;
    }

    pub fn break_connection(&self, error: TransportError) {
        let state = self.state.lock().unwrap();
        if let Some(events) = &state.events {
            events.error(error);
        }
    }

    pub fn fail_connects(&self, count: usize) {
        self.state.lock().unwrap().failing_connects = count;
    }

    pub fn fail_enumerations(&self, count: usize) {
        self.state.lock().unwrap().failing_enumerations = count;
    }

    pub fn fail_writes(&self, failing: bool) {
        self.state.lock().unwrap().failing_writes = failing;
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    fn write(&self, write: Write) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_writes {
            return Err(TransportError::Lost("write refused".to_string()));
        }
        state.writes.push(write);
        Ok(())
    }

    fn read(&self, address: &str) -> Result<bool, TransportError> {
        let state = self.state.lock().unwrap();
        state
            .devices
            .get(address)
            .map(|device| device.value.as_bool())
            .ok_or_else(|| TransportError::Rejected {
                address: address.to_string(),
                reason: "unknown circuit".to_string(),
            })
    }
}

impl Controller for FakeController {
    fn connect(&mut self, events: ControllerEvents) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if state.failing_connects > 0 {
            state.failing_connects -= 1;
            return Err(TransportError::Connect("unreachable".to_string()));
        }
        events.connected();
        state.events = Some(events);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.events.take().ok_or(TransportError::Closed)?;
        state.closes += 1;
        Ok(())
    }

    fn devices(&self) -> Result<Vec<RawDevice>, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_enumerations > 0 {
            state.failing_enumerations -= 1;
            return Err(TransportError::Lost("enumeration failed".to_string()));
        }
        Ok(state.devices.values().cloned().collect())
    }

    fn set_relay(&mut self, address: &str, on: bool) -> Result<(), TransportError> {
        self.write(Write::Relay(address.to_string(), on))
    }

    fn set_digital(&mut self, address: &str, on: bool) -> Result<(), TransportError> {
        self.write(Write::Digital(address.to_string(), on))
    }

    fn set_analog(&mut self, address: &str, volts: f64) -> Result<(), TransportError> {
        self.write(Write::Analog(address.to_string(), volts))
    }

    fn get_relay(&self, address: &str) -> Result<bool, TransportError> {
        self.read(address)
    }

    fn get_digital(&self, address: &str) -> Result<bool, TransportError> {
        self.read(address)
    }
}

#[derive(Default)]
struct PresentationState {
    exposed: Vec<(Exposure, CircuitView)>,
    updates: Vec<CircuitView>,
}

/// Presentation spy.
#[derive(Clone, Default)]
pub struct RecordingPresentation {
    state: Arc<Mutex<PresentationState>>,
}

impl RecordingPresentation {
    pub fn exposed(&self) -> Vec<(Exposure, CircuitView)> {
        self.state.lock().unwrap().exposed.clone()
    }

    pub fn updates(&self) -> Vec<CircuitView> {
        self.state.lock().unwrap().updates.clone()
    }
}

impl Presentation for RecordingPresentation {
    fn expose(&mut self, exposure: &Exposure, view: &CircuitView) {
        self.state
            .lock()
            .unwrap()
            .exposed
            .push((exposure.clone(), view.clone()));
    }

    fn update(&mut self, view: &CircuitView) {
        self.state.lock().unwrap().updates.push(view.clone());
    }
}

/// Notifier spy.
#[derive(Clone, Default)]
pub struct SpyNotifier {
    events: Arc<Mutex<Vec<String>>>,
}

impl SpyNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for SpyNotifier {
    fn notify(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }
}
