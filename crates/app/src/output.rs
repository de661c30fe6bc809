//! Controller writes and reads, gated on the connection being up.
//!
//! Rule actions and consumer intents share the per-kind operations defined
//! here, so both paths mutate circuits and talk to the controller the same
//! way.

use unibridge_domain::circuit::{Circuit, CircuitKind, to_raw};
use unibridge_domain::error::{BridgeError, ConnectivityError, TransportError, UnsupportedError};

use crate::ports::Controller;

/// Controller access for the duration of one event.
pub struct Outputs<'a, C: ?Sized> {
    controller: &'a mut C,
    connected: bool,
}

impl<'a, C: Controller + ?Sized> Outputs<'a, C> {
    pub fn new(controller: &'a mut C, connected: bool) -> Self {
        Self {
            controller,
            connected,
        }
    }

    fn call<T>(
        &mut self,
        address: &str,
        op: impl FnOnce(&mut C) -> Result<T, TransportError>,
    ) -> Result<T, ConnectivityError> {
        if !self.connected {
            return Err(ConnectivityError::NotConnected);
        }
        op(self.controller).map_err(|source| ConnectivityError::Call {
            address: address.to_string(),
            source,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConnectivityError`] when disconnected or when the transport
    /// rejects the write.
    pub fn set_relay(&mut self, address: &str, on: bool) -> Result<(), ConnectivityError> {
        self.call(address, |c| c.set_relay(address, on))
    }

    /// # Errors
    ///
    /// Returns [`ConnectivityError`] when disconnected or when the transport
    /// rejects the write.
    pub fn set_digital(&mut self, address: &str, on: bool) -> Result<(), ConnectivityError> {
        self.call(address, |c| c.set_digital(address, on))
    }

    /// # Errors
    ///
    /// Returns [`ConnectivityError`] when disconnected or when the transport
    /// rejects the write.
    pub fn set_analog(&mut self, address: &str, volts: f64) -> Result<(), ConnectivityError> {
        self.call(address, |c| c.set_analog(address, volts))
    }

    /// # Errors
    ///
    /// Returns [`ConnectivityError`] when disconnected or when the read fails.
    pub fn get_relay(&mut self, address: &str) -> Result<bool, ConnectivityError> {
        self.call(address, |c| c.get_relay(address))
    }

    /// # Errors
    ///
    /// Returns [`ConnectivityError`] when disconnected or when the read fails.
    pub fn get_digital(&mut self, address: &str) -> Result<bool, ConnectivityError> {
        self.call(address, |c| c.get_digital(address))
    }
}

fn unsupported(circuit: &Circuit, operation: &'static str) -> BridgeError {
    UnsupportedError {
        alias: circuit.alias.to_string(),
        circuit_type: circuit.circuit_type(),
        operation,
    }
    .into()
}

/// Write the current level and on/off flag of an analog output.
///
/// # Errors
///
/// Returns [`BridgeError::Unsupported`] for other kinds and
/// [`BridgeError::Connectivity`] when the write fails.
pub fn write_analog<C>(outputs: &mut Outputs<'_, C>, circuit: &Circuit) -> Result<(), BridgeError>
where
    C: Controller + ?Sized,
{
    match (&circuit.kind, to_raw(&circuit.kind)) {
        (CircuitKind::AnalogOutput(_), Some(raw)) => {
            let volts = raw.as_number();
            tracing::info!(alias = %circuit.alias, volts, "setting analog output");
            outputs.set_analog(&circuit.address, volts)?;
            Ok(())
        }
        _ => Err(unsupported(circuit, "analog write")),
    }
}

/// Turn an output on or off.
///
/// Relays and digital outputs store the new state once the write went
/// through. Analog outputs keep their level; turning one on from a zero
/// level restores full brightness.
///
/// # Errors
///
/// Returns [`BridgeError::Unsupported`] for inputs and
/// [`BridgeError::Connectivity`] when the write fails.
pub fn switch<C>(outputs: &mut Outputs<'_, C>, circuit: &mut Circuit, on: bool) -> Result<(), BridgeError>
where
    C: Controller + ?Sized,
{
    match &mut circuit.kind {
        CircuitKind::RelayOutput(relay) => {
            tracing::info!(alias = %circuit.alias, on, "setting relay output");
            outputs.set_relay(&circuit.address, on)?;
            relay.on = on;
        }
        CircuitKind::DigitalOutput(output) => {
            tracing::info!(alias = %circuit.alias, on, "setting digital output");
            outputs.set_digital(&circuit.address, on)?;
            output.on = on;
        }
        CircuitKind::AnalogOutput(output) => {
            output.on = on;
            if on && output.value <= 0.0 {
                output.value = 100.0;
            }
            write_analog(outputs, circuit)?;
        }
        CircuitKind::DigitalInput(_) | CircuitKind::AnalogInput(_) => {
            return Err(unsupported(circuit, "switch"));
        }
    }
    circuit.touch();
    Ok(())
}

/// Set the brightness of an analog output, clamped to `0..=100`.
///
/// # Errors
///
/// Returns [`BridgeError::Unsupported`] for other kinds and
/// [`BridgeError::Connectivity`] when the write fails.
pub fn set_level<C>(outputs: &mut Outputs<'_, C>, circuit: &mut Circuit, level: f64) -> Result<(), BridgeError>
where
    C: Controller + ?Sized,
{
    let CircuitKind::AnalogOutput(output) = &mut circuit.kind else {
        return Err(unsupported(circuit, "set level"));
    };
    output.value = level.clamp(0.0, 100.0);
    write_analog(outputs, circuit)?;
    circuit.touch();
    Ok(())
}

/// Refresh a circuit from the controller. Relays and digital outputs are
/// read back; other kinds keep their registry state.
///
/// # Errors
///
/// Returns [`BridgeError::Connectivity`] when the read fails.
pub fn refresh<C>(outputs: &mut Outputs<'_, C>, circuit: &mut Circuit) -> Result<(), BridgeError>
where
    C: Controller + ?Sized,
{
    match &mut circuit.kind {
        CircuitKind::RelayOutput(relay) => {
            relay.on = outputs.get_relay(&circuit.address)?;
            tracing::info!(alias = %circuit.alias, on = relay.on, "read relay output");
        }
        CircuitKind::DigitalOutput(output) => {
            output.on = outputs.get_digital(&circuit.address)?;
            tracing::info!(alias = %circuit.alias, on = output.on, "read digital output");
        }
        CircuitKind::DigitalInput(_) | CircuitKind::AnalogInput(_) | CircuitKind::AnalogOutput(_) => {}
    }
    Ok(())
}
