//! Raw controller records, exactly as the transport reports them.

use serde::{Deserialize, Serialize};

/// Value carried by a raw record: relays and inputs report booleans or
/// `0`/`1`, analog points report volts in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
}

impl Default for RawValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl RawValue {
    /// Boolean reading; numbers are truthy when non-zero.
    #[must_use]
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Number(n) => n != 0.0,
        }
    }

    /// Numeric reading; booleans map to `1.0` / `0.0`.
    #[must_use]
    pub fn as_number(self) -> f64 {
        match self {
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
            Self::Number(n) => n,
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One device record from the controller's enumeration or change stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDevice {
    /// Device kind, e.g. `relay`, `input`, `ai`, `ao`.
    pub dev: String,
    /// Sub-kind for relays: `physical` or `digital`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_type: Option<String>,
    /// Hardware address.
    pub circuit: String,
    /// Alias stored on the controller itself, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub value: RawValue,
}

impl RawDevice {
    fn new(dev: &str, relay_type: Option<&str>, circuit: &str, value: RawValue) -> Self {
        Self {
            dev: dev.to_string(),
            relay_type: relay_type.map(str::to_string),
            circuit: circuit.to_string(),
            alias: None,
            value,
        }
    }

    /// A physical relay output.
    #[must_use]
    pub fn relay(circuit: &str, on: bool) -> Self {
        Self::new("relay", Some("physical"), circuit, RawValue::Bool(on))
    }

    /// A digital (transistor) output, reported by the controller as a relay.
    #[must_use]
    pub fn digital_output(circuit: &str, on: bool) -> Self {
        Self::new("relay", Some("digital"), circuit, RawValue::Bool(on))
    }

    /// A digital input.
    #[must_use]
    pub fn input(circuit: &str, pressed: bool) -> Self {
        Self::new("input", None, circuit, RawValue::Bool(pressed))
    }

    /// An analog input reading in volts.
    #[must_use]
    pub fn analog_input(circuit: &str, volts: f64) -> Self {
        Self::new("ai", None, circuit, RawValue::Number(volts))
    }

    /// An analog output level in volts.
    #[must_use]
    pub fn analog_output(circuit: &str, volts: f64) -> Self {
        Self::new("ao", None, circuit, RawValue::Number(volts))
    }

    /// Attach the controller-side alias.
    #[must_use]
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Replace the reported value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<RawValue>) -> Self {
        self.value = value.into();
        self
    }
}
