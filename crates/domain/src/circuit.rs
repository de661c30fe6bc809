//! Circuit — one monitored or controlled physical point.
//!
//! The circuit type is fixed at creation and carried by [`CircuitKind`],
//! whose variants hold the per-type state (boolean for relays and digital
//! points, a 0–100 level for analog points, pending timers for relays and
//! inputs). Unit conversions live in [`conversion`] as free functions.

pub mod conversion;
mod view;

pub use conversion::{analog_from_raw, analog_to_raw, apply_raw, to_raw};
pub use view::{CircuitState, CircuitView};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alias::Alias;
use crate::gesture::{DigitalInput, TimerId};
use crate::layout::Exposure;
use crate::raw::RawValue;

/// UTC timestamp of the last state change.
pub type Timestamp = DateTime<Utc>;

/// The five kinds of points the controller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitType {
    #[serde(rename = "RO")]
    RelayOutput,
    #[serde(rename = "DO")]
    DigitalOutput,
    #[serde(rename = "DI")]
    DigitalInput,
    #[serde(rename = "AI")]
    AnalogInput,
    #[serde(rename = "AO")]
    AnalogOutput,
}

impl CircuitType {
    /// Short code used in alias mapping keys (`"RO 2_01"`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::RelayOutput => "RO",
            Self::DigitalOutput => "DO",
            Self::DigitalInput => "DI",
            Self::AnalogInput => "AI",
            Self::AnalogOutput => "AO",
        }
    }
}

impl fmt::Display for CircuitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CircuitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RO" => Ok(Self::RelayOutput),
            "DO" => Ok(Self::DigitalOutput),
            "DI" => Ok(Self::DigitalInput),
            "AI" => Ok(Self::AnalogInput),
            "AO" => Ok(Self::AnalogOutput),
            other => Err(format!("unknown circuit type {other:?}")),
        }
    }
}

/// Per-alias analog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalogTuning {
    /// Reverse the 0–10 V scale.
    pub inverted: bool,
    /// Minimum level change (in percent) reported as a `move` event.
    #[serde(alias = "sensibility")]
    pub sensitivity: f64,
}

impl Default for AnalogTuning {
    fn default() -> Self {
        Self {
            inverted: false,
            sensitivity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayOutput {
    pub on: bool,
    /// Pending delayed-off timer set by a `timer` rule action.
    pub timer: Option<TimerId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitalOutput {
    pub on: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalogInput {
    pub value: f64,
    pub tuning: AnalogTuning,
}

/// Dimmable output. `on` is independent from `value` so the level survives
/// an off/on cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalogOutput {
    pub value: f64,
    pub on: bool,
    pub tuning: AnalogTuning,
}

/// Circuit type together with its type-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitKind {
    RelayOutput(RelayOutput),
    DigitalOutput(DigitalOutput),
    DigitalInput(DigitalInput),
    AnalogInput(AnalogInput),
    AnalogOutput(AnalogOutput),
}

impl CircuitKind {
    /// Fresh state for the given type; tuning only applies to analog kinds.
    #[must_use]
    pub fn new(circuit_type: CircuitType, tuning: AnalogTuning) -> Self {
        match circuit_type {
            CircuitType::RelayOutput => Self::RelayOutput(RelayOutput::default()),
            CircuitType::DigitalOutput => Self::DigitalOutput(DigitalOutput::default()),
            CircuitType::DigitalInput => Self::DigitalInput(DigitalInput::default()),
            CircuitType::AnalogInput => Self::AnalogInput(AnalogInput {
                value: 0.0,
                tuning,
            }),
            CircuitType::AnalogOutput => Self::AnalogOutput(AnalogOutput {
                value: 0.0,
                on: false,
                tuning,
            }),
        }
    }

    #[must_use]
    pub fn circuit_type(&self) -> CircuitType {
        match self {
            Self::RelayOutput(_) => CircuitType::RelayOutput,
            Self::DigitalOutput(_) => CircuitType::DigitalOutput,
            Self::DigitalInput(_) => CircuitType::DigitalInput,
            Self::AnalogInput(_) => CircuitType::AnalogInput,
            Self::AnalogOutput(_) => CircuitType::AnalogOutput,
        }
    }

    /// The boolean tested by rule conditions: the relay state or the analog
    /// output's on/off flag. Other kinds have no such notion.
    #[must_use]
    pub fn switched_on(&self) -> Option<bool> {
        match self {
            Self::RelayOutput(relay) => Some(relay.on),
            Self::AnalogOutput(output) => Some(output.on),
            Self::DigitalOutput(_) | Self::DigitalInput(_) | Self::AnalogInput(_) => None,
        }
    }

    /// The 0–100 level of analog kinds.
    #[must_use]
    pub fn level(&self) -> Option<f64> {
        match self {
            Self::AnalogInput(input) => Some(input.value),
            Self::AnalogOutput(output) => Some(output.value),
            Self::RelayOutput(_) | Self::DigitalOutput(_) | Self::DigitalInput(_) => None,
        }
    }
}

/// A registered circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub alias: Alias,
    /// Opaque hardware address used for controller calls.
    pub address: String,
    pub kind: CircuitKind,
    /// Consumer-visible placement, when the layout exposes this circuit.
    pub exposure: Option<Exposure>,
    pub last_changed: Timestamp,
}

impl Circuit {
    #[must_use]
    pub fn new(
        alias: Alias,
        address: impl Into<String>,
        circuit_type: CircuitType,
        tuning: AnalogTuning,
    ) -> Self {
        Self {
            alias,
            address: address.into(),
            kind: CircuitKind::new(circuit_type, tuning),
            exposure: None,
            last_changed: Utc::now(),
        }
    }

    #[must_use]
    pub fn circuit_type(&self) -> CircuitType {
        self.kind.circuit_type()
    }

    /// Convert a controller reading into canonical units and store it.
    pub fn apply_raw(&mut self, raw: RawValue) {
        apply_raw(&mut self.kind, raw);
        self.touch();
    }

    /// Current state in controller units, `None` for read-only kinds.
    #[must_use]
    pub fn to_raw(&self) -> Option<RawValue> {
        to_raw(&self.kind)
    }

    /// Record that the state just changed.
    pub fn touch(&mut self) {
        self.last_changed = Utc::now();
    }

    /// Serializable snapshot for the presentation layer.
    #[must_use]
    pub fn view(&self) -> CircuitView {
        CircuitView::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(name: &str) -> Alias {
        Alias::new(name).unwrap()
    }

    #[test]
    fn should_roundtrip_circuit_type_codes() {
        for ty in [
            CircuitType::RelayOutput,
            CircuitType::DigitalOutput,
            CircuitType::DigitalInput,
            CircuitType::AnalogInput,
            CircuitType::AnalogOutput,
        ] {
            assert_eq!(ty.code().parse::<CircuitType>().unwrap(), ty);
        }
    }

    #[test]
    fn should_reject_unknown_circuit_type_code() {
        assert!("XX".parse::<CircuitType>().is_err());
    }

    #[test]
    fn should_default_sensitivity_to_one() {
        let tuning = AnalogTuning::default();
        assert!(!tuning.inverted);
        assert!((tuning.sensitivity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_accept_legacy_sensibility_key() {
        let tuning: AnalogTuning = toml::from_str("inverted = true\nsensibility = 5.0").unwrap();
        assert!(tuning.inverted);
        assert!((tuning.sensitivity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_create_kind_matching_type() {
        let circuit = Circuit::new(
            alias("light1"),
            "1_01",
            CircuitType::AnalogOutput,
            AnalogTuning::default(),
        );
        assert_eq!(circuit.circuit_type(), CircuitType::AnalogOutput);
        assert!(circuit.exposure.is_none());
    }

    #[test]
    fn should_report_switched_on_for_relay_and_analog_output_only() {
        let relay = CircuitKind::RelayOutput(RelayOutput {
            on: true,
            timer: None,
        });
        let output = CircuitKind::DigitalOutput(DigitalOutput { on: true });
        assert_eq!(relay.switched_on(), Some(true));
        assert_eq!(output.switched_on(), None);
    }

    #[test]
    fn should_apply_raw_value_through_circuit() {
        let mut circuit = Circuit::new(
            alias("light1"),
            "1_01",
            CircuitType::AnalogOutput,
            AnalogTuning::default(),
        );
        circuit.apply_raw(RawValue::Number(5.0));
        assert_eq!(circuit.kind.level(), Some(50.0));
        assert_eq!(circuit.to_raw(), Some(RawValue::Number(5.0)));
    }
}
