//! Read-only snapshot of a circuit handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::{Circuit, CircuitKind, CircuitType, Timestamp};
use crate::alias::Alias;

/// Canonical state, shaped after what a consumer can render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CircuitState {
    Switch { on: bool },
    Dimmer { on: bool, level: f64 },
    Input { pressed: bool },
    Sensor { level: f64 },
}

impl From<&CircuitKind> for CircuitState {
    fn from(kind: &CircuitKind) -> Self {
        match kind {
            CircuitKind::RelayOutput(relay) => Self::Switch { on: relay.on },
            CircuitKind::DigitalOutput(output) => Self::Switch { on: output.on },
            CircuitKind::DigitalInput(input) => Self::Input {
                pressed: input.pressed,
            },
            CircuitKind::AnalogInput(input) => Self::Sensor { level: input.value },
            CircuitKind::AnalogOutput(output) => Self::Dimmer {
                on: output.on,
                level: output.value,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitView {
    pub alias: Alias,
    pub circuit_type: CircuitType,
    pub address: String,
    pub state: CircuitState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub last_changed: Timestamp,
}

impl From<&Circuit> for CircuitView {
    fn from(circuit: &Circuit) -> Self {
        Self {
            alias: circuit.alias.clone(),
            circuit_type: circuit.circuit_type(),
            address: circuit.address.clone(),
            state: CircuitState::from(&circuit.kind),
            room: circuit
                .exposure
                .as_ref()
                .map(|exposure| exposure.room.clone()),
            last_changed: circuit.last_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::AnalogTuning;
    use crate::raw::RawValue;

    #[test]
    fn should_serialize_dimmer_state_with_kind_tag() {
        let mut circuit = Circuit::new(
            Alias::new("light1").unwrap(),
            "A1",
            CircuitType::AnalogOutput,
            AnalogTuning::default(),
        );
        circuit.apply_raw(RawValue::Number(5.0));
        let json = serde_json::to_value(circuit.view()).unwrap();
        assert_eq!(json["alias"], "light1");
        assert_eq!(json["circuit_type"], "AO");
        assert_eq!(json["state"]["kind"], "dimmer");
        assert_eq!(json["state"]["on"], true);
        assert_eq!(json["state"]["level"], 50.0);
        assert!(json.get("room").is_none());
    }

    #[test]
    fn should_map_digital_output_to_switch() {
        let circuit = Circuit::new(
            Alias::new("fan").unwrap(),
            "1_02",
            CircuitType::DigitalOutput,
            AnalogTuning::default(),
        );
        assert_eq!(circuit.view().state, CircuitState::Switch { on: false });
    }
}
