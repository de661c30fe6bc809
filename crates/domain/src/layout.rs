//! Layout — which circuits the consumer sees, and under which names.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alias::{Alias, display_name};
use crate::circuit::CircuitType;

/// Name of the single accessory used by [`Aggregation::All`].
pub const AGGREGATE_ACCESSORY: &str = "Neuron";

/// How exposed circuits are grouped into consumer accessories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// One accessory per circuit.
    #[default]
    Device,
    /// One accessory per room.
    Room,
    /// A single accessory holding everything.
    All,
}

/// Kind of consumer service a circuit is presented as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// On/off.
    Switch,
    /// On/off plus brightness.
    Lightbulb,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Switch => "switch",
            Self::Lightbulb => "lightbulb",
        })
    }
}

/// Consumer-visible placement of one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    pub accessory: String,
    pub service: ServiceKind,
    /// Service display name.
    pub name: String,
    pub room: String,
}

/// Room assignment and grouping mode.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    rooms_by_alias: HashMap<String, String>,
    aggregation: Aggregation,
}

impl Layout {
    /// Build from a `room → aliases` mapping. An alias listed in several
    /// rooms ends up in the last one, by room name order.
    #[must_use]
    pub fn new(rooms: &BTreeMap<String, Vec<String>>, aggregation: Aggregation) -> Self {
        let rooms_by_alias = rooms
            .iter()
            .flat_map(|(room, aliases)| aliases.iter().map(move |alias| (alias.clone(), room.clone())))
            .collect();
        Self {
            rooms_by_alias,
            aggregation,
        }
    }

    #[must_use]
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    #[must_use]
    pub fn room_of(&self, alias: &Alias) -> Option<&str> {
        self.rooms_by_alias.get(alias.as_str()).map(String::as_str)
    }

    /// Placement of a circuit, `None` when it stays hidden: not listed in
    /// any room, or an input.
    #[must_use]
    pub fn expose(&self, alias: &Alias, circuit_type: CircuitType) -> Option<Exposure> {
        let room = self.room_of(alias)?;
        let service = match circuit_type {
            CircuitType::RelayOutput | CircuitType::DigitalOutput => ServiceKind::Switch,
            CircuitType::AnalogOutput => ServiceKind::Lightbulb,
            CircuitType::DigitalInput | CircuitType::AnalogInput => return None,
        };
        let accessory = match self.aggregation {
            Aggregation::All => AGGREGATE_ACCESSORY.to_string(),
            Aggregation::Room => display_name(room),
            Aggregation::Device => alias.display_name(),
        };
        Some(Exposure {
            accessory,
            service,
            name: alias.display_name(),
            room: room.to_string(),
        })
    }
}
