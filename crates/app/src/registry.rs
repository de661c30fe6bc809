//! Circuit registry — the canonical set of circuits, keyed by alias.

use std::collections::{BTreeMap, HashMap};

use unibridge_domain::alias::Alias;
use unibridge_domain::circuit::{AnalogTuning, Circuit, CircuitType};
use unibridge_domain::error::NotFoundError;
use unibridge_domain::raw::RawValue;

/// Owns every registered circuit for the lifetime of the process.
#[derive(Debug, Default)]
pub struct CircuitRegistry {
    circuits: BTreeMap<Alias, Circuit>,
    /// Per-alias analog tuning from the static configuration.
    tuning: HashMap<String, AnalogTuning>,
}

impl CircuitRegistry {
    #[must_use]
    pub fn new(tuning: HashMap<String, AnalogTuning>) -> Self {
        Self {
            circuits: BTreeMap::new(),
            tuning,
        }
    }

    /// Register a circuit and seed it with its enumerated value.
    ///
    /// Idempotent per alias: a second registration returns the existing
    /// circuit untouched. Returns whether the circuit was created.
    pub fn register(
        &mut self,
        alias: Alias,
        circuit_type: CircuitType,
        address: &str,
        value: RawValue,
    ) -> (&mut Circuit, bool) {
        let tuning = self
            .tuning
            .get(alias.as_str())
            .copied()
            .unwrap_or_default();
        let mut created = false;
        let circuit = self.circuits.entry(alias).or_insert_with_key(|alias| {
            created = true;
            let mut circuit = Circuit::new(alias.clone(), address, circuit_type, tuning);
            circuit.apply_raw(value);
            circuit
        });
        (circuit, created)
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&Circuit> {
        self.circuits.get(alias)
    }

    pub fn get_mut(&mut self, alias: &str) -> Option<&mut Circuit> {
        self.circuits.get_mut(alias)
    }

    /// Look up a circuit that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for unknown aliases.
    pub fn require(&self, alias: &str) -> Result<&Circuit, NotFoundError> {
        self.get(alias).ok_or_else(|| NotFoundError {
            alias: alias.to_string(),
        })
    }

    /// Mutable variant of [`require`](Self::require).
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for unknown aliases.
    pub fn require_mut(&mut self, alias: &str) -> Result<&mut Circuit, NotFoundError> {
        self.circuits.get_mut(alias).ok_or_else(|| NotFoundError {
            alias: alias.to_string(),
        })
    }

    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.circuits.contains_key(alias)
    }

    /// Circuits in alias order.
    pub fn iter(&self) -> impl Iterator<Item = &Circuit> {
        self.circuits.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unibridge_domain::circuit::CircuitKind;

    fn alias(name: &str) -> Alias {
        Alias::new(name).unwrap()
    }

    #[test]
    fn should_register_with_enumerated_value() {
        let mut registry = CircuitRegistry::default();
        let (circuit, created) = registry.register(
            alias("light1"),
            CircuitType::AnalogOutput,
            "A1",
            RawValue::Number(5.0),
        );
        assert!(created);
        assert_eq!(circuit.address, "A1");
        assert_eq!(circuit.kind.level(), Some(50.0));
        assert_eq!(circuit.kind.switched_on(), Some(true));
    }

    #[test]
    fn should_keep_existing_circuit_on_second_registration() {
        let mut registry = CircuitRegistry::default();
        registry.register(alias("hall"), CircuitType::RelayOutput, "2_01", true.into());
        let (circuit, created) = registry.register(
            alias("hall"),
            CircuitType::DigitalOutput,
            "9_99",
            false.into(),
        );
        assert!(!created);
        assert_eq!(circuit.circuit_type(), CircuitType::RelayOutput);
        assert_eq!(circuit.address, "2_01");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_apply_configured_tuning() {
        let tuning = HashMap::from([(
            "lux".to_string(),
            AnalogTuning {
                inverted: true,
                sensitivity: 5.0,
            },
        )]);
        let mut registry = CircuitRegistry::new(tuning);
        let (circuit, _) = registry.register(
            alias("lux"),
            CircuitType::AnalogInput,
            "AI1",
            RawValue::Number(2.0),
        );
        let CircuitKind::AnalogInput(input) = &circuit.kind else {
            panic!("expected analog input");
        };
        assert!(input.tuning.inverted);
        assert!((input.value - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_report_unknown_alias() {
        let registry = CircuitRegistry::default();
        let err = registry.require("ghost").unwrap_err();
        assert_eq!(err.alias, "ghost");
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn should_iterate_in_alias_order() {
        let mut registry = CircuitRegistry::default();
        registry.register(alias("b"), CircuitType::RelayOutput, "2", false.into());
        registry.register(alias("a"), CircuitType::RelayOutput, "1", false.into());
        let aliases: Vec<&str> = registry.iter().map(|c| c.alias.as_str()).collect();
        assert_eq!(aliases, vec!["a", "b"]);
    }
}
