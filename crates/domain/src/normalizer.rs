//! Event normalizer — maps raw controller records onto circuit types and
//! aliases.

use std::collections::HashMap;

use crate::alias::Alias;
use crate::circuit::CircuitType;
use crate::error::ClassificationError;
use crate::raw::RawDevice;

/// Prefix marking a controller-side alias meant for the bridge.
pub const ALIAS_PREFIX: &str = "al_";

/// A raw record resolved to the circuit it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub circuit_type: CircuitType,
    pub alias: Alias,
}

/// Classifies raw records, shared by enumeration and live processing.
#[derive(Debug, Clone, Default)]
pub struct EventNormalizer {
    /// Explicit `"<TYPE> <address>" → alias` overrides.
    aliases: HashMap<String, String>,
}

impl EventNormalizer {
    #[must_use]
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Resolve a record to its circuit type and alias.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError`] for device kinds the bridge does not
    /// handle and for records that resolve to no usable alias.
    pub fn normalize(&self, raw: &RawDevice) -> Result<Normalized, ClassificationError> {
        let circuit_type = classify(raw)?;
        let no_alias = || ClassificationError::NoAlias {
            circuit_type,
            address: raw.circuit.clone(),
        };
        let name = resolve_alias(&self.aliases, circuit_type, raw).ok_or_else(no_alias)?;
        let alias = Alias::new(name).map_err(|_| no_alias())?;
        Ok(Normalized {
            circuit_type,
            alias,
        })
    }
}

/// Circuit type of a raw record.
///
/// # Errors
///
/// Returns [`ClassificationError::UnsupportedKind`] for anything other than
/// relays, digital inputs and analog points.
pub fn classify(raw: &RawDevice) -> Result<CircuitType, ClassificationError> {
    match (raw.dev.as_str(), raw.relay_type.as_deref()) {
        ("relay", Some("physical")) => Ok(CircuitType::RelayOutput),
        ("relay", Some("digital")) => Ok(CircuitType::DigitalOutput),
        ("input", _) => Ok(CircuitType::DigitalInput),
        ("ai", _) => Ok(CircuitType::AnalogInput),
        ("ao", _) => Ok(CircuitType::AnalogOutput),
        _ => Err(ClassificationError::UnsupportedKind {
            dev: raw.dev.clone(),
            relay_type: raw.relay_type.clone(),
        }),
    }
}

/// Alias of a raw record: configured mapping first, then the controller-side
/// alias with its [`ALIAS_PREFIX`] stripped, then the controller alias as is.
#[must_use]
pub fn resolve_alias(
    aliases: &HashMap<String, String>,
    circuit_type: CircuitType,
    raw: &RawDevice,
) -> Option<String> {
    let key = format!("{circuit_type} {}", raw.circuit);
    if let Some(alias) = aliases.get(&key) {
        return Some(alias.clone());
    }
    let alias = raw.alias.as_deref()?;
    Some(alias.strip_prefix(ALIAS_PREFIX).unwrap_or(alias).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> EventNormalizer {
        EventNormalizer::new(HashMap::from([(
            "RO 2_01".to_string(),
            "hall_light".to_string(),
        )]))
    }

    #[test]
    fn should_classify_every_supported_kind() {
        let cases = [
            (RawDevice::relay("1", true), CircuitType::RelayOutput),
            (RawDevice::digital_output("1", true), CircuitType::DigitalOutput),
            (RawDevice::input("1", true), CircuitType::DigitalInput),
            (RawDevice::analog_input("1", 1.0), CircuitType::AnalogInput),
            (RawDevice::analog_output("1", 1.0), CircuitType::AnalogOutput),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify(&raw).unwrap(), expected);
        }
    }

    #[test]
    fn should_reject_unknown_device_kind() {
        let mut raw = RawDevice::input("1", false);
        raw.dev = "temp".to_string();
        assert!(matches!(
            classify(&raw),
            Err(ClassificationError::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn should_reject_relay_without_known_subtype() {
        let mut raw = RawDevice::relay("1", false);
        raw.relay_type = None;
        assert!(classify(&raw).is_err());
    }

    #[test]
    fn should_prefer_configured_alias() {
        let raw = RawDevice::relay("2_01", false).with_alias("al_other");
        let normalized = normalizer().normalize(&raw).unwrap();
        assert_eq!(normalized.alias.as_str(), "hall_light");
        assert_eq!(normalized.circuit_type, CircuitType::RelayOutput);
    }

    #[test]
    fn should_strip_alias_prefix() {
        let raw = RawDevice::input("1_01", false).with_alias("al_switch1");
        let normalized = normalizer().normalize(&raw).unwrap();
        assert_eq!(normalized.alias.as_str(), "switch1");
    }

    #[test]
    fn should_keep_unprefixed_controller_alias() {
        let raw = RawDevice::analog_output("A1", 0.0).with_alias("light1");
        let normalized = normalizer().normalize(&raw).unwrap();
        assert_eq!(normalized.alias.as_str(), "light1");
    }

    #[test]
    fn should_key_configured_alias_by_type_code() {
        // same address but a digital output, so the RO mapping does not apply
        let raw = RawDevice::digital_output("2_01", false);
        let err = normalizer().normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::NoAlias {
                circuit_type: CircuitType::DigitalOutput,
                address: "2_01".to_string(),
            }
        );
    }

    #[test]
    fn should_drop_aliases_that_are_not_single_words() {
        let raw = RawDevice::input("1_01", false).with_alias("al_");
        assert!(normalizer().normalize(&raw).is_err());
    }
}
