//! Conversions between controller units (volts `0..=10`, booleans) and
//! canonical units (`0..=100` percent, booleans).

use super::CircuitKind;
use crate::raw::RawValue;

/// Volts to percent.
#[must_use]
pub fn analog_from_raw(volts: f64, inverted: bool) -> f64 {
    let scaled = volts * 10.0;
    let value = if inverted { 100.0 - scaled } else { scaled };
    value.clamp(0.0, 100.0)
}

/// Percent to volts.
#[must_use]
pub fn analog_to_raw(value: f64, inverted: bool) -> f64 {
    let scaled = value / 10.0;
    let volts = if inverted { 10.0 - scaled } else { scaled };
    volts.clamp(0.0, 10.0)
}

/// Store a controller reading in `kind`.
///
/// Analog outputs derive `on` from the converted level before a zero level
/// is coerced to 100, so "off" keeps a non-zero brightness to come back to.
pub fn apply_raw(kind: &mut CircuitKind, raw: RawValue) {
    match kind {
        CircuitKind::RelayOutput(relay) => relay.on = raw.as_bool(),
        CircuitKind::DigitalOutput(output) => output.on = raw.as_bool(),
        CircuitKind::DigitalInput(input) => input.pressed = raw.as_bool(),
        CircuitKind::AnalogInput(input) => {
            input.value = analog_from_raw(raw.as_number(), input.tuning.inverted);
        }
        CircuitKind::AnalogOutput(output) => {
            let value = analog_from_raw(raw.as_number(), output.tuning.inverted);
            output.on = value > 0.0;
            output.value = if value <= 0.0 { 100.0 } else { value };
        }
    }
}

/// Value to write back to the controller, `None` for inputs.
#[must_use]
pub fn to_raw(kind: &CircuitKind) -> Option<RawValue> {
    match kind {
        CircuitKind::RelayOutput(relay) => Some(RawValue::Bool(relay.on)),
        CircuitKind::DigitalOutput(output) => Some(RawValue::Bool(output.on)),
        CircuitKind::AnalogOutput(output) => {
            let volts = if output.on {
                analog_to_raw(output.value, output.tuning.inverted)
            } else {
                0.0
            };
            Some(RawValue::Number(volts))
        }
        CircuitKind::DigitalInput(_) | CircuitKind::AnalogInput(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{AnalogTuning, CircuitType};

    fn analog_output(inverted: bool) -> CircuitKind {
        CircuitKind::new(
            CircuitType::AnalogOutput,
            AnalogTuning {
                inverted,
                ..AnalogTuning::default()
            },
        )
    }

    #[test]
    fn should_scale_volts_to_percent() {
        assert!((analog_from_raw(5.0, false) - 50.0).abs() < f64::EPSILON);
        assert!((analog_from_raw(2.0, true) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_clamp_at_both_ends() {
        assert!(analog_from_raw(-1.0, false).abs() < f64::EPSILON);
        assert!((analog_from_raw(12.5, false) - 100.0).abs() < f64::EPSILON);
        assert!(analog_to_raw(-20.0, false).abs() < f64::EPSILON);
        assert!((analog_to_raw(250.0, false) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_roundtrip_analog_values_within_one_step() {
        let mut previous = -1.0;
        for tenth in 0..=100 {
            let volts = f64::from(tenth) / 10.0;
            let value = analog_from_raw(volts, false);
            assert!(value >= previous, "scaling must be monotonic");
            previous = value;
            let back = analog_to_raw(value, false);
            assert!((back - volts).abs() <= 1.0);
        }
    }

    #[test]
    fn should_mark_analog_output_on_when_value_positive() {
        let mut kind = analog_output(false);
        apply_raw(&mut kind, RawValue::Number(5.0));
        let CircuitKind::AnalogOutput(output) = &kind else {
            panic!("expected analog output");
        };
        assert!(output.on);
        assert!((output.value - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_coerce_zero_analog_output_to_full_level_while_off() {
        let mut kind = analog_output(false);
        apply_raw(&mut kind, RawValue::Number(0.0));
        let CircuitKind::AnalogOutput(output) = &kind else {
            panic!("expected analog output");
        };
        assert!(!output.on);
        assert!((output.value - 100.0).abs() < f64::EPSILON);
        assert_eq!(to_raw(&kind), Some(RawValue::Number(0.0)));
    }

    #[test]
    fn should_coerce_inverted_full_scale_reading_to_full_level() {
        let mut kind = analog_output(true);
        apply_raw(&mut kind, RawValue::Number(10.0));
        let CircuitKind::AnalogOutput(output) = &kind else {
            panic!("expected analog output");
        };
        assert!(!output.on);
        assert!((output.value - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_write_inverted_level() {
        let mut kind = analog_output(true);
        apply_raw(&mut kind, RawValue::Number(2.0));
        assert_eq!(to_raw(&kind), Some(RawValue::Number(2.0)));
    }

    #[test]
    fn should_assign_booleans_verbatim() {
        let mut kind = CircuitKind::new(CircuitType::RelayOutput, AnalogTuning::default());
        apply_raw(&mut kind, RawValue::Number(1.0));
        assert_eq!(kind.switched_on(), Some(true));
        assert_eq!(to_raw(&kind), Some(RawValue::Bool(true)));
    }

    #[test]
    fn should_not_convert_inputs_back() {
        let input = CircuitKind::new(CircuitType::DigitalInput, AnalogTuning::default());
        let sensor = CircuitKind::new(CircuitType::AnalogInput, AnalogTuning::default());
        assert_eq!(to_raw(&input), None);
        assert_eq!(to_raw(&sensor), None);
    }
}
