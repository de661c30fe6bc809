//! Device boards — the set of records a virtual controller starts with.

use unibridge_domain::raw::RawDevice;

/// Failure loading a board description.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid board description")]
    Parse(#[source] serde_json::Error),
}

/// Parse a board from the controller's JSON enumeration format: an array of
/// `{dev, relay_type?, circuit, alias?, value}` records. Unknown fields are
/// ignored.
///
/// # Errors
///
/// Returns [`BoardError::Parse`] when the document is not such an array.
pub fn from_json(json: &str) -> Result<Vec<RawDevice>, BoardError> {
    serde_json::from_str(json).map_err(BoardError::Parse)
}

/// A small demo board: a dimmable light, two relays, a digital output, a
/// wall switch and a light sensor.
#[must_use]
pub fn demo() -> Vec<RawDevice> {
    vec![
        RawDevice::analog_output("1_01", 0.0).with_alias("al_ceiling_light"),
        RawDevice::relay("2_01", false).with_alias("al_hall_light"),
        RawDevice::relay("2_02", false).with_alias("al_fan"),
        RawDevice::digital_output("1_02", false).with_alias("al_doorbell"),
        RawDevice::input("1_01", false).with_alias("al_wall_switch"),
        RawDevice::analog_input("1_02", 5.0).with_alias("al_lux"),
    ]
}
