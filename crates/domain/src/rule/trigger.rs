//! Trigger — the `"<event> <alias>"` key a rule listens for.

use std::fmt;
use std::str::FromStr;

use crate::alias::Alias;
use crate::error::RuleError;
use crate::gesture::Gesture;

/// Semantic events a rule can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    Gesture(Gesture),
    /// A relay or digital output reported on.
    On,
    /// A relay or digital output reported off.
    Off,
    /// An analog output reported a new level.
    Change,
    /// An analog input moved by more than its sensitivity.
    Move,
}

impl From<Gesture> for TriggerEvent {
    fn from(gesture: Gesture) -> Self {
        Self::Gesture(gesture)
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gesture(gesture) => gesture.fmt(f),
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Change => f.write_str("change"),
            Self::Move => f.write_str("move"),
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "click" => Gesture::Click.into(),
            "doubleclick" => Gesture::DoubleClick.into(),
            "longclick" => Gesture::LongClick.into(),
            "singleclick" => Gesture::SingleClick.into(),
            "on" => Self::On,
            "off" => Self::Off,
            "change" => Self::Change,
            "move" => Self::Move,
            _ => return Err(()),
        })
    }
}

/// An event on a given circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    pub event: TriggerEvent,
    pub alias: Alias,
}

impl TriggerKey {
    #[must_use]
    pub fn new(event: impl Into<TriggerEvent>, alias: Alias) -> Self {
        Self {
            event: event.into(),
            alias,
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.event, self.alias)
    }
}

impl FromStr for TriggerKey {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| RuleError::Malformed {
            expression: s.to_string(),
            reason,
        };
        let mut tokens = s.split_whitespace();
        let (Some(event), Some(alias), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(malformed("expected \"<event> <alias>\""));
        };
        let event = event
            .parse::<TriggerEvent>()
            .map_err(|()| malformed("unknown event"))?;
        let alias = Alias::new(alias).map_err(|_| malformed("invalid alias"))?;
        Ok(Self { event, alias })
    }
}
