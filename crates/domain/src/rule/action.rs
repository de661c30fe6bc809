//! Action — what a rule does once its guard has been evaluated.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::alias::Alias;
use crate::error::RuleError;

/// A `then` / `else` branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Absent branch, or an atom that could not be compiled.
    Noop,
    /// Run each member in order, regardless of failures.
    Sequence(Vec<Action>),
    Command(Command),
}

/// One `"<cmd> <alias> [<param>]"` atom.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `ifft <event>`: trigger an external webhook.
    Webhook { event: String },
    On { alias: Alias },
    Off { alias: Alias },
    /// Toggle a relay.
    Switch { alias: Alias },
    /// Set an analog output level, clamped to `0..=100`.
    Set { alias: Alias, level: f64 },
    /// `setval <alias> <source>`: copy the level of another analog circuit.
    CopyLevel { alias: Alias, source: Alias },
    /// Arm, or cancel if pending, a delayed switch-off of a relay.
    Timer { alias: Alias, delay: Duration },
}

impl Command {
    /// Circuit the command acts on, `None` for webhooks.
    #[must_use]
    pub fn target(&self) -> Option<&Alias> {
        match self {
            Self::Webhook { .. } => None,
            Self::On { alias }
            | Self::Off { alias }
            | Self::Switch { alias }
            | Self::Set { alias, .. }
            | Self::CopyLevel { alias, .. }
            | Self::Timer { alias, .. } => Some(alias),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webhook { event } => write!(f, "ifft {event}"),
            Self::On { alias } => write!(f, "on {alias}"),
            Self::Off { alias } => write!(f, "off {alias}"),
            Self::Switch { alias } => write!(f, "switch {alias}"),
            Self::Set { alias, level } => write!(f, "set {alias} {level}"),
            Self::CopyLevel { alias, source } => write!(f, "setval {alias} {source}"),
            Self::Timer { alias, delay } => write!(f, "timer {alias} {}", delay.as_secs_f64()),
        }
    }
}

impl FromStr for Command {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| RuleError::Malformed {
            expression: s.to_string(),
            reason,
        };
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let alias = |token: &str| Alias::new(token).map_err(|_| malformed("invalid alias"));
        let number = |token: &str| {
            token
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| malformed("parameter is not a number"))
        };

        match tokens[..] {
            ["ifft", event] => Ok(Self::Webhook {
                event: event.to_string(),
            }),
            ["on", target] => Ok(Self::On {
                alias: alias(target)?,
            }),
            ["off", target] => Ok(Self::Off {
                alias: alias(target)?,
            }),
            ["switch", target] => Ok(Self::Switch {
                alias: alias(target)?,
            }),
            ["set", target, level] => Ok(Self::Set {
                alias: alias(target)?,
                level: number(level)?,
            }),
            ["setval", target, source] => Ok(Self::CopyLevel {
                alias: alias(target)?,
                source: alias(source)?,
            }),
            ["timer", target, seconds] => {
                let seconds = number(seconds)?;
                if seconds < 0.0 {
                    return Err(malformed("timer delay must not be negative"));
                }
                let delay = Duration::try_from_secs_f64(seconds)
                    .map_err(|_| malformed("timer delay out of range"))?;
                Ok(Self::Timer {
                    alias: alias(target)?,
                    delay,
                })
            }
            [] | [_] => Err(malformed("missing alias")),
            [_, _, _, _, ..] => Err(malformed("too many tokens")),
            ["ifft" | "on" | "off" | "switch" | "set" | "setval" | "timer", ..] => {
                Err(malformed("wrong number of parameters"))
            }
            _ => Err(malformed("unknown command")),
        }
    }
}
