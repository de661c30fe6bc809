//! Condition — the `if` guard of a rule.

use std::fmt;
use std::str::FromStr;

use crate::alias::Alias;
use crate::error::RuleError;

/// A predicate over circuit state. Lists are combined with OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// No `if` given.
    Always,
    /// A guard that could not be compiled.
    Never,
    /// True when any member holds; an empty list never holds.
    Any(Vec<Condition>),
    /// `on <alias>` / `off <alias>`.
    State { alias: Alias, on: bool },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Never => f.write_str("never"),
            Self::Any(items) => {
                f.write_str("any(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::State { alias, on: true } => write!(f, "on {alias}"),
            Self::State { alias, on: false } => write!(f, "off {alias}"),
        }
    }
}

impl FromStr for Condition {
    type Err = RuleError;

    /// Parse one atomic test.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| RuleError::Malformed {
            expression: s.to_string(),
            reason,
        };
        let mut tokens = s.split_whitespace();
        let (Some(state), Some(alias), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(malformed("expected \"<on|off> <alias>\""));
        };
        let on = match state {
            "on" => true,
            "off" => false,
            _ => return Err(malformed("unknown test")),
        };
        let alias = Alias::new(alias).map_err(|_| malformed("invalid alias"))?;
        Ok(Self::State { alias, on })
    }
}
