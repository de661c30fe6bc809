//! Alias — the user-facing name that identifies a circuit.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable, user-assigned name of a circuit, decoupled from its hardware
/// address.
///
/// Aliases are single words: they appear inside whitespace-separated rule
/// expressions such as `"click frontdoor"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    /// Validate and wrap a name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAlias`] for an empty name and
    /// [`ValidationError::AliasWhitespace`] when it contains whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyAlias);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ValidationError::AliasWhitespace(name));
        }
        Ok(Self(name))
    }

    /// Borrow the alias as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable form: underscores become spaces.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.0)
    }
}

/// Replace underscores with spaces, the consumer does not accept them in
/// names.
#[must_use]
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Alias {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Alias {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

impl Borrow<str> for Alias {
    fn borrow(&self) -> &str {
        &self.0
    }
}
