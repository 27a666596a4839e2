//! Station code types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A schedule-provider station code: `s` followed by one or more digits.
///
/// Users type codes with or without the `s` prefix, so `parse` normalises
/// bare digits. Any `StationCode` value is well-formed by construction.
///
/// # Examples
///
/// ```
/// use trip_bot::domain::StationCode;
///
/// let code = StationCode::parse("s9613483").unwrap();
/// assert_eq!(code.as_str(), "s9613483");
///
/// // Bare digits get the prefix
/// assert_eq!(StationCode::parse("9613483").unwrap(), code);
///
/// // Names are not codes
/// assert!(StationCode::parse("Taganrog").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode(String);

impl StationCode {
    /// Parse and normalise a station code.
    ///
    /// Surrounding whitespace is ignored and an upper-case `S` prefix is
    /// accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::EmptyStation);
        }

        let digits = s
            .strip_prefix('s')
            .or_else(|| s.strip_prefix('S'))
            .unwrap_or(s);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidStation(s.to_string()));
        }

        Ok(StationCode(format!("s{digits}")))
    }

    /// Returns the code, always with its `s` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StationCode::parse(&value)
    }
}

impl From<StationCode> for String {
    fn from(code: StationCode) -> Self {
        code.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station as shown to the user: code plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub code: StationCode,
    pub name: String,
}

impl Station {
    pub fn new(code: StationCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}
