//! Timezone value object

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A validated IANA timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

/// Error type for unknown timezone names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimezone(pub String);

impl fmt::Display for InvalidTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid timezone: {}", self.0)
    }
}

impl std::error::Error for InvalidTimezone {}

impl Timezone {
    /// Parse an IANA timezone name such as `Europe/Berlin`
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimezone` if the name is not in the IANA database.
    pub fn parse(name: &str) -> Result<Self, InvalidTimezone> {
        Tz::from_str(name.trim())
            .map(Self)
            .map_err(|_| InvalidTimezone(name.to_string()))
    }

    /// UTC timezone
    #[must_use]
    pub const fn utc() -> Self {
        Self(Tz::UTC)
    }

    /// The underlying `chrono-tz` zone
    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.0
    }

    /// Get the timezone name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timezone {
    type Err = InvalidTimezone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_parse() {
        let tz = Timezone::parse("Europe/Berlin").expect("known zone");
        assert_eq!(tz.as_str(), "Europe/Berlin");
    }

    #[test]
    fn test_timezone_parse_trims() {
        assert!(Timezone::parse(" America/New_York ").is_ok());
    }

    #[test]
    fn test_timezone_rejects_unknown() {
        let err = Timezone::parse("Mars/Olympus_Mons").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
        assert!(Timezone::parse("").is_err());
    }

    #[test]
    fn test_timezone_default() {
        let tz = Timezone::default();
        assert_eq!(tz.as_str(), "UTC");
    }

    #[test]
    fn test_timezone_serde() {
        let tz = Timezone::parse("Europe/London").unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/London\"");
        let parsed: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tz);

        assert!(serde_json::from_str::<Timezone>("\"Nowhere/Land\"").is_err());
    }
}
