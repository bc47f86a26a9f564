//! Type definitions and aliases

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Identifier issued by the server under test for a created user.
///
/// Servers backed by snowflake-style generators sometimes serialize large ids
/// as strings, so both JSON numbers and numeric strings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(UserId(n)),
            Repr::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(UserId)
                .map_err(|e| serde::de::Error::custom(format!("invalid id '{}': {}", s, e))),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Processing endpoint variant exercised by the latency comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Server runs the processing steps one after another
    Serial,
    /// Server runs the processing steps concurrently
    Parallel,
}

impl ProcessingMode {
    /// Both modes in the order they are sampled
    pub const ALL: [ProcessingMode; 2] = [ProcessingMode::Serial, ProcessingMode::Parallel];

    /// Path segment under `<base_url>/process/`
    pub fn path_segment(&self) -> &'static str {
        match self {
            ProcessingMode::Serial => "serial",
            ProcessingMode::Parallel => "parallel",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingMode::Serial => "Serial processing",
            ProcessingMode::Parallel => "Parallel processing",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_number_and_string() {
        let from_number: UserId = serde_json::from_str("42").unwrap();
        let from_string: UserId = serde_json::from_str("\"1958374629384755200\"").unwrap();

        assert_eq!(from_number, UserId(42));
        assert_eq!(from_string, UserId(1958374629384755200));
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        assert!(serde_json::from_str::<UserId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<UserId>("null").is_err());
        assert!(serde_json::from_str::<UserId>("1.5").is_err());
    }

    #[test]
    fn test_processing_mode_paths() {
        assert_eq!(ProcessingMode::Serial.path_segment(), "serial");
        assert_eq!(ProcessingMode::Parallel.to_string(), "parallel");
        assert_eq!(ProcessingMode::ALL[0], ProcessingMode::Serial);
    }
}
