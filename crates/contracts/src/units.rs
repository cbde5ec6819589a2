//! Time units understood by the aligner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of a stream's native clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Seconds
    #[serde(alias = "s")]
    Seconds,
    /// Milliseconds
    #[serde(alias = "ms")]
    Milliseconds,
    /// Microseconds (eye tracker default)
    #[default]
    #[serde(alias = "us")]
    Microseconds,
}

impl TimeUnit {
    /// Number of units in one second
    pub fn per_second(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Milliseconds => 1e3,
            Self::Microseconds => 1e6,
        }
    }

    /// Convert a duration in seconds into this unit
    pub fn from_seconds(self, seconds: f64) -> f64 {
        seconds * self.per_second()
    }

    /// Unit symbol as written to the container
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "us",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsecond_lag_scaling() {
        assert_eq!(TimeUnit::Microseconds.from_seconds(10.0), 10_000_000.0);
        assert_eq!(TimeUnit::Seconds.from_seconds(10.0), 10.0);
    }

    #[test]
    fn test_unit_aliases() {
        let unit: TimeUnit = serde_json::from_str("\"us\"").unwrap();
        assert_eq!(unit, TimeUnit::Microseconds);
        let unit: TimeUnit = serde_json::from_str("\"milliseconds\"").unwrap();
        assert_eq!(unit, TimeUnit::Milliseconds);
    }
}
