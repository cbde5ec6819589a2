//! Clock offsets between the two device streams.

use serde::{Deserialize, Serialize};

/// Where an offset value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSource {
    /// Located from sync pulses in the data
    Resolved,
    /// Supplied by the operator
    Manual,
    /// Stream absent, nothing to align
    Unused,
}

/// Offset of one stream, in that stream's native unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamOffset {
    pub value: f64,
    pub source: OffsetSource,
}

impl StreamOffset {
    pub fn resolved(value: f64) -> Self {
        Self {
            value,
            source: OffsetSource::Resolved,
        }
    }

    pub fn manual(value: f64) -> Self {
        Self {
            value,
            source: OffsetSource::Manual,
        }
    }

    pub fn unused() -> Self {
        Self {
            value: 0.0,
            source: OffsetSource::Unused,
        }
    }

    /// Shift a raw timestamp onto the common axis
    #[inline]
    pub fn correct(&self, raw: f64) -> f64 {
        raw - self.value
    }

    /// Map a corrected timestamp back to the device clock
    #[inline]
    pub fn restore(&self, corrected: f64) -> f64 {
        corrected + self.value
    }
}

/// Offsets of both streams
///
/// Invariant: `primary.correct(t_sync_primary) == 0` and
/// `secondary.correct(t_sync_secondary) == 0` for the shared sync instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockOffsets {
    pub primary: StreamOffset,
    pub secondary: StreamOffset,
}

/// Operator-supplied offsets, each bypasses resolution for its stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetOverrides {
    pub primary: Option<f64>,
    pub secondary: Option<f64>,
}
