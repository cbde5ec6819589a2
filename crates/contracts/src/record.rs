//! EventRecord - secondary stream input
//!
//! One record of the eye tracker's multiplexed telemetry log. Every record carries a
//! timestamp and a status code; all other fields are optional because the device
//! interleaves several telemetry types in one stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Eye side tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sync port signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    /// Pulse emitted by the eye tracker
    Out,
    /// Pulse received by the eye tracker
    In,
}

impl SyncDirection {
    /// Numeric code stored in the sync port channel (0=out, 1=in)
    pub fn code(self) -> f64 {
        match self {
            Self::Out => 0.0,
            Self::In => 1.0,
        }
    }
}

/// Eye tracker event record
///
/// Field names follow the device's JSON-lines log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Raw device timestamp (device-native unit)
    pub ts: f64,

    /// Error/status code (0 = ok)
    pub s: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye: Option<Eye>,

    // Pupil
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pc: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pd: Option<f64>,

    // Gaze
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gd: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gp: Option<[f64; 2]>,
    /// Undocumented companion value of `gp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gp3: Option<[f64; 3]>,

    // MEMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gy: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<[f64; 3]>,

    // Timestamps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evts: Option<f64>,

    // Sync port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<SyncDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<f64>,
}

/// Property carried by some event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    PupilCenter,
    PupilDiameter,
    GazeDirection,
    GazePosition,
    GazePosition3d,
    Gyroscope,
    Accelerometer,
    PipelineTimestamp,
    VideoTimestamp,
    EyeVideoTimestamp,
    SyncPort,
}

impl PropertyKey {
    /// Field name in the device log
    pub fn field(self) -> &'static str {
        match self {
            Self::PupilCenter => "pc",
            Self::PupilDiameter => "pd",
            Self::GazeDirection => "gd",
            Self::GazePosition => "gp",
            Self::GazePosition3d => "gp3",
            Self::Gyroscope => "gy",
            Self::Accelerometer => "ac",
            Self::PipelineTimestamp => "pts",
            Self::VideoTimestamp => "vts",
            Self::EyeVideoTimestamp => "evts",
            Self::SyncPort => "dir",
        }
    }

    /// Number of value components, excluding the status column
    pub fn arity(self) -> usize {
        match self {
            Self::PupilDiameter | Self::VideoTimestamp | Self::EyeVideoTimestamp => 1,
            Self::PipelineTimestamp | Self::SyncPort => 2,
            Self::PupilCenter
            | Self::GazeDirection
            | Self::GazePosition
            | Self::GazePosition3d
            | Self::Gyroscope
            | Self::Accelerometer => 3,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl EventRecord {
    /// Whether this record carries the given property
    pub fn has(&self, key: PropertyKey) -> bool {
        match key {
            PropertyKey::PupilCenter => self.pc.is_some(),
            PropertyKey::PupilDiameter => self.pd.is_some(),
            PropertyKey::GazeDirection => self.gd.is_some(),
            PropertyKey::GazePosition => self.gp.is_some(),
            PropertyKey::GazePosition3d => self.gp3.is_some(),
            PropertyKey::Gyroscope => self.gy.is_some(),
            PropertyKey::Accelerometer => self.ac.is_some(),
            PropertyKey::PipelineTimestamp => self.pts.is_some(),
            PropertyKey::VideoTimestamp => self.vts.is_some(),
            PropertyKey::EyeVideoTimestamp => self.evts.is_some(),
            PropertyKey::SyncPort => self.dir.is_some(),
        }
    }

    /// Value components of a property, `None` if the record lacks it.
    ///
    /// Companion fields that are absent (`l`, `pv`, `sig`) are reported as NaN.
    pub fn values(&self, key: PropertyKey) -> Option<Vec<f64>> {
        let companion = |v: Option<f64>| v.unwrap_or(f64::NAN);
        match key {
            PropertyKey::PupilCenter => self.pc.map(|v| v.to_vec()),
            PropertyKey::PupilDiameter => self.pd.map(|v| vec![v]),
            PropertyKey::GazeDirection => self.gd.map(|v| v.to_vec()),
            PropertyKey::GazePosition => self.gp.map(|[x, y]| vec![x, y, companion(self.l)]),
            PropertyKey::GazePosition3d => self.gp3.map(|v| v.to_vec()),
            PropertyKey::Gyroscope => self.gy.map(|v| v.to_vec()),
            PropertyKey::Accelerometer => self.ac.map(|v| v.to_vec()),
            PropertyKey::PipelineTimestamp => self.pts.map(|v| vec![v, companion(self.pv)]),
            PropertyKey::VideoTimestamp => self.vts.map(|v| vec![v]),
            PropertyKey::EyeVideoTimestamp => self.evts.map(|v| vec![v]),
            PropertyKey::SyncPort => self.dir.map(|d| vec![d.code(), companion(self.sig)]),
        }
    }

    /// Whether this is an outgoing sync pulse
    pub fn is_outgoing_sync(&self) -> bool {
        self.dir == Some(SyncDirection::Out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pupil_record() {
        let line = r#"{"ts":1000,"s":0,"eye":"left","pd":3.2,"gidx":7}"#;
        let record: EventRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.ts, 1000.0);
        assert_eq!(record.eye, Some(Eye::Left));
        assert!(record.has(PropertyKey::PupilDiameter));
        assert!(!record.has(PropertyKey::PupilCenter));
        assert_eq!(record.values(PropertyKey::PupilDiameter), Some(vec![3.2]));
    }

    #[test]
    fn test_sync_port_values() {
        let line = r#"{"ts":5,"s":0,"dir":"in","sig":1}"#;
        let record: EventRecord = serde_json::from_str(line).unwrap();
        assert!(!record.is_outgoing_sync());
        assert_eq!(record.values(PropertyKey::SyncPort), Some(vec![1.0, 1.0]));
    }

    #[test]
    fn test_missing_companion_is_nan() {
        let record = EventRecord {
            gp: Some([0.5, 0.25]),
            ..Default::default()
        };
        let values = record.values(PropertyKey::GazePosition).unwrap();
        assert_eq!(&values[..2], &[0.5, 0.25]);
        assert!(values[2].is_nan());
    }

    #[test]
    fn test_arity_matches_values() {
        let record = EventRecord {
            pc: Some([1.0, 2.0, 3.0]),
            pd: Some(1.0),
            gd: Some([1.0, 0.0, 0.0]),
            gp: Some([0.1, 0.2]),
            l: Some(9.0),
            gp3: Some([1.0, 2.0, 3.0]),
            gy: Some([0.0; 3]),
            ac: Some([0.0; 3]),
            pts: Some(1.0),
            pv: Some(2.0),
            vts: Some(1.0),
            evts: Some(1.0),
            dir: Some(SyncDirection::Out),
            sig: Some(0.0),
            ..Default::default()
        };
        for key in [
            PropertyKey::PupilCenter,
            PropertyKey::PupilDiameter,
            PropertyKey::GazeDirection,
            PropertyKey::GazePosition,
            PropertyKey::GazePosition3d,
            PropertyKey::Gyroscope,
            PropertyKey::Accelerometer,
            PropertyKey::PipelineTimestamp,
            PropertyKey::VideoTimestamp,
            PropertyKey::EyeVideoTimestamp,
            PropertyKey::SyncPort,
        ] {
            assert_eq!(record.values(key).map(|v| v.len()), Some(key.arity()), "{key}");
        }
    }
}
