//! Eye tracker property channels.
//!
//! Each channel selects the records carrying one property (optionally for one
//! eye), orders them by timestamp and shifts the timestamps onto the common
//! axis. A sample is the property's components followed by the record status.

use contracts::{ContractError, EventRecord, Eye, PropertyKey, StreamOffset};
use tracing::debug;

/// Array kind of every property channel
pub const PROPERTY_KIND: &str = "nix.tobii.property";

/// Declarative description of one property channel
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Array name
    pub name: &'static str,
    pub key: PropertyKey,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    /// Component labels, status column included
    pub components: &'static [&'static str],
    /// Only records of this eye, when set
    pub eye: Option<Eye>,
    /// Appended to the array description
    pub note: Option<&'static str>,
}

impl PropertyDescriptor {
    fn new(
        name: &'static str,
        key: PropertyKey,
        label: &'static str,
        unit: Option<&'static str>,
        components: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            key,
            label,
            unit,
            components,
            eye: None,
            note: None,
        }
    }

    fn for_eye(mut self, eye: Eye) -> Self {
        self.eye = Some(eye);
        self
    }

    fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Tuple width of one sample
    pub fn width(&self) -> usize {
        self.components.len()
    }

    fn selects(&self, record: &EventRecord) -> bool {
        record.has(self.key) && self.eye.is_none_or(|eye| record.eye == Some(eye))
    }
}

const XYZ: &[&str] = &["X", "Y", "Z", "error"];

/// All property channels written for a session, in container order
pub fn catalog() -> Vec<PropertyDescriptor> {
    use PropertyKey::*;

    vec![
        PropertyDescriptor::new("pupil center left", PupilCenter, "coordinates", Some("mm"), XYZ)
            .for_eye(Eye::Left),
        PropertyDescriptor::new("pupil center right", PupilCenter, "coordinates", Some("mm"), XYZ)
            .for_eye(Eye::Right),
        PropertyDescriptor::new(
            "pupil diameter left",
            PupilDiameter,
            "pupil diameter",
            Some("mm"),
            &["diameter", "error"],
        )
        .for_eye(Eye::Left),
        PropertyDescriptor::new(
            "pupil diameter right",
            PupilDiameter,
            "pupil diameter",
            Some("mm"),
            &["diameter", "error"],
        )
        .for_eye(Eye::Right),
        PropertyDescriptor::new("gaze direction left", GazeDirection, "gaze direction", None, XYZ)
            .for_eye(Eye::Left),
        PropertyDescriptor::new("gaze direction right", GazeDirection, "gaze direction", None, XYZ)
            .for_eye(Eye::Right),
        PropertyDescriptor::new(
            "gaze position",
            GazePosition,
            "positions",
            None,
            &["X", "Y", "l", "error"],
        ),
        PropertyDescriptor::new("gaze position 3D", GazePosition3d, "positions", Some("mm"), XYZ),
        PropertyDescriptor::new("MEMS gyroscope", Gyroscope, "rotation", None, XYZ),
        PropertyDescriptor::new("MEMS accelerometer", Accelerometer, "rotation", Some("m/s^2"), XYZ),
        PropertyDescriptor::new(
            "pipeline timestamp",
            PipelineTimestamp,
            "pipeline timestamp",
            Some("us"),
            &["pipe timestamp", "pipe version", "error"],
        ),
        PropertyDescriptor::new(
            "video timestamp",
            VideoTimestamp,
            "video timestamp",
            Some("us"),
            &["video timestamp", "error"],
        ),
        PropertyDescriptor::new(
            "evts",
            EyeVideoTimestamp,
            "eye video timestamp",
            Some("us"),
            &["eye video timestamp", "error"],
        ),
        PropertyDescriptor::new(
            "sync port",
            SyncPort,
            "sync port",
            None,
            &["direction", "signal", "error"],
        )
        .with_note("direction 0=out, 1=in"),
    ]
}

/// Samples of one property on the common time axis
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChannel {
    pub descriptor: PropertyDescriptor,
    /// Corrected timestamps, ascending
    pub times: Vec<f64>,
    /// One tuple per timestamp: components then status
    pub rows: Vec<Vec<f64>>,
}

impl PropertyChannel {
    pub fn empty(descriptor: PropertyDescriptor) -> Self {
        Self {
            descriptor,
            times: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds property channels against one clock offset
#[derive(Debug, Clone, Copy)]
pub struct PropertyChannelBuilder {
    offset: StreamOffset,
}

impl PropertyChannelBuilder {
    pub fn new(offset: StreamOffset) -> Self {
        Self { offset }
    }

    /// Build one channel
    ///
    /// No matching record yields an empty channel. Records with a non-finite
    /// timestamp cannot be placed on the time axis and fail the channel.
    pub fn build(
        &self,
        records: &[EventRecord],
        descriptor: &PropertyDescriptor,
    ) -> Result<PropertyChannel, ContractError> {
        let mut selected: Vec<&EventRecord> =
            records.iter().filter(|r| descriptor.selects(r)).collect();

        if let Some(bad) = selected.iter().find(|r| !r.ts.is_finite()) {
            return Err(ContractError::invalid_input(
                descriptor.name,
                format!("record timestamp {} is not finite", bad.ts),
            ));
        }
        // Stable: records sharing a timestamp keep their log order
        selected.sort_by(|a, b| a.ts.total_cmp(&b.ts));

        let mut channel = PropertyChannel::empty(descriptor.clone());
        for record in selected {
            let Some(mut row) = record.values(descriptor.key) else {
                continue;
            };
            row.push(record.s);
            channel.times.push(self.offset.correct(record.ts));
            channel.rows.push(row);
        }

        debug!(channel = descriptor.name, samples = channel.len(), "property channel built");
        Ok(channel)
    }
}
