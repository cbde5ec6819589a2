//! Input streams handed to the aligner by the loaders.

use serde::{Deserialize, Serialize};

use crate::{ContractError, EventRecord, MetadataNode};

/// Continuous biosignal recording with its trigger channel
///
/// All channels and the trigger share `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryStream {
    /// Sample times (seconds, strictly increasing)
    pub time: Vec<f64>,

    /// Digital trigger level per sample
    pub trigger: Vec<f64>,

    /// Channel data, one vector per channel
    pub channels: Vec<Vec<f64>>,

    /// Nominal sampling rate reported by the amplifier (Hz)
    #[serde(alias = "sr")]
    pub sample_rate: f64,
}

impl PrimaryStream {
    /// Number of samples on the shared time axis
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Check shape and ordering invariants
    pub fn validate(&self) -> Result<(), ContractError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ContractError::invalid_input(
                "primary",
                format!("sample_rate must be > 0, got {}", self.sample_rate),
            ));
        }
        if self.trigger.len() != self.time.len() {
            return Err(ContractError::invalid_input(
                "primary",
                format!(
                    "trigger has {} samples, time axis has {}",
                    self.trigger.len(),
                    self.time.len()
                ),
            ));
        }
        for (idx, channel) in self.channels.iter().enumerate() {
            if channel.len() != self.time.len() {
                return Err(ContractError::invalid_input(
                    "primary",
                    format!(
                        "channel {} has {} samples, time axis has {}",
                        idx + 1,
                        channel.len(),
                        self.time.len()
                    ),
                ));
            }
        }
        if let Some(pos) = self.time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ContractError::invalid_input(
                "primary",
                format!("time is not strictly increasing at sample {}", pos + 1),
            ));
        }
        Ok(())
    }
}

/// Mean of consecutive differences, `None` for fewer than two samples
pub fn mean_interval(time: &[f64]) -> Option<f64> {
    if time.len() < 2 {
        return None;
    }
    let sum: f64 = time.windows(2).map(|w| w[1] - w[0]).sum();
    Some(sum / (time.len() - 1) as f64)
}

/// Time-dimension strategy of a channel group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Store only the interval
    Uniform { dt: f64 },
    /// Store explicit per-sample times
    Irregular { dt: f64, drift: f64 },
}

impl SamplingStrategy {
    /// Mean sampling interval
    pub fn dt(&self) -> f64 {
        match *self {
            Self::Uniform { dt } | Self::Irregular { dt, .. } => dt,
        }
    }

    pub fn is_irregular(&self) -> bool {
        matches!(self, Self::Irregular { .. })
    }
}

/// Everything one conversion consumes
#[derive(Debug, Clone)]
pub struct ConversionInput {
    /// Session name, also the container name
    pub session: String,

    /// Biosignal recording
    pub primary: PrimaryStream,

    /// Eye tracker log, `None` when no log was supplied
    pub secondary: Option<Vec<EventRecord>>,

    /// Session descriptor tree (attached opaquely)
    pub descriptor: MetadataNode,
}
