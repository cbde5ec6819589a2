//! Alignment configuration contracts that can be shared across crates.
//!
//! Defaults reproduce the recording protocol: three priming sync pulses before the
//! reference pulse, a 10 s lag between the tracker's first outgoing pulse and the
//! reference instant, corner markers on trigger levels 8/10 and experiment starts on
//! levels 4/6.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::TimeUnit;

/// Complete aligner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AlignmentConfig {
    /// Clock offset resolution
    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    /// Trigger event classification
    #[serde(default)]
    #[validate(nested)]
    pub events: EventConfig,

    /// Biosignal array annotations
    #[serde(default)]
    #[validate(nested)]
    pub primary: PrimaryConfig,

    /// Eye tracker stream settings
    #[serde(default)]
    pub secondary: SecondaryConfig,

    /// Container layout
    #[serde(default)]
    #[validate(nested)]
    pub container: ContainerConfig,
}

/// Which trigger transitions count as sync-class edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolarity {
    /// Only upward transitions (pulse onsets)
    #[default]
    Rising,
    /// Upward and downward transitions
    Any,
}

/// Sync pulse detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    /// Lower bound (exclusive) of a sync-class trigger step
    #[validate(range(min = 0.0))]
    pub min_step: f64,
    /// Upper bound (exclusive) of a sync-class trigger step
    #[validate(range(min = 0.0))]
    pub max_step: f64,
    /// Edge polarity considered
    #[serde(default)]
    pub polarity: EdgePolarity,
    /// Zero-based index of the reference pulse among sync-class edges
    #[validate(range(max = 1024))]
    pub reference_pulse_index: usize,
    /// Delay between the tracker's first outgoing pulse and the reference instant (seconds)
    #[validate(range(min = 0.0))]
    pub secondary_lag_s: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_step: 1.0,
            max_step: 5.0,
            polarity: EdgePolarity::Rising,
            reference_pulse_index: 3,
            secondary_lag_s: 10.0,
        }
    }
}

/// Trigger event classification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EventConfig {
    /// Post-transition trigger levels marking corners
    #[validate(length(min = 1))]
    pub corner_levels: Vec<f64>,
    /// Post-transition trigger levels marking experiment starts
    #[validate(length(min = 1))]
    pub experiment_levels: Vec<f64>,
    /// Extent of every experiment-start region except the last
    #[validate(range(min = 0.0))]
    pub experiment_extent: f64,
    /// Extent of the last (or only) experiment-start region
    #[validate(range(min = 0.0))]
    pub final_experiment_extent: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            corner_levels: vec![8.0, 10.0],
            experiment_levels: vec![4.0, 6.0],
            experiment_extent: 1.0,
            final_experiment_extent: 100.0,
        }
    }
}

/// Biosignal array annotation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PrimaryConfig {
    #[validate(length(min = 1))]
    pub channel_unit: String,
    pub channel_label: String,
    #[validate(length(min = 1))]
    pub trigger_unit: String,
    pub trigger_label: String,
    /// Gain of channel 1; channel N defaults to `gain_base + N - 1`
    pub gain_base: f64,
    /// Explicit per-channel gains, overriding `gain_base`
    #[serde(default)]
    pub gains: Vec<f64>,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            channel_unit: "uV".to_string(),
            channel_label: "voltage".to_string(),
            trigger_unit: "mV".to_string(),
            trigger_label: "voltage".to_string(),
            gain_base: 100.0,
            gains: Vec::new(),
        }
    }
}

impl PrimaryConfig {
    /// Gain of the zero-based channel index
    pub fn gain(&self, channel: usize) -> f64 {
        self.gains
            .get(channel)
            .copied()
            .unwrap_or(self.gain_base + channel as f64)
    }
}

/// Eye tracker stream configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryConfig {
    /// Native unit of `ts`
    #[serde(default)]
    pub time_unit: TimeUnit,
}

impl SecondaryConfig {
    /// Configured lag expressed in the native unit
    pub fn lag_in_native_unit(&self, sync: &SyncConfig) -> f64 {
        self.time_unit.from_seconds(sync.secondary_lag_s)
    }
}

/// Container layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContainerConfig {
    #[validate(length(min = 1))]
    pub primary_group: String,
    #[validate(length(min = 1))]
    pub secondary_group: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            primary_group: "eeg data".to_string(),
            secondary_group: "tobii data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AlignmentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_lag_in_microseconds() {
        let config = AlignmentConfig::default();
        assert_eq!(
            config.secondary.lag_in_native_unit(&config.sync),
            10_000_000.0
        );
    }

    #[test]
    fn test_gain_override() {
        let mut primary = PrimaryConfig::default();
        assert_eq!(primary.gain(0), 100.0);
        assert_eq!(primary.gain(2), 102.0);
        primary.gains = vec![50.0];
        assert_eq!(primary.gain(0), 50.0);
        assert_eq!(primary.gain(1), 101.0);
    }

    #[test]
    fn test_empty_levels_rejected() {
        let mut config = AlignmentConfig::default();
        config.events.corner_levels.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AlignmentConfig =
            serde_json::from_str(r#"{"secondary": {"time_unit": "ms"}}"#).unwrap();
        assert_eq!(config.secondary.time_unit, TimeUnit::Milliseconds);
        assert_eq!(config.sync.reference_pulse_index, 3);
    }
}
