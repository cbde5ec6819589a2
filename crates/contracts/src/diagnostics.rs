//! Structured diagnostics and the conversion report.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ClockOffsets, SamplingStrategy};

/// Component that raised a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    TimeBase,
    EdgeEventExtractor,
    PropertyChannelBuilder,
    Descriptor,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TimeBase => "time_base",
            Self::EdgeEventExtractor => "edge_event_extractor",
            Self::PropertyChannelBuilder => "property_channel_builder",
            Self::Descriptor => "descriptor",
        }
    }
}

/// Recoverable or informational condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Property channel has no matching records
    MissingTelemetry,
    /// Irregular time dimension chosen, no data lost
    SamplingDriftDetected,
    /// No experiment-start transition in the trigger
    NoExperimentStartFound,
    /// Property channel could not be written and degraded to empty
    ChannelDegraded,
    /// Descriptor row skipped
    MalformedDescriptorRow,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingTelemetry => "missing_telemetry",
            Self::SamplingDriftDetected => "sampling_drift_detected",
            Self::NoExperimentStartFound => "no_experiment_start_found",
            Self::ChannelDegraded => "channel_degraded",
            Self::MalformedDescriptorRow => "malformed_descriptor_row",
        }
    }
}

/// One structured warning: component + condition + affected entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub component: Component,
    pub condition: Condition,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn new(component: Component, condition: Condition, entity: impl Into<String>) -> Self {
        Self {
            component,
            condition,
            entity: entity.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} '{}'",
            self.component.as_str(),
            self.condition.as_str(),
            self.entity
        )?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Summary of one finished conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub container: String,
    pub offsets: ClockOffsets,
    pub sampling: SamplingStrategy,
    pub channel_arrays: usize,
    pub property_channels: usize,
    pub empty_property_channels: usize,
    pub property_samples: usize,
    pub corner_events: usize,
    pub experiment_starts: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    pub fn has(&self, condition: Condition) -> bool {
        self.diagnostics.iter().any(|d| d.condition == condition)
    }
}
