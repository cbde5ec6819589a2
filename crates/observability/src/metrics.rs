//! Conversion metrics
//!
//! Records the outcome of a conversion through the `metrics` facade and
//! summarizes a `ConversionReport` for terminal output.

use std::collections::BTreeMap;
use std::fmt;

use contracts::{ConversionReport, Diagnostic, OffsetSource, SamplingStrategy};
use metrics::{counter, gauge, histogram};

/// Record metrics for one finished conversion
///
/// Diagnostics are counted separately through [`record_diagnostic`] as they are raised.
pub fn record_conversion_metrics(report: &ConversionReport) {
    counter!("aligner_conversions_total").increment(1);

    counter!("aligner_arrays_written_total", "kind" => "channel")
        .increment(report.channel_arrays as u64);
    counter!("aligner_arrays_written_total", "kind" => "property")
        .increment(report.property_channels as u64);
    gauge!("aligner_empty_property_channels").set(report.empty_property_channels as f64);
    counter!("aligner_property_samples_total").increment(report.property_samples as u64);

    counter!("aligner_events_total", "class" => "corner").increment(report.corner_events as u64);
    counter!("aligner_events_total", "class" => "experiment_start")
        .increment(report.experiment_starts as u64);

    gauge!("aligner_sampling_interval_s").set(report.sampling.dt());
    if let SamplingStrategy::Irregular { drift, .. } = report.sampling {
        gauge!("aligner_sampling_drift_hz").set(drift);
    }

    gauge!(
        "aligner_clock_offset",
        "stream" => "primary",
        "source" => source_label(report.offsets.primary.source)
    )
    .set(report.offsets.primary.value);
    gauge!(
        "aligner_clock_offset",
        "stream" => "secondary",
        "source" => source_label(report.offsets.secondary.source)
    )
    .set(report.offsets.secondary.value);
}

/// Count one recoverable condition
pub fn record_diagnostic(diagnostic: &Diagnostic) {
    counter!(
        "aligner_diagnostics_total",
        "component" => diagnostic.component.as_str(),
        "condition" => diagnostic.condition.as_str()
    )
    .increment(1);
}

/// Record the wall time of one assembly stage
pub fn record_stage_duration_ms(stage: &'static str, millis: f64) {
    histogram!("aligner_stage_duration_ms", "stage" => stage).record(millis);
}

fn source_label(source: OffsetSource) -> &'static str {
    match source {
        OffsetSource::Resolved => "resolved",
        OffsetSource::Manual => "manual",
        OffsetSource::Unused => "unused",
    }
}

/// Human readable summary of a conversion
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub container: String,
    pub primary_offset: (f64, OffsetSource),
    pub secondary_offset: (f64, OffsetSource),
    pub sampling: SamplingStrategy,
    pub channel_arrays: usize,
    pub property_channels: usize,
    pub empty_property_channels: usize,
    pub property_samples: usize,
    pub corner_events: usize,
    pub experiment_starts: usize,
    /// Diagnostic counts keyed by `component/condition`
    pub diagnostic_counts: BTreeMap<String, usize>,
}

impl From<&ConversionReport> for ConversionSummary {
    fn from(report: &ConversionReport) -> Self {
        let mut diagnostic_counts = BTreeMap::new();
        for diag in &report.diagnostics {
            let key = format!("{}/{}", diag.component.as_str(), diag.condition.as_str());
            *diagnostic_counts.entry(key).or_insert(0) += 1;
        }

        Self {
            container: report.container.clone(),
            primary_offset: (report.offsets.primary.value, report.offsets.primary.source),
            secondary_offset: (report.offsets.secondary.value, report.offsets.secondary.source),
            sampling: report.sampling,
            channel_arrays: report.channel_arrays,
            property_channels: report.property_channels,
            empty_property_channels: report.empty_property_channels,
            property_samples: report.property_samples,
            corner_events: report.corner_events,
            experiment_starts: report.experiment_starts,
            diagnostic_counts,
        }
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Conversion Summary: {} ===", self.container)?;
        writeln!(
            f,
            "Primary offset: {} ({})",
            self.primary_offset.0,
            source_label(self.primary_offset.1)
        )?;
        writeln!(
            f,
            "Secondary offset: {} ({})",
            self.secondary_offset.0,
            source_label(self.secondary_offset.1)
        )?;
        match self.sampling {
            SamplingStrategy::Uniform { dt } => writeln!(f, "Sampling: uniform, dt={dt}")?,
            SamplingStrategy::Irregular { dt, drift } => {
                writeln!(f, "Sampling: irregular, dt={dt}, drift={drift:.6}")?
            }
        }
        writeln!(f, "Channel arrays: {}", self.channel_arrays)?;
        writeln!(
            f,
            "Property channels: {} ({} empty, {} samples)",
            self.property_channels, self.empty_property_channels, self.property_samples
        )?;
        writeln!(
            f,
            "Events: {} corner, {} experiment start",
            self.corner_events, self.experiment_starts
        )?;

        if !self.diagnostic_counts.is_empty() {
            writeln!(f, "Diagnostics:")?;
            for (key, count) in &self.diagnostic_counts {
                writeln!(f, "  {key}: {count}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ClockOffsets, Component, Condition, StreamOffset};

    fn report() -> ConversionReport {
        ConversionReport {
            container: "20170412".to_string(),
            offsets: ClockOffsets {
                primary: StreamOffset::resolved(1.5),
                secondary: StreamOffset::manual(2000.0),
            },
            sampling: SamplingStrategy::Uniform { dt: 0.5 },
            channel_arrays: 2,
            property_channels: 14,
            empty_property_channels: 12,
            property_samples: 5,
            corner_events: 1,
            experiment_starts: 0,
            diagnostics: vec![
                Diagnostic::new(
                    Component::PropertyChannelBuilder,
                    Condition::MissingTelemetry,
                    "gaze position",
                ),
                Diagnostic::new(
                    Component::PropertyChannelBuilder,
                    Condition::MissingTelemetry,
                    "sync port",
                ),
                Diagnostic::new(
                    Component::EdgeEventExtractor,
                    Condition::NoExperimentStartFound,
                    "trigger signal",
                ),
            ],
        }
    }

    #[test]
    fn test_summary_counts_diagnostics() {
        let summary = ConversionSummary::from(&report());
        assert_eq!(
            summary
                .diagnostic_counts
                .get("property_channel_builder/missing_telemetry"),
            Some(&2)
        );
        assert_eq!(summary.diagnostic_counts.len(), 2);
    }

    #[test]
    fn test_summary_display() {
        let output = ConversionSummary::from(&report()).to_string();
        assert!(output.contains("Conversion Summary: 20170412"));
        assert!(output.contains("Primary offset: 1.5 (resolved)"));
        assert!(output.contains("Secondary offset: 2000 (manual)"));
        assert!(output.contains("14 (12 empty, 5 samples)"));
        assert!(output.contains("edge_event_extractor/no_experiment_start_found: 1"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let report = report();
        record_conversion_metrics(&report);
        for diag in &report.diagnostics {
            record_diagnostic(diag);
        }
        record_stage_duration_ms("offsets", 0.1);
    }
}
