//! `inspect` command implementation.

use anyhow::{Context, Result};
use contracts::{Diagnostic, OffsetSource, SamplingStrategy, StreamOffset};
use serde::Serialize;
use sync_engine::{ContainerAssembler, InspectionReport};
use tracing::info;

use super::{load_config, load_inputs};
use crate::cli::InspectArgs;

/// Inspection result for JSON output
#[derive(Serialize)]
struct InspectOutput<'a> {
    #[serde(flatten)]
    report: &'a InspectionReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    descriptor_diagnostics: Vec<Diagnostic>,
}

/// Execute the `inspect` command
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let config = load_config(&args.session)?;
    let loaded = load_inputs(&args.session)?;

    let assembler = ContainerAssembler::new(config).with_overrides(args.session.overrides());
    let report = assembler
        .inspect(&loaded.input)
        .with_context(|| format!("Failed to inspect session {}", loaded.input.session))?;
    info!(session = %report.session, "inspection finished");

    if args.json {
        let output = InspectOutput {
            report: &report,
            descriptor_diagnostics: loaded.diagnostics.clone(),
        };
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize inspection")?;
        println!("{}", json);
    } else {
        print_inspection(&report, &loaded.diagnostics);
    }

    Ok(())
}

fn describe_offset(offset: &StreamOffset) -> String {
    match offset.source {
        OffsetSource::Resolved => format!("{} (from sync pulses)", offset.value),
        OffsetSource::Manual => format!("{} (manual)", offset.value),
        OffsetSource::Unused => "unused".to_string(),
    }
}

fn print_inspection(report: &InspectionReport, diagnostics: &[Diagnostic]) {
    println!("Session: {}", report.session);
    println!("\nOffsets:");
    println!("  EEG: {}", describe_offset(&report.offsets.primary));
    println!("  Eye tracker: {}", describe_offset(&report.offsets.secondary));

    println!("\nEEG:");
    println!("  Samples: {}", report.primary_samples);
    println!("  Channels: {}", report.channels);
    match report.sampling {
        SamplingStrategy::Uniform { dt } => println!("  Sampling: uniform (dt = {dt} s)"),
        SamplingStrategy::Irregular { dt, drift } => {
            println!("  Sampling: irregular (mean dt = {dt} s, drift = {drift:.6} Hz)")
        }
    }
    println!(
        "  Events: {} corner, {} experiment start",
        report.corner_events, report.experiment_starts
    );

    match report.secondary_records {
        Some(count) => {
            println!("\nEye tracker: {count} records");
            for (name, records) in &report.property_records {
                let marker = if *records == 0 { " (empty)" } else { "" };
                println!("  {name}: {records}{marker}");
            }
        }
        None => println!("\nEye tracker: no log supplied"),
    }

    if !diagnostics.is_empty() {
        println!("\n⚠ Descriptor:");
        for diagnostic in diagnostics {
            println!("  - {}", diagnostic);
        }
    }
}
