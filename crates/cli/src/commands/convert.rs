//! `convert` command implementation.

use anyhow::{Context, Result};
use container_store::JsonFileStore;
use observability::{record_diagnostic, write_metrics_snapshot, ConversionSummary};
use sync_engine::ContainerAssembler;
use tracing::info;

use super::{load_config, load_inputs};
use crate::cli::ConvertArgs;

/// Execute the `convert` command
pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let metrics = match &args.metrics_out {
        Some(_) => Some(observability::install_metrics_recorder()?),
        None => None,
    };

    let config = load_config(&args.session)?;
    let loaded = load_inputs(&args.session)?;
    for diagnostic in &loaded.diagnostics {
        record_diagnostic(diagnostic);
    }

    let assembler = ContainerAssembler::new(config).with_overrides(args.session.overrides());
    let output_dir = &args.output_dir;
    let assembled = assembler
        .assemble(&loaded.input, |name| JsonFileStore::create(output_dir, name))
        .with_context(|| format!("Failed to convert session {}", loaded.input.session))?;

    // Descriptor diagnostics were raised first, keep them first
    let mut report = assembled.report;
    let mut diagnostics = loaded.diagnostics;
    diagnostics.append(&mut report.diagnostics);
    report.diagnostics = diagnostics;

    println!("{}", ConversionSummary::from(&report));
    println!("Container written to {}", assembled.store.path().display());
    info!(file = %assembled.store.path().display(), "conversion complete");

    if let (Some(handle), Some(path)) = (&metrics, &args.metrics_out) {
        write_metrics_snapshot(handle, path)?;
    }
    Ok(())
}
