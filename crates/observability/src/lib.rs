//! # Observability
//!
//! Tracing initialization and conversion metrics.
//!
//! ## Features
//!
//! - Tracing setup (JSON/Pretty/Compact), filtered through `RUST_LOG`
//! - Conversion metrics via the `metrics` facade
//! - Optional Prometheus text snapshot written to a file after a run
//!
//! ## Usage Example
//!
//! ```ignore
//! let handle = observability::install_metrics_recorder()?;
//! observability::init_with_config(ObservabilityConfig::default())?;
//!
//! let assembled = assembler.assemble(&input, |name| Ok(MemoryStore::new(name)))?;
//! println!("{}", ConversionSummary::from(&assembled.report));
//! observability::write_metrics_snapshot(&handle, Path::new("metrics.prom"))?;
//! ```

pub mod metrics;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use crate::metrics::{
    record_conversion_metrics, record_diagnostic, record_stage_duration_ms, ConversionSummary,
};

/// Initialize tracing with the default configuration
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log output format
    pub log_format: LogFormat,
    /// Level used when `RUST_LOG` is not set
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Compact,
            default_log_level: "info".to_string(),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines
    Json,
    /// Human readable, multi-line
    Pretty,
    /// Single line per event
    #[default]
    Compact,
}

/// Initialize tracing with a custom configuration
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().pretty().with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact().with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    tracing::debug!(log_format = ?config.log_format, "Observability initialized");
    Ok(())
}

/// Install a Prometheus recorder as the global metrics recorder
///
/// No HTTP listener is started; render the handle after the run instead.
pub fn install_metrics_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// Render the current metrics in Prometheus text format to `path`
pub fn write_metrics_snapshot(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    let rendered = handle.render();
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write metrics snapshot to {}", path.display()))?;
    tracing::info!(file = %path.display(), "metrics snapshot written");
    Ok(())
}
