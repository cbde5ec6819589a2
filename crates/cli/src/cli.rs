//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts::OffsetOverrides;
use ingestion::SessionPaths;

/// Aligner - EEG and eye tracker session converter
#[derive(Parser, Debug)]
#[command(
    name = "aligner",
    author,
    version,
    about = "Align EEG and eye tracker recordings into one annotated container",
    long_about = "Converts one recording session into an annotated container.\n\n\
                  Resolves the clock offsets of both devices from their sync pulses, \n\
                  writes every stream onto the common time axis and annotates the \n\
                  trigger events as regions."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ALIGNER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "ALIGNER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level used when `RUST_LOG` is not set
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one session into a container file
    Convert(ConvertArgs),

    /// Resolve offsets and report what a conversion would write
    Inspect(InspectArgs),

    /// Validate an alignment configuration file
    Validate(ValidateArgs),
}

/// Inputs shared by `convert` and `inspect`
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// First part of the EEG recording (`<session>_<...>_<part>.json`)
    pub primary: PathBuf,

    /// Session descriptor CSV
    #[arg(short = 'm', long = "metadata")]
    pub metadata: PathBuf,

    /// Eye tracker event log (JSON lines)
    #[arg(short = 't', long = "tracker")]
    pub tracker: Option<PathBuf>,

    /// Manual EEG offset in seconds, skips sync pulse detection
    #[arg(long, allow_hyphen_values = true)]
    pub primary_offset: Option<f64>,

    /// Manual eye tracker offset in its native unit, skips sync pulse detection
    #[arg(long, allow_hyphen_values = true)]
    pub secondary_offset: Option<f64>,

    /// Alignment configuration (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "ALIGNER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl SessionArgs {
    pub fn paths(&self) -> SessionPaths {
        SessionPaths {
            primary: self.primary.clone(),
            secondary: self.tracker.clone(),
            descriptor: self.metadata.clone(),
        }
    }

    pub fn overrides(&self) -> OffsetOverrides {
        OffsetOverrides {
            primary: self.primary_offset,
            secondary: self.secondary_offset,
        }
    }
}

/// Arguments for the `convert` command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Directory receiving `<session>.json`
    #[arg(short, long, default_value = ".", env = "ALIGNER_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Write a Prometheus text snapshot of the conversion metrics
    #[arg(long, env = "ALIGNER_METRICS_OUT")]
    pub metrics_out: Option<PathBuf>,
}

/// Arguments for the `inspect` command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "aligner.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
