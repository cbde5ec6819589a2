//! Command implementations.

mod convert;
mod inspect;
mod validate;

pub use convert::run_convert;
pub use inspect::run_inspect;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::AlignmentConfig;
use ingestion::LoadedSession;

use crate::cli::SessionArgs;

/// Configuration from `--config`, or the defaults
fn load_config(args: &SessionArgs) -> Result<AlignmentConfig> {
    config_loader::ConfigLoader::load_or_default(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Default configuration is invalid".to_string(),
    })
}

fn load_inputs(args: &SessionArgs) -> Result<LoadedSession> {
    ingestion::load_session(&args.paths())
        .with_context(|| format!("Failed to load session from {}", args.primary.display()))
}
