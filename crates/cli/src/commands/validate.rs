//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{AlignmentConfig, EdgePolarity};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    sync_band: (f64, f64),
    polarity: EdgePolarity,
    reference_pulse_index: usize,
    secondary_lag_s: f64,
    corner_levels: Vec<f64>,
    experiment_levels: Vec<f64>,
    primary_group: String,
    secondary_group: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    sync_band: (config.sync.min_step, config.sync.max_step),
                    polarity: config.sync.polarity,
                    reference_pulse_index: config.sync.reference_pulse_index,
                    secondary_lag_s: config.sync.secondary_lag_s,
                    corner_levels: config.events.corner_levels.clone(),
                    experiment_levels: config.events.experiment_levels.clone(),
                    primary_group: config.container.primary_group.clone(),
                    secondary_group: config.container.secondary_group.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &AlignmentConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sync.polarity == EdgePolarity::Any {
        warnings.push(
            "sync.polarity = any - falling pulse edges count towards reference_pulse_index"
                .to_string(),
        );
    }

    if config.sync.secondary_lag_s == 0.0 {
        warnings.push(
            "sync.secondary_lag_s is 0 - the first outgoing tracker pulse is taken as the reference instant"
                .to_string(),
        );
    }

    if !config.primary.gains.is_empty() {
        warnings.push(format!(
            "primary.gains lists {} channel(s); further channels use gain_base",
            config.primary.gains.len()
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!(
                "\n  Sync band: ({}, {}), {:?} edges",
                summary.sync_band.0, summary.sync_band.1, summary.polarity
            );
            println!("  Reference pulse: #{}", summary.reference_pulse_index);
            println!("  Tracker lag: {} s", summary.secondary_lag_s);
            println!("  Corner levels: {:?}", summary.corner_levels);
            println!("  Experiment levels: {:?}", summary.experiment_levels);
            println!(
                "  Groups: '{}', '{}'",
                summary.primary_group, summary.secondary_group
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
