//! Configuration validation
//!
//! Rules:
//! - field ranges declared on the contract types (validator derive)
//! - sync step band is non-empty (min_step < max_step)
//! - corner and experiment trigger levels are disjoint
//! - primary and secondary group names differ

use contracts::{AlignmentConfig, ContractError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate an AlignmentConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &AlignmentConfig) -> Result<(), ContractError> {
    validate_declared_rules(config)?;
    validate_sync_band(config)?;
    validate_event_levels(config)?;
    validate_groups(config)?;
    Ok(())
}

/// Field-level rules declared with `#[validate(..)]`
fn validate_declared_rules(config: &AlignmentConfig) -> Result<(), ContractError> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, code) = first_violation(&errors, "")
                .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
            Err(ContractError::config_validation(
                field,
                format!("rule '{code}' violated"),
            ))
        }
    }
}

fn first_violation(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                if let Some(err) = errs.first() {
                    return Some((path, err.code.to_string()));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_violation(inner, &path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_violation(inner, &format!("{path}[{idx}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// The sync step band must be a real open interval
fn validate_sync_band(config: &AlignmentConfig) -> Result<(), ContractError> {
    let sync = &config.sync;
    if sync.min_step >= sync.max_step {
        return Err(ContractError::config_validation(
            "sync.min_step / sync.max_step",
            format!(
                "min_step ({}) must be < max_step ({})",
                sync.min_step, sync.max_step
            ),
        ));
    }
    Ok(())
}

/// A trigger level can mark either a corner or an experiment start, not both
fn validate_event_levels(config: &AlignmentConfig) -> Result<(), ContractError> {
    let events = &config.events;
    for level in &events.corner_levels {
        if events.experiment_levels.contains(level) {
            return Err(ContractError::config_validation(
                "events.corner_levels / events.experiment_levels",
                format!("trigger level {level} is used for both corners and experiment starts"),
            ));
        }
    }
    Ok(())
}

/// Group names identify the two array groups
fn validate_groups(config: &AlignmentConfig) -> Result<(), ContractError> {
    let container = &config.container;
    if container.primary_group == container.secondary_group {
        return Err(ContractError::config_validation(
            "container.secondary_group",
            format!(
                "group name '{}' is used for both streams",
                container.secondary_group
            ),
        ));
    }
    Ok(())
}
