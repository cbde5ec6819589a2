//! Configuration parsing
//!
//! TOML and JSON documents are read into one generic tree before the typed
//! config is built. Section names are checked there, and a reference lag
//! written with a unit (`secondary_lag = "10000 ms"`) is turned into seconds.

use std::fmt;

use contracts::{AlignmentConfig, ContractError, TimeUnit};
use serde_json::{Map, Value};

/// Top-level sections of an alignment config
const SECTIONS: [&str; 5] = ["sync", "events", "primary", "secondary", "container"];

const LAG_WITH_UNIT: &str = "secondary_lag";
const LAG_SECONDS: &str = "secondary_lag_s";

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => f.write_str("TOML"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Parse configuration according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<AlignmentConfig, ContractError> {
    let mut document = read_document(content, format)?;
    let sections = document
        .as_object_mut()
        .ok_or_else(|| ContractError::config_parse(format!("{format} config must be a table of sections")))?;

    check_sections(sections)?;
    if let Some(sync) = sections.get_mut("sync").and_then(Value::as_object_mut) {
        normalize_lag(sync)?;
    }

    serde_json::from_value(document).map_err(|e| ContractError::ConfigParse {
        message: format!("{format} config error: {e}"),
        source: Some(Box::new(e)),
    })
}

fn read_document(content: &str, format: ConfigFormat) -> Result<Value, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        }),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("JSON parse error: {e}"),
            source: Some(Box::new(e)),
        }),
    }
}

fn check_sections(sections: &Map<String, Value>) -> Result<(), ContractError> {
    match sections.keys().find(|key| !SECTIONS.contains(&key.as_str())) {
        Some(unknown) => Err(ContractError::config_parse(format!(
            "unknown section '{unknown}', expected one of: {}",
            SECTIONS.join(", ")
        ))),
        None => Ok(()),
    }
}

/// Replace `sync.secondary_lag` by `sync.secondary_lag_s`
fn normalize_lag(sync: &mut Map<String, Value>) -> Result<(), ContractError> {
    let Some(lag) = sync.remove(LAG_WITH_UNIT) else {
        return Ok(());
    };
    if sync.contains_key(LAG_SECONDS) {
        return Err(ContractError::config_parse(format!(
            "sync.{LAG_WITH_UNIT} and sync.{LAG_SECONDS} are both set"
        )));
    }
    let text = match lag {
        Value::String(text) => text,
        other => {
            return Err(ContractError::config_parse(format!(
                "sync.{LAG_WITH_UNIT} must carry a unit, e.g. \"10 s\", got {other}"
            )))
        }
    };
    sync.insert(LAG_SECONDS.to_string(), Value::from(seconds_from(&text)?));
    Ok(())
}

/// `"<number><unit>"`, unit one of the stream time units
fn seconds_from(text: &str) -> Result<f64, ContractError> {
    let text = text.trim();
    let number = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let symbol = &text[number.len()..];
    if symbol.is_empty() {
        return Err(ContractError::config_parse(format!(
            "sync.{LAG_WITH_UNIT} = \"{text}\" has no unit"
        )));
    }

    let value: f64 = number.trim().parse().map_err(|_| {
        ContractError::config_parse(format!("sync.{LAG_WITH_UNIT} = \"{text}\" is not a number"))
    })?;
    let unit: TimeUnit = serde_json::from_value(Value::String(symbol.to_string())).map_err(|_| {
        ContractError::config_parse(format!(
            "sync.{LAG_WITH_UNIT}: unknown time unit '{symbol}', expected s, ms or us"
        ))
    })?;
    Ok(value / unit.per_second())
}
