//! Primary (biosignal) recording loader.
//!
//! Two JSON layouts are accepted:
//! - stream layout: `{"time": [...], "trigger": [...], "channels": [[...]], "sample_rate": 512}`
//! - matrix layout: `{"y": [[time...], [ch1...], ..., [trigger...]], "sample_rate": 512}`,
//!   the amplifier's export where row 0 is time and the last row is the trigger.
//!
//! Multi-part recordings are concatenated in time order.

use std::fs;
use std::path::Path;

use contracts::{mean_interval, PrimaryStream};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{IngestionError, Result};
use crate::session::SessionName;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordingFile {
    Streams(PrimaryStream),
    Matrix {
        y: Vec<Vec<f64>>,
        #[serde(alias = "sr")]
        sample_rate: f64,
    },
}

/// Load one recording file
pub fn load_primary_file(path: &Path) -> Result<PrimaryStream> {
    let content = fs::read_to_string(path).map_err(|e| IngestionError::io(path, e))?;
    let file: RecordingFile =
        serde_json::from_str(&content).map_err(|source| IngestionError::Recording {
            path: path.to_path_buf(),
            source,
        })?;

    match file {
        RecordingFile::Streams(stream) => Ok(stream),
        RecordingFile::Matrix { mut y, sample_rate } => {
            if y.len() < 2 {
                return Err(IngestionError::shape(
                    path,
                    format!("matrix needs time and trigger rows, got {} row(s)", y.len()),
                ));
            }
            let trigger = y.pop().unwrap_or_default();
            let time = y.remove(0);
            Ok(PrimaryStream {
                time,
                trigger,
                channels: y,
                sample_rate,
            })
        }
    }
}

/// Load a recording and every sibling part of it, concatenated and validated
pub fn load_primary(path: &Path) -> Result<PrimaryStream> {
    let name = SessionName::from_path(path)?;
    let parts = name.discover_parts(path)?;

    let mut combined: Option<PrimaryStream> = None;
    for part in &parts {
        info!(file = %part.display(), "importing recording part");
        let stream = load_primary_file(part)?;
        combined = Some(match combined {
            None => stream,
            Some(acc) => append_part(acc, stream, part)?,
        });
    }

    let stream = combined.ok_or_else(|| IngestionError::shape(path, "no recording parts found"))?;
    stream.validate()?;
    Ok(stream)
}

/// Append `next` after `acc`, shifting its time axis to start one interval after
/// the last accumulated sample.
pub fn append_part(mut acc: PrimaryStream, next: PrimaryStream, path: &Path) -> Result<PrimaryStream> {
    if acc.channels.len() != next.channels.len() {
        return Err(IngestionError::shape(
            path,
            format!(
                "part has {} channels, previous parts have {}",
                next.channels.len(),
                acc.channels.len()
            ),
        ));
    }
    if next.sample_rate != acc.sample_rate {
        warn!(
            file = %path.display(),
            expected = acc.sample_rate,
            found = next.sample_rate,
            "recording part reports a different sample rate, keeping the first"
        );
    }

    let shift = match acc.time.last() {
        Some(&last) => last + mean_interval(&acc.time).unwrap_or(1.0 / acc.sample_rate),
        None => 0.0,
    };

    acc.time.extend(next.time.iter().map(|t| t + shift));
    acc.trigger.extend(next.trigger);
    for (dst, src) in acc.channels.iter_mut().zip(next.channels) {
        dst.extend(src);
    }
    Ok(acc)
}
