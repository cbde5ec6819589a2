//! Eye tracker event log loader (JSON lines, one record per line).

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use contracts::EventRecord;
use tracing::{debug, info};

use crate::error::{IngestionError, Result};

/// Load an event log file
pub fn load_event_log(path: &Path) -> Result<Vec<EventRecord>> {
    let file = File::open(path).map_err(|e| IngestionError::io(path, e))?;
    let records = read_event_log(file, path)?;
    info!(file = %path.display(), records = records.len(), "event log loaded");
    Ok(records)
}

/// Load the event log if a path is given
pub fn load_optional_event_log(path: Option<&Path>) -> Result<Option<Vec<EventRecord>>> {
    path.map(load_event_log).transpose()
}

/// Parse JSON-lines records from a reader, skipping blank lines
///
/// `origin` is only used in error messages.
pub fn read_event_log<R: Read>(reader: R, origin: &Path) -> Result<Vec<EventRecord>> {
    let reader = BufReader::new(reader);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| IngestionError::io(origin, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: EventRecord =
            serde_json::from_str(trimmed).map_err(|source| IngestionError::EventRecord {
                path: origin.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        records.push(record);
    }

    debug!(records = records.len(), "parsed event records");
    Ok(records)
}
