//! # Ingestion
//!
//! Loaders for one recording session.
//!
//! Responsibilities:
//! - Derive the session name and discover multi-part recordings
//! - Load and concatenate the primary (biosignal) recording
//! - Load the eye tracker event log (JSON lines)
//! - Parse the session descriptor CSV into a metadata tree
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{load_session, SessionPaths};
//!
//! let input = load_session(&SessionPaths {
//!     primary: "data/20170412_eeg_1.json".into(),
//!     secondary: Some("data/20170412_tobii.jsonl".into()),
//!     descriptor: "data/20170412_meta.csv".into(),
//! })?;
//! ```

mod descriptor;
mod error;
mod events;
mod primary;
mod session;

use std::path::PathBuf;

use contracts::{ConversionInput, Diagnostic};
use tracing::info;

pub use descriptor::{load_descriptor, read_descriptor, Descriptor, SESSION_SECTION_TYPE};
pub use error::{IngestionError, Result};
pub use events::{load_event_log, load_optional_event_log, read_event_log};
pub use primary::{append_part, load_primary, load_primary_file};
pub use session::SessionName;

/// Input files of one session
#[derive(Debug, Clone)]
pub struct SessionPaths {
    /// First part of the primary recording
    pub primary: PathBuf,
    /// Eye tracker event log, if recorded
    pub secondary: Option<PathBuf>,
    /// Session descriptor CSV
    pub descriptor: PathBuf,
}

/// Loaded session plus descriptor diagnostics
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub input: ConversionInput,
    pub diagnostics: Vec<Diagnostic>,
}

/// Load every input of a session
pub fn load_session(paths: &SessionPaths) -> Result<LoadedSession> {
    let name = SessionName::from_path(&paths.primary)?;
    info!(session = %name.session, "loading session");

    let primary = load_primary(&paths.primary)?;
    let secondary = load_optional_event_log(paths.secondary.as_deref())?;
    let descriptor = load_descriptor(&paths.descriptor, &name.session)?;

    Ok(LoadedSession {
        input: ConversionInput {
            session: name.session,
            primary,
            secondary,
            descriptor: descriptor.root,
        },
        diagnostics: descriptor.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_session() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("20170412_eeg_1.json");
        fs::write(
            &primary,
            r#"{"time":[0,0.5,1],"trigger":[0,2,0],"channels":[[1,2,3]],"sample_rate":2}"#,
        )
        .unwrap();
        let descriptor = dir.path().join("meta.csv");
        fs::write(&descriptor, "Subject\n,name,S01\n").unwrap();

        let loaded = load_session(&SessionPaths {
            primary,
            secondary: None,
            descriptor,
        })
        .unwrap();
        assert_eq!(loaded.input.session, "20170412");
        assert_eq!(loaded.input.descriptor.name, "20170412");
        assert!(loaded.input.secondary.is_none());
        assert!(loaded.diagnostics.is_empty());
    }
}
