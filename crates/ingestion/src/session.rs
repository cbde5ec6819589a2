//! Session naming and recording part discovery.
//!
//! A recording file is named `<session>_<more>_<part>.<ext>`. The trailing `_<part>`
//! is a number that varies between files of one multi-part recording; the first
//! `_`-separated token names the session.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IngestionError, Result};

/// Naming information derived from one recording file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionName {
    /// Session name (first `_` token), used as container name
    pub session: String,
    /// Stem without the trailing part token, shared by all parts
    pub pattern: String,
    /// Extension of the recording file
    pub extension: Option<String>,
}

impl SessionName {
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IngestionError::SessionName(path.to_path_buf()))?;

        let parts: Vec<&str> = stem.split('_').collect();
        let session = parts[0].to_string();
        let pattern = if parts.len() > 1 {
            parts[..parts.len() - 1].join("_")
        } else {
            stem.to_string()
        };

        Ok(Self {
            session,
            pattern,
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string),
        })
    }

    /// All sibling files belonging to the same recording, in part order
    ///
    /// Siblings must be named `<pattern>_<n>.<ext>` with a numeric `n`. Always
    /// contains `path` itself; a `path` without a part number is a recording
    /// of its own.
    pub fn discover_parts(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if self.part_number(path).is_none() {
            return Ok(vec![path.to_path_buf()]);
        }
        let folder = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let entries = fs::read_dir(&folder).map_err(|e| IngestionError::io(&folder, e))?;
        let mut parts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IngestionError::io(&folder, e))?;
            let candidate = entry.path();
            if !candidate.is_file() {
                continue;
            }
            if let Some(number) = self.part_number(&candidate) {
                parts.push((number, candidate));
            }
        }

        if parts.is_empty() {
            return Ok(vec![path.to_path_buf()]);
        }
        parts.sort();
        Ok(parts.into_iter().map(|(_, part)| part).collect())
    }

    /// `n` of a file named `<pattern>_<n>.<ext>`
    fn part_number(&self, candidate: &Path) -> Option<u64> {
        let ext = candidate.extension().and_then(|e| e.to_str());
        if ext != self.extension.as_deref() {
            return None;
        }
        let digits = candidate
            .file_stem()
            .and_then(|s| s.to_str())?
            .strip_prefix(self.pattern.as_str())?
            .strip_prefix('_')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_name_from_multi_token_stem() {
        let name = SessionName::from_path(Path::new("/data/20170412_subject3_eeg_1.json")).unwrap();
        assert_eq!(name.session, "20170412");
        assert_eq!(name.pattern, "20170412_subject3_eeg");
        assert_eq!(name.extension.as_deref(), Some("json"));
    }

    #[test]
    fn test_name_from_single_token_stem() {
        let name = SessionName::from_path(Path::new("recording.json")).unwrap();
        assert_eq!(name.session, "recording");
        assert_eq!(name.pattern, "recording");
    }

    #[test]
    fn test_discover_parts_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["s1_eeg_2.json", "s1_eeg_1.json", "s1_eeg_1.txt", "s2_eeg_1.json"] {
            File::create(dir.path().join(file)).unwrap();
        }
        let first = dir.path().join("s1_eeg_1.json");
        let name = SessionName::from_path(&first).unwrap();
        let parts = name.discover_parts(&first).unwrap();
        let names: Vec<_> = parts
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["s1_eeg_1.json", "s1_eeg_2.json"]);
    }

    fn part_names(dir: &Path, first: &str) -> Vec<String> {
        let first = dir.join(first);
        let name = SessionName::from_path(&first).unwrap();
        name.discover_parts(&first)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_discover_parts_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for part in 1..=11 {
            File::create(dir.path().join(format!("s1_{part}.json"))).unwrap();
        }
        let expected: Vec<String> = (1..=11).map(|part| format!("s1_{part}.json")).collect();
        assert_eq!(part_names(dir.path(), "s1_1.json"), expected);
    }

    #[test]
    fn test_discover_parts_skips_container_and_lookalikes() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["s1_1.json", "s1_2.json", "s1.json", "s1_2b.json", "s10_1.json", "s1_eeg_1.json"] {
            File::create(dir.path().join(file)).unwrap();
        }
        assert_eq!(part_names(dir.path(), "s1_1.json"), vec!["s1_1.json", "s1_2.json"]);
    }

    #[test]
    fn test_unnumbered_recording_stands_alone() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["s1_eeg_final.json", "s1_eeg_1.json"] {
            File::create(dir.path().join(file)).unwrap();
        }
        assert_eq!(
            part_names(dir.path(), "s1_eeg_final.json"),
            vec!["s1_eeg_final.json"]
        );
    }
}
