//! Session descriptor loader.
//!
//! The descriptor is a CSV file whose indentation is expressed by leading empty
//! cells. The column of the first non-empty cell is the row's depth:
//!
//! ```text
//! Subject
//! ,name,S01
//! ,Handedness
//! ,,writing,right
//! Setup,
//! ```
//!
//! A row with a cell after its first non-empty cell is a property (key, value);
//! otherwise it opens a section whose children sit one column further right. Rows
//! deeper than the currently open section are skipped.

use std::fs::File;
use std::io::Read;
use std::iter::Peekable;
use std::path::Path;

use contracts::{Component, Condition, Diagnostic, MetadataNode};
use tracing::{info, warn};

use crate::error::{IngestionError, Result};

/// Section type of the descriptor root
pub const SESSION_SECTION_TYPE: &str = "recording";

/// Parsed descriptor
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Root section named after the session
    pub root: MetadataNode,
    /// Rows that could not be placed in the tree
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Section(String),
    Property(String, String),
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    line: usize,
    depth: usize,
    entry: Entry,
}

/// Load a descriptor file
pub fn load_descriptor(path: &Path, session: &str) -> Result<Descriptor> {
    info!(file = %path.display(), "writing session metadata from descriptor");
    let file = File::open(path).map_err(|e| IngestionError::io(path, e))?;
    read_descriptor(file, session)
}

/// Parse a descriptor from any reader
pub fn read_descriptor<R: Read>(reader: R, session: &str) -> Result<Descriptor> {
    let rows = read_rows(reader)?;
    let mut diagnostics = Vec::new();
    let mut root = MetadataNode::new(session, SESSION_SECTION_TYPE);

    let mut iter = rows.into_iter().peekable();
    fill_section(&mut root, 0, &mut iter, &mut diagnostics);

    Ok(Descriptor { root, diagnostics })
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let Some(depth) = record.iter().position(|cell| !cell.is_empty()) else {
            continue;
        };
        let key = record[depth].to_string();
        let entry = match record.get(depth + 1) {
            Some(value) => Entry::Property(key, value.to_string()),
            None => Entry::Section(key),
        };
        rows.push(Row {
            line: idx + 1,
            depth,
            entry,
        });
    }
    Ok(rows)
}

/// Consume all rows belonging to `section`, whose children live at `depth`
fn fill_section<I>(
    section: &mut MetadataNode,
    depth: usize,
    rows: &mut Peekable<I>,
    diagnostics: &mut Vec<Diagnostic>,
) where
    I: Iterator<Item = Row>,
{
    while let Some(row) = rows.peek() {
        if row.depth < depth {
            return;
        }
        let Some(row) = rows.next() else {
            return;
        };

        if row.depth > depth {
            warn!(
                line = row.line,
                depth = row.depth,
                section = %section.name,
                "descriptor row is nested deeper than its section, skipped"
            );
            diagnostics.push(
                Diagnostic::new(
                    Component::Descriptor,
                    Condition::MalformedDescriptorRow,
                    format!("line {}", row.line),
                )
                .with_detail(format!(
                    "depth {} below section '{}' at depth {}",
                    row.depth, section.name, depth
                )),
            );
            continue;
        }

        match row.entry {
            Entry::Property(key, value) => section.set(key, value),
            Entry::Section(name) => {
                let mut child = MetadataNode::new(name.clone(), name);
                fill_section(&mut child, depth + 1, rows, diagnostics);
                section.children.push(child);
            }
        }
    }
}
