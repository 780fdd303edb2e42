//! Line codec for pool files: one record per line, fields joined by `:`.
//!
//! Field values are not escaped. Values containing the delimiter or a line
//! break are rejected before they reach a pool (see [`validate_field`]).

use crate::constants::ENTRY_DELIMITER;
use crate::core::error::{PoolError, PoolResult};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// An ordered sequence of string fields. Field 0 is the key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record(Vec<String>);

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Key field, or the empty string for an empty record.
    pub fn key(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[&str; N]> for Record {
    fn from(fields: [&str; N]) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}

/// A line skipped while parsing because its field count was wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the source file.
    pub line: usize,
    pub found: usize,
}

/// Result of parsing a pool file.
#[derive(Debug, Clone, Default)]
pub struct EntryFile {
    pub records: Vec<Record>,
    /// 1-based source line of each entry in `records`.
    pub lines: Vec<usize>,
    pub rejected: Vec<RejectedLine>,
}

pub fn encode(record: &Record) -> String {
    record.0.join(ENTRY_DELIMITER.to_string().as_str())
}

pub fn decode(line: &str) -> Record {
    Record(line.split(ENTRY_DELIMITER).map(str::to_string).collect())
}

/// Whether a value can be stored as one field without corrupting the line format.
pub fn validate_field(value: &str) -> bool {
    !value.contains(ENTRY_DELIMITER) && !value.contains(['\n', '\r'])
}

/// Parse every non-empty line of `path`, skipping lines that are not `width` fields wide.
///
/// A missing file is an empty store, not an error.
pub fn parse_entry_file(path: &Path, width: usize) -> PoolResult<EntryFile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(EntryFile::default()),
        Err(e) => return Err(PoolError::file_access(path, e)),
    };
    Ok(parse_entries(&content, width, path))
}

fn parse_entries(content: &str, width: usize, source: &Path) -> EntryFile {
    let mut parsed = EntryFile::default();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = decode(line);
        if record.len() != width {
            tracing::error!(
                path = %source.display(),
                line = i + 1,
                expected = width,
                found = record.len(),
                "invalid entry skipped"
            );
            parsed.rejected.push(RejectedLine {
                line: i + 1,
                found: record.len(),
            });
            continue;
        }
        parsed.records.push(record);
        parsed.lines.push(i + 1);
    }
    parsed
}
