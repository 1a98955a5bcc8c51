//! Tabular data import
//!
//! Lenient comma-separated parsing for clinician-supplied extracts: the first
//! line is the header, malformed data lines are skipped rather than fatal, and
//! only an input with zero usable rows is an error.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ImportError;

/// An ordered tabular data set
///
/// Rows preserve header order via `IndexMap`; every cell is a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    /// Column names in file order
    pub headers: Vec<String>,
    /// Data rows keyed by header
    pub rows: Vec<IndexMap<String, String>>,
}

impl DataTable {
    /// Number of data rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse comma-separated text into a [`DataTable`]
///
/// The first line is the header. A data line that is empty after trimming, or
/// whose field count differs from the header count, is skipped. Returns
/// [`ImportError::EmptyOrMalformed`] only when no usable data rows remain.
pub fn parse_delimited(text: &str) -> Result<DataTable, ImportError> {
    let mut lines = text.lines();
    let header_line = lines.next().unwrap_or("");
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        if line.trim().is_empty() {
            skipped += 1;
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != headers.len() {
            skipped += 1;
            continue;
        }
        let row: IndexMap<String, String> = headers
            .iter()
            .cloned()
            .zip(fields.iter().map(|f| f.trim().to_string()))
            .collect();
        rows.push(row);
    }

    if headers.iter().all(|h| h.is_empty()) || rows.is_empty() {
        return Err(ImportError::EmptyOrMalformed);
    }

    if skipped > 0 {
        warn!(skipped, kept = rows.len(), "skipped malformed rows during import");
    }
    debug!(columns = headers.len(), rows = rows.len(), "parsed tabular data");

    Ok(DataTable { headers, rows })
}

/// Read and parse a `.csv` file from disk
///
/// Rejects paths that do not end in `.csv` before touching the filesystem.
pub fn import_csv_file(path: impl AsRef<Path>) -> Result<DataTable, ImportError> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(ImportError::UnsupportedFileType(
            path.display().to_string(),
        ));
    }
    let text = std::fs::read_to_string(path)?;
    parse_delimited(&text)
}
