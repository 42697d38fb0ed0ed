//! Tabular formats and codecs
//!
//! One reader/writer pair per supported format behind a closed `Format`
//! tag. Adding a format means adding a variant plus a read and a write
//! function, not a new type hierarchy.
//!
//! # Module Structure
//!
//! - `table`: in-memory tabular value (Arrow batches + JSON row bridge)
//! - `csv`: CSV codec (arrow-csv, header row, inferred types)
//! - `parquet`: Parquet codec (ZSTD, chunk statistics)

pub mod csv;
pub mod parquet;
pub mod table;

pub use table::{Row, Table};

use crate::error::{ConvertError, ConvertResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Supported tabular formats, identified by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Parquet,
}

impl Format {
    /// Resolve a format from a file extension (without the dot,
    /// case-insensitive). Unknown extensions are an error, never a default.
    pub fn from_extension(extension: &str) -> ConvertResult<Self> {
        let ext = extension.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(ConvertError::InvalidInput(
                "Format extension cannot be empty".to_string(),
            ));
        }
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "parquet" => Ok(Format::Parquet),
            _ => Err(ConvertError::UnsupportedFormat {
                extension: ext.to_string(),
            }),
        }
    }

    /// Resolve a format from a path's extension
    pub fn from_path(path: &Path) -> ConvertResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConvertError::UnsupportedFormat {
                extension: path.display().to_string(),
            })?;
        Self::from_extension(ext)
    }

    /// Canonical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Parquet => "parquet",
        }
    }
}

/// Read a file in the given format into an in-memory table.
///
/// Fails with `InvalidInput` for an empty location, `NotFound` if the file
/// does not exist, and `Read` wrapping the codec cause otherwise.
pub fn read_table(format: Format, path: &Path) -> ConvertResult<Table> {
    if path.as_os_str().is_empty() {
        return Err(ConvertError::InvalidInput(
            "Input path cannot be empty".to_string(),
        ));
    }
    if !path.exists() {
        return Err(ConvertError::NotFound {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), format = format.extension(), "Reading table");
    let table = match format {
        Format::Csv => csv::read(path),
        Format::Parquet => parquet::read(path),
    }
    .map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    info!(rows = table.num_rows(), "Read complete");
    Ok(table)
}

/// Format-specific writer bound to an output directory and base name.
///
/// Produces artifacts named `{base}_{timestamp}.{ext}` (see `naming`).
#[derive(Debug, Clone)]
pub struct TableWriter {
    format: Format,
    directory: PathBuf,
    base: String,
}

impl TableWriter {
    pub fn new(format: Format, directory: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            format,
            directory: directory.into(),
            base: base.into(),
        }
    }

    /// Write JSON rows as a new artifact.
    ///
    /// `None` rows are rejected with `InvalidInput`. An empty row slice is
    /// a deliberate no-op: nothing is written and `Ok(None)` is returned.
    pub fn write(&self, rows: Option<&[Row]>) -> ConvertResult<Option<PathBuf>> {
        let rows = rows.ok_or_else(|| {
            ConvertError::InvalidInput("Data cannot be null".to_string())
        })?;
        if rows.is_empty() {
            warn!(base = %self.base, "Empty data provided; no file will be created");
            return Ok(None);
        }
        let table = Table::from_rows(rows)?;
        self.write_table(&table)
    }

    /// Write an already-materialized table as a new artifact.
    ///
    /// Shares the empty-input no-op policy with [`TableWriter::write`].
    pub fn write_table(&self, table: &Table) -> ConvertResult<Option<PathBuf>> {
        if table.is_empty() {
            warn!(base = %self.base, "Empty table; no file will be created");
            return Ok(None);
        }

        // Idempotent; no error when the directory already exists
        fs::create_dir_all(&self.directory).map_err(|source| ConvertError::Write {
            path: self.directory.clone(),
            source: source.into(),
        })?;

        let path = crate::naming::unique_output_path(
            &self.directory,
            &self.base,
            self.format.extension(),
        );

        let result = match self.format {
            Format::Csv => csv::write(&path, table),
            Format::Parquet => parquet::write(&path, table),
        };
        // No cleanup of a half-written file; callers decide whether to retry
        result.map_err(|source| ConvertError::Write {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), rows = table.num_rows(), "Wrote table");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("csv").unwrap(), Format::Csv);
        assert_eq!(Format::from_extension(".CSV").unwrap(), Format::Csv);
        assert_eq!(Format::from_extension("parquet").unwrap(), Format::Parquet);

        let err = Format::from_extension("xlsx").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat { .. }));

        let err = Format::from_extension("").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInput(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            Format::from_path(Path::new("/tmp/data.parquet")).unwrap(),
            Format::Parquet
        );
        assert!(Format::from_path(Path::new("/tmp/noext")).is_err());
    }

    #[test]
    fn test_empty_extension_message_is_side_neutral() {
        // A trailing dot yields an empty extension; the message must not
        // claim the output side when the path came from the input side
        let err = Format::from_path(Path::new("/tmp/data.")).unwrap_err();
        match err {
            ConvertError::InvalidInput(msg) => assert!(msg.contains("Format extension")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_table(Format::Csv, Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, ConvertError::NotFound { .. }));
    }

    #[test]
    fn test_read_empty_path() {
        let err = read_table(Format::Csv, Path::new("")).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInput(_)));
    }

    #[test]
    fn test_write_null_rows_rejected() {
        let dir = tempdir().unwrap();
        let writer = TableWriter::new(Format::Parquet, dir.path(), "out");
        let err = writer.write(None).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInput(_)));
    }

    #[test]
    fn test_write_empty_rows_noop() {
        let dir = tempdir().unwrap();
        let writer = TableWriter::new(Format::Parquet, dir.path(), "out");
        assert!(writer.write(Some(&[])).unwrap().is_none());
        // No artifacts created
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = TableWriter::new(Format::Csv, &nested, "out");

        let rows = vec![json!({"x": 1})];
        let path = writer.write(Some(&rows)).unwrap().unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn test_write_read_round_trip_both_formats() {
        let dir = tempdir().unwrap();
        let rows = vec![
            json!({"name": "Alice", "age": 30}),
            json!({"name": "Bob", "age": 25}),
        ];

        for format in [Format::Csv, Format::Parquet] {
            let writer = TableWriter::new(format, dir.path(), "people");
            let path = writer.write(Some(&rows)).unwrap().unwrap();

            let table = read_table(format, &path).unwrap();
            assert_eq!(table.to_rows().unwrap(), rows);
        }
    }
}
