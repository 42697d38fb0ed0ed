//! Persisted named tables
//!
//! Tables live as single Parquet files under a fixed directory, keyed by
//! name (`{tables_dir}/{name}.parquet`). Append mode reads the existing
//! file, concatenates, and rewrites the whole artifact; there is no native
//! incremental append.

use crate::error::{ConvertError, StoreError, StoreResult};
use crate::formats::{self, Format, Row, Table};
use arrow::compute::concat_batches;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Write mode for table saves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace the artifact entirely
    #[default]
    Overwrite,
    /// Concatenate rows onto the existing artifact before rewriting
    Append,
}

/// Maps table names to on-disk Parquet artifacts
#[derive(Debug, Clone)]
pub struct TableStore {
    tables_dir: PathBuf,
}

impl TableStore {
    pub fn new(tables_dir: impl Into<PathBuf>) -> Self {
        Self {
            tables_dir: tables_dir.into(),
        }
    }

    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    /// Derive the artifact path for a table name. Pure derivation; no
    /// existence check (readers validate existence themselves).
    pub fn resolve(&self, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.tables_dir.join(format!("{name}.parquet")))
    }

    /// Names of all persisted tables. A missing tables directory yields an
    /// empty set, not an error.
    pub fn list_names(&self) -> StoreResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        let entries = match fs::read_dir(&self.tables_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("parquet") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Persist rows under `name`, returning the artifact path.
    ///
    /// Shares the writer's row policy: `None` rows are rejected, an empty
    /// row slice is a logged no-op returning `Ok(None)`.
    pub fn save(
        &self,
        name: &str,
        rows: Option<&[Row]>,
        mode: WriteMode,
    ) -> StoreResult<Option<PathBuf>> {
        let path = self.resolve(name)?;
        let rows = rows.ok_or_else(|| {
            StoreError::Convert(ConvertError::InvalidInput(
                "Data cannot be null".to_string(),
            ))
        })?;
        if rows.is_empty() {
            warn!(table = name, "Empty data provided; table left unchanged");
            return Ok(None);
        }

        let incoming = Table::from_rows(rows).map_err(StoreError::Convert)?;

        let table = match mode {
            WriteMode::Overwrite => incoming,
            WriteMode::Append if !path.exists() => incoming,
            WriteMode::Append => {
                let existing = formats::read_table(Format::Parquet, &path)?;
                merge(name, existing, incoming)?
            }
        };

        fs::create_dir_all(&self.tables_dir)?;
        formats::parquet::write(&path, &table).map_err(|source| {
            StoreError::Convert(ConvertError::Write {
                path: path.clone(),
                source,
            })
        })?;

        info!(table = name, path = %path.display(), rows = table.num_rows(), "Table saved");
        Ok(Some(path))
    }
}

/// Concatenate two tables with identical schemas into one batch
fn merge(name: &str, existing: Table, incoming: Table) -> StoreResult<Table> {
    if existing.schema() != incoming.schema() {
        return Err(StoreError::SchemaMismatch {
            name: name.to_string(),
        });
    }

    let schema = existing.schema();
    let mut batches = existing.into_batches();
    batches.extend(incoming.into_batches());

    let combined = concat_batches(&schema, batches.iter()).map_err(|e| {
        StoreError::Convert(ConvertError::InvalidInput(format!(
            "Cannot concatenate rows: {e}"
        )))
    })?;
    Ok(Table::new(schema, vec![combined]))
}

/// Table names become file stems; keep them to a safe identifier set so
/// they are also usable as SQL table names.
fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: "name cannot start with a digit".to_string(),
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: "only alphanumerics and underscores are allowed".to_string(),
        });
    }
    Ok(())
}
