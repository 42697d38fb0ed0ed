//! Single-file conversion
//!
//! Validates the (input format, output format) pair, reads the source
//! through the matching codec, and writes it back out through the target
//! codec. Validation order is fixed: input format, output format, identity.

use crate::error::{ConvertError, ConvertResult};
use crate::formats::{read_table, Format, TableWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output directory when the caller does not choose one
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Converts one file from its own format to a requested output format
#[derive(Debug, Clone)]
pub struct FileConverter {
    input: PathBuf,
    output_extension: String,
    output_dir: PathBuf,
}

impl FileConverter {
    /// `output_extension` is the requested target format as an extension
    /// string ("csv", "parquet", with or without a leading dot).
    pub fn new(
        input: impl Into<PathBuf>,
        output_extension: impl Into<String>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output_extension: output_extension.into(),
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }

    /// Run the conversion.
    ///
    /// Returns the produced artifact path, or `None` when the input holds
    /// no rows (the writer's no-op policy). Format validation happens
    /// before any read occurs.
    pub fn convert(&self) -> ConvertResult<Option<PathBuf>> {
        let (input_format, output_format) = self.validate()?;

        let table = read_table(input_format, &self.input)?;

        let base = base_name(&self.input);
        let writer = TableWriter::new(output_format, self.output_dir.clone(), base);
        let output = writer.write_table(&table)?;

        if let Some(ref path) = output {
            info!(
                input = %self.input.display(),
                output = %path.display(),
                "Conversion complete"
            );
        }
        Ok(output)
    }

    /// Validate formats eagerly. Check order matters for deterministic
    /// error messages: input first, then output, then identity.
    fn validate(&self) -> ConvertResult<(Format, Format)> {
        let input_format = Format::from_path(&self.input)?;
        let output_format = Format::from_extension(&self.output_extension)?;
        if input_format == output_format {
            return Err(ConvertError::IdenticalFormat {
                format: input_format.extension().to_string(),
            });
        }
        Ok((input_format, output_format))
    }
}

/// Base name for output artifacts, derived from the input's stem
fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}
