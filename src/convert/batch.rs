//! Batch conversion with per-item failure isolation
//!
//! Fans a list of conversion requests out over `FileConverter`, recording a
//! result per item. A failing item never aborts or skips the remaining
//! items; this is the only place conversion errors are contained instead of
//! propagated.

use crate::convert::single::FileConverter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// One requested conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Source file location
    pub input_path: PathBuf,

    /// Requested output format as an extension string
    pub output_format: String,

    /// Output directory (defaults to the converter's fixed default)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Outcome of one conversion in a batch
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub input: PathBuf,

    /// Produced artifact; absent on failure and on the empty-input no-op
    pub output: Option<PathBuf>,

    pub success: bool,

    pub error: Option<String>,
}

/// Convert every request independently.
///
/// The returned vector has the same length and order as `requests`.
pub fn convert_all(requests: &[ConversionRequest]) -> Vec<ConversionResult> {
    requests
        .iter()
        .map(|req| {
            let converter = FileConverter::new(
                req.input_path.clone(),
                req.output_format.clone(),
                req.output_dir.clone(),
            );
            match converter.convert() {
                Ok(output) => ConversionResult {
                    input: req.input_path.clone(),
                    output,
                    success: true,
                    error: None,
                },
                Err(e) => {
                    warn!(input = %req.input_path.display(), error = %e, "Conversion failed");
                    ConversionResult {
                        input: req.input_path.clone(),
                        output: None,
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}
