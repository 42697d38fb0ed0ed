//! Configuration types for tabkit
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Validated service configuration with explicit base directories
//!
//! Directories are always threaded explicitly through constructors; nothing
//! in the library reads a process-wide default.

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Subdirectory names under the service data root
const OUTPUT_SUBDIR: &str = "data";
const TABLES_SUBDIR: &str = "tables";
const UPLOADS_SUBDIR: &str = "uploads";

/// Tabular file conversion and ad-hoc SQL query service
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tabkit",
    version,
    about = "Convert tabular files between CSV and Parquet, and query them with SQL",
    after_help = "EXAMPLES:\n    \
        tabkit convert data/events.csv --to parquet\n    \
        tabkit convert report.parquet --to csv --output-dir /tmp/out\n    \
        tabkit batch conversions.json\n    \
        tabkit serve --data-dir ./service-data --port 8080"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (debug-level logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a single tabular file to another format
    Convert {
        /// Input file (.csv or .parquet)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output format extension (csv, parquet)
        #[arg(long = "to", value_name = "FORMAT")]
        to: String,

        /// Output directory (default: ./data)
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Run a batch of conversions from a JSON manifest
    Batch {
        /// Manifest file: a JSON array of
        /// {"input_path", "output_format", "output_dir"?} objects
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },

    /// Start the HTTP conversion/query server
    Serve {
        /// Root directory for outputs, tables, and uploads
        #[arg(long, default_value = ".", value_name = "DIR")]
        data_dir: PathBuf,

        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },
}

/// Validated directory layout for the service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Where converted artifacts land
    pub output_dir: PathBuf,

    /// Where named tables are persisted
    pub tables_dir: PathBuf,

    /// Scratch directory for multipart uploads
    pub uploads_dir: PathBuf,
}

impl ServiceConfig {
    /// Lay the standard subdirectories out under `root`.
    pub fn under(root: &std::path::Path) -> Self {
        Self {
            output_dir: root.join(OUTPUT_SUBDIR),
            tables_dir: root.join(TABLES_SUBDIR),
            uploads_dir: root.join(UPLOADS_SUBDIR),
        }
    }

    /// Validate the root and create the subdirectories.
    pub fn prepare(root: &std::path::Path) -> Result<Self, ConfigError> {
        if root.exists() && !root.is_dir() {
            return Err(ConfigError::InvalidDataDir {
                path: root.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let config = Self::under(root);
        for dir in [&config.output_dir, &config.tables_dir, &config.uploads_dir] {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::InvalidDataDir {
                path: dir.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(config)
    }
}
