//! tabkit - Tabular File Conversion and Query Service
//!
//! Converts tabular files between CSV and Parquet, persists named tables,
//! and runs ad-hoc SQL over stored or converted files through an HTTP API.
//!
//! # Features
//!
//! - **Format Conversion**: CSV <-> Parquet through Arrow, with eager
//!   format validation and timestamped output naming.
//!
//! - **Batch Conversion**: fan-out over many files with per-item
//!   success/failure isolation; one bad file never aborts the rest.
//!
//! - **Named Tables**: persist row sets as Parquet under `tables/` and
//!   query them later by name.
//!
//! - **SQL Queries**: DataFusion executes `SELECT`-style SQL directly
//!   against CSV/Parquet files; results come back as JSON rows.
//!
//! # Architecture
//!
//! ```text
//!  HTTP (axum)          CLI (clap)
//!       │                   │
//!       ▼                   ▼
//!  ┌───────────────────────────────┐
//!  │  FileConverter / BatchConvert │──► data/{base}_{ts}.{ext}
//!  ├───────────────────────────────┤
//!  │  TableStore                   │──► tables/{name}.parquet
//!  ├───────────────────────────────┤
//!  │  Codecs (arrow csv/parquet)   │
//!  └───────────────────────────────┘
//!                  │
//!                  ▼
//!        DataFusion SessionContext ──► JSON rows
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod naming;
pub mod server;
pub mod store;

pub use config::{CliArgs, Command, ServiceConfig};
pub use convert::{convert_all, ConversionRequest, ConversionResult, FileConverter};
pub use error::{ConvertError, Result, ServerError, StoreError, TabkitError};
pub use formats::{Format, Row, Table, TableWriter};
pub use store::{TableStore, WriteMode};
