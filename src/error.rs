//! Error types for tabkit
//!
//! This module defines a structured error hierarchy covering:
//! - Conversion errors (format validation, codec read/write)
//! - Table store errors
//! - Server errors (query engine, request handling)
//! - Configuration and CLI errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Callers must be able to tell bad requests apart from internal failures
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the tabkit application
#[derive(Error, Debug)]
pub enum TabkitError {
    /// Conversion errors
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Table store errors
    #[error("Table store error: {0}")]
    Store(#[from] StoreError),

    /// Server errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Underlying codec failure wrapped by read/write errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Arrow error (CSV/JSON codecs, batch construction)
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encode/decode error
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Format conversion and codec errors
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A required argument was null or empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File extension is not a known format
    #[error("Unsupported file format: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Input and output formats are the same, nothing to convert
    #[error("Input and output formats are identical: '{format}'")]
    IdenticalFormat { format: String },

    /// Input file does not exist
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Underlying decode failure
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Underlying encode failure
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl ConvertError {
    /// Check if this error is a bad request (caller's fault) as opposed
    /// to an internal codec failure.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            ConvertError::InvalidInput(_)
                | ConvertError::UnsupportedFormat { .. }
                | ConvertError::IdenticalFormat { .. }
                | ConvertError::NotFound { .. }
        )
    }
}

/// Table store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Table name failed validation
    #[error("Invalid table name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Appended rows do not match the schema of the existing table
    #[error("Schema mismatch appending to table '{name}'")]
    SchemaMismatch { name: String },

    /// Conversion-layer failure (row materialization, codec I/O)
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory path problem
    #[error("Invalid data directory '{path}': {reason}")]
    InvalidDataDir { path: PathBuf, reason: String },

    /// Batch manifest problem
    #[error("Invalid batch manifest '{path}': {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// Bind address problem
    #[error("Invalid bind address '{addr}': {reason}")]
    InvalidBindAddress { addr: String, reason: String },
}

/// HTTP/query server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Conversion error surfaced through the API
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Table store error surfaced through the API
    #[error(transparent)]
    Store(#[from] StoreError),

    /// DataFusion query error
    #[error("Query error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Named table not present in the store
    #[error("Table not found: '{0}'")]
    TableNotFound(String),

    /// Invalid request parameter
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Multipart upload failure
    #[error("Upload error: {0}")]
    Upload(String),
}

impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::Json;

        let status = match &self {
            ServerError::Convert(e) | ServerError::Store(StoreError::Convert(e)) => match e {
                ConvertError::NotFound { .. } => StatusCode::NOT_FOUND,
                e if e.is_bad_request() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Store(StoreError::InvalidName { .. })
            | ServerError::Store(StoreError::SchemaMismatch { .. }) => StatusCode::BAD_REQUEST,
            ServerError::TableNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ServerError::Upload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for TabkitError
pub type Result<T> = std::result::Result<T, TabkitError>;

/// Result type alias for ConvertError
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Result type alias for StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for ServerError
pub type ServerResult<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_classification() {
        let unsupported = ConvertError::UnsupportedFormat {
            extension: "xlsx".into(),
        };
        assert!(unsupported.is_bad_request());

        let identical = ConvertError::IdenticalFormat {
            format: "csv".into(),
        };
        assert!(identical.is_bad_request());

        let read = ConvertError::Read {
            path: PathBuf::from("bad.csv"),
            source: CodecError::Io(std::io::Error::other("boom")),
        };
        assert!(!read.is_bad_request());
    }

    #[test]
    fn test_error_conversion() {
        let convert_err = ConvertError::NotFound {
            path: PathBuf::from("/missing.csv"),
        };
        let top: TabkitError = convert_err.into();
        assert!(matches!(top, TabkitError::Convert(_)));
    }
}
