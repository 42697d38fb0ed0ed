//! HTTP conversion/query server.
//!
//! Provides a REST API for file conversion, table persistence, and
//! DataFusion-backed SQL queries over CSV/Parquet files.

pub mod context;
pub mod routes;

pub use context::{query_file, query_table, QueryOutcome};
pub use routes::{build_router, serve, AppState};
