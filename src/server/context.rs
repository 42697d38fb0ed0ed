//! DataFusion execution for ad-hoc SQL queries
//!
//! The core never interprets SQL itself: it resolves a file location and
//! format, registers it with a DataFusion session, and hands the statement
//! over. Ad-hoc file queries see the file as a table named `self` (queries
//! are written `SELECT * FROM self`); stored tables are registered under
//! their own names.

use crate::error::{ServerError, ServerResult};
use crate::formats::{Format, Table};
use crate::store::TableStore;
use arrow::datatypes::Schema;
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionContext};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Table name ad-hoc file queries are registered under
pub const SELF_TABLE: &str = "self";

/// Result of executing a SQL query
#[derive(Debug, serde::Serialize)]
pub struct QueryOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Value>,
    pub row_count: usize,
    pub execution_ms: u64,
}

/// Run `sql` against a single file registered as the `self` table.
pub async fn query_file(path: &Path, sql: &str) -> ServerResult<QueryOutcome> {
    let format = Format::from_path(path).map_err(ServerError::Convert)?;
    if !path.exists() {
        return Err(ServerError::Convert(crate::error::ConvertError::NotFound {
            path: path.to_path_buf(),
        }));
    }

    let ctx = SessionContext::new();
    register(&ctx, SELF_TABLE, format, path).await?;
    execute(&ctx, sql).await
}

/// Run `sql` against a stored table registered under its own name.
pub async fn query_table(store: &TableStore, name: &str, sql: &str) -> ServerResult<QueryOutcome> {
    let path = store.resolve(name).map_err(ServerError::Store)?;
    if !path.exists() {
        return Err(ServerError::TableNotFound(name.to_string()));
    }

    let ctx = SessionContext::new();
    register(&ctx, name, Format::Parquet, &path).await?;
    execute(&ctx, sql).await
}

async fn register(
    ctx: &SessionContext,
    table_name: &str,
    format: Format,
    path: &Path,
) -> ServerResult<()> {
    let location = path.to_string_lossy();
    match format {
        Format::Csv => {
            ctx.register_csv(table_name, location.as_ref(), CsvReadOptions::new())
                .await?
        }
        Format::Parquet => {
            ctx.register_parquet(table_name, location.as_ref(), ParquetReadOptions::default())
                .await?
        }
    }
    Ok(())
}

async fn execute(ctx: &SessionContext, sql: &str) -> ServerResult<QueryOutcome> {
    let start = Instant::now();
    let df = ctx.sql(sql).await?;
    let batches = df.collect().await?;
    let execution_ms = start.elapsed().as_millis() as u64;

    let schema = batches
        .first()
        .map(|b| b.schema())
        .unwrap_or_else(|| Arc::new(Schema::empty()));
    let columns = schema.fields().iter().map(|f| f.name().clone()).collect();

    // The JSON-rows bridge lives in Table; results reuse it unchanged
    let table = Table::new(schema, batches);
    let row_count = table.num_rows();
    let rows = table.to_rows().map_err(ServerError::Convert)?;

    info!(rows = row_count, execution_ms, "Query complete");
    Ok(QueryOutcome {
        columns,
        rows,
        row_count,
        execution_ms,
    })
}
