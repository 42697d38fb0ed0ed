//! In-memory tabular value
//!
//! A `Table` is an ordered set of named columns with a consistent row count,
//! held as Arrow record batches. Every codec read produces one and every
//! codec write consumes one. Conversion to and from JSON row objects goes
//! through Arrow's JSON codec so type inference stays in one place.

use crate::error::{ConvertError, ConvertResult};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::json::reader::infer_json_schema_from_iterator;
use arrow::json::{LineDelimitedWriter, ReaderBuilder};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// A JSON row object (one record, field name -> scalar value)
pub type Row = serde_json::Value;

/// In-memory table: schema plus zero or more record batches
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    /// Wrap existing batches. All batches must share `schema`.
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    /// Materialize a table from JSON row objects.
    ///
    /// The schema is inferred from the rows; heterogeneous rows surface as
    /// an Arrow error rather than being silently widened.
    pub fn from_rows(rows: &[Row]) -> ConvertResult<Self> {
        if rows.is_empty() {
            return Ok(Self {
                schema: Arc::new(Schema::empty()),
                batches: Vec::new(),
            });
        }

        let inferred = infer_json_schema_from_iterator(rows.iter().cloned().map(Ok)).map_err(
            |e| ConvertError::InvalidInput(format!("Cannot infer schema from rows: {e}")),
        )?;
        let schema = Arc::new(order_fields_like_first_row(inferred, rows));

        let mut decoder = ReaderBuilder::new(schema.clone())
            .build_decoder()
            .map_err(|e| ConvertError::InvalidInput(format!("Cannot decode rows: {e}")))?;
        decoder
            .serialize(rows)
            .map_err(|e| ConvertError::InvalidInput(format!("Cannot decode rows: {e}")))?;

        let batches = decoder
            .flush()
            .map_err(|e| ConvertError::InvalidInput(format!("Cannot decode rows: {e}")))?
            .into_iter()
            .collect();

        Ok(Self { schema, batches })
    }

    /// Serialize the table back to JSON row objects.
    pub fn to_rows(&self) -> ConvertResult<Vec<Row>> {
        let mut buf = Vec::new();
        {
            let mut writer = LineDelimitedWriter::new(&mut buf);
            for batch in &self.batches {
                writer.write(batch).map_err(|e| {
                    ConvertError::InvalidInput(format!("Cannot encode rows: {e}"))
                })?;
            }
            writer.finish().map_err(|e| {
                ConvertError::InvalidInput(format!("Cannot encode rows: {e}"))
            })?;
        }

        let output = String::from_utf8_lossy(&buf);
        output
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    ConvertError::InvalidInput(format!("Cannot encode rows: {e}"))
                })
            })
            .collect()
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    /// Total row count across all batches
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }
}

/// Schema inference does not promise a field order; pin columns to the key
/// order of the first row so written files keep the caller's field order.
fn order_fields_like_first_row(inferred: Schema, rows: &[Row]) -> Schema {
    let first = match rows.first().and_then(|r| r.as_object()) {
        Some(obj) => obj,
        None => return inferred,
    };
    let positions: Vec<&String> = first.keys().collect();

    let mut fields: Vec<_> = inferred.fields().iter().cloned().collect();
    fields.sort_by_key(|f| {
        positions
            .iter()
            .position(|k| *k == f.name())
            .unwrap_or(usize::MAX)
    });
    Schema::new(fields)
}
