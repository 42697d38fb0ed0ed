//! CSV codec
//!
//! Reads CSV files with header rows and inferred column types, writes
//! tables back out with a header row. Built on arrow's CSV support so the
//! in-memory representation never leaves Arrow.

use crate::error::CodecError;
use crate::formats::table::Table;
use arrow::csv::reader::Format as CsvFormat;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::error::ArrowError;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Number of records sampled for schema inference (None = whole file)
const INFER_MAX_RECORDS: Option<usize> = Some(1000);

pub(crate) fn read(path: &Path) -> Result<Table, CodecError> {
    let format = CsvFormat::default().with_header(true);

    // First pass infers the schema, second pass decodes
    let mut probe = File::open(path)?;
    let (schema, _) = format.infer_schema(&mut probe, INFER_MAX_RECORDS)?;
    let schema = Arc::new(schema);

    let file = File::open(path)?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;

    Ok(Table::new(schema, batches))
}

pub(crate) fn write(path: &Path, table: &Table) -> Result<(), CodecError> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    for batch in table.batches() {
        writer.write(batch)?;
    }
    Ok(())
}
