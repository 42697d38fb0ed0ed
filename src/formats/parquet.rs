//! Parquet codec
//!
//! Writes with ZSTD compression and chunk-level column statistics so the
//! files stay cheap to query with DataFusion predicate pushdown.

use crate::error::CodecError;
use crate::formats::table::Table;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::fs::File;
use std::path::Path;

/// ZSTD compression level for written files
const COMPRESSION_LEVEL: i32 = 3;

pub(crate) fn read(path: &Path) -> Result<Table, CodecError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(Table::new(schema, batches))
}

pub(crate) fn write(path: &Path, table: &Table) -> Result<(), CodecError> {
    let props = writer_properties()?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, table.schema(), Some(props))?;
    for batch in table.batches() {
        writer.write(batch)?;
    }
    writer.close()?;
    Ok(())
}

fn writer_properties() -> Result<WriterProperties, CodecError> {
    let zstd_level = ZstdLevel::try_new(COMPRESSION_LEVEL)?;
    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(zstd_level))
        .set_statistics_enabled(EnabledStatistics::Chunk)
        .build())
}
