#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use cq_frame::{RawRow, TypedRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Header row plus header-keyed records, before any typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

pub fn read_csv_str(input: &str) -> Result<RawTable, IoError> {
    read_csv_reader(input.as_bytes())
}

pub fn read_csv_path(path: impl AsRef<Path>) -> Result<RawTable, IoError> {
    read_csv_reader(File::open(path)?)
}

/// Read a CSV whose first record is the header row. Records may be ragged:
/// a short record leaves its trailing headers absent, and cells beyond the
/// header count are dropped. Input with no header row yields an empty table.
pub fn read_csv_reader<R: Read>(source: R) -> Result<RawTable, IoError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if headers.is_empty() {
        return Ok(RawTable::default());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| (header.clone(), field.to_owned()))
            .collect::<RawRow>();
        rows.push(row);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(columns = headers.len(), rows = rows.len(), "read csv");

    Ok(RawTable { headers, rows })
}

/// Write `headers`, then one record per row with cells in header order.
/// Null cells are written empty. Returns the number of data rows written.
pub fn write_csv<'a, W: Write>(
    sink: W,
    headers: &[String],
    rows: impl IntoIterator<Item = &'a TypedRow>,
) -> Result<usize, IoError> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    writer.write_record(headers)?;

    let mut written = 0_usize;
    for row in rows {
        writer.write_record(headers.iter().map(|name| row.get(name).to_string()))?;
        written += 1;
    }
    writer.flush()?;

    #[cfg(feature = "tracing")]
    tracing::info!(rows = written, "exported csv");

    Ok(written)
}

pub fn write_csv_string<'a>(
    headers: &[String],
    rows: impl IntoIterator<Item = &'a TypedRow>,
) -> Result<String, IoError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, headers, rows)?;
    Ok(String::from_utf8(buffer)?)
}
