#![forbid(unsafe_code)]

mod page;
mod row;
mod schema;
mod sort;

pub use page::{Page, paginate};
pub use row::{RawRow, TypedRow, coerce_row};
pub use schema::{DEFAULT_SAMPLE_ROWS, Schema, infer_column_type, infer_schema};
pub use sort::{SortDirection, SortKey, compare_values, sort_rows};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("CSV file is empty or invalid")]
    Empty,
    #[error("csv input has no headers")]
    MissingHeaders,
    #[error("Invalid CSV: Duplicate column name found: '{0}'")]
    DuplicateHeader(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid sort direction {0:?}; expected ASC or DESC")]
    InvalidSortDirection(String),
    #[error("page size must be greater than zero, got {0}")]
    InvalidPageSize(usize),
}

/// Schema plus typed rows for one upload. Replaced wholesale on re-upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<TypedRow>,
}

impl Dataset {
    /// Infer a schema from up to `sample_rows` non-null cells per column, then
    /// coerce every raw row under it.
    pub fn load(
        headers: &[String],
        raw_rows: &[RawRow],
        sample_rows: usize,
    ) -> Result<Self, LoadError> {
        if headers.is_empty() {
            // A source with no header row at all reads as an empty file.
            return Err(if raw_rows.is_empty() {
                LoadError::Empty
            } else {
                LoadError::MissingHeaders
            });
        }
        let schema = infer_schema(raw_rows, headers, sample_rows)?;
        if raw_rows.is_empty() {
            return Err(LoadError::Empty);
        }

        let rows = raw_rows
            .iter()
            .map(|row| coerce_row(row, &schema))
            .collect::<Vec<_>>();

        #[cfg(feature = "tracing")]
        tracing::info!(
            rows = rows.len(),
            columns = schema.len(),
            "loaded dataset"
        );

        Ok(Self { schema, rows })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn rows(&self) -> &[TypedRow] {
        &self.rows
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        self.schema.headers()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn load_dataset(headers: &[String], raw_rows: &[RawRow]) -> Result<Dataset, LoadError> {
    Dataset::load(headers, raw_rows, DEFAULT_SAMPLE_ROWS)
}

#[cfg(test)]
mod tests {
    use cq_types::{DType, Scalar};

    use super::{LoadError, RawRow, load_dataset};

    fn raw(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn load_infers_and_coerces_together() {
        let rows = vec![
            raw(&[("age", "30"), ("name", "Ann"), ("score", "9.5")]),
            raw(&[("age", "17"), ("name", "bob"), ("score", "")]),
        ];
        let dataset = load_dataset(&headers(&["age", "name", "score"]), &rows).expect("load");

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.schema().dtype("age"), Some(DType::Int64));
        assert_eq!(dataset.schema().dtype("score"), Some(DType::Float64));
        assert_eq!(dataset.rows()[1].get("score"), &Scalar::Null);
        assert_eq!(dataset.headers(), &headers(&["age", "name", "score"])[..]);
    }

    #[test]
    fn every_typed_row_has_every_schema_column() {
        let rows = vec![raw(&[("a", "1")]), raw(&[("b", "x")])];
        let dataset = load_dataset(&headers(&["a", "b"]), &rows).expect("load");
        for row in dataset.rows() {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn empty_rows_and_duplicate_headers_fail() {
        let err = load_dataset(&headers(&["a"]), &[]).expect_err("empty");
        assert_eq!(err, LoadError::Empty);

        let err = load_dataset(&headers(&["a", "b", "a"]), &[raw(&[("a", "1")])])
            .expect_err("duplicate");
        assert_eq!(err, LoadError::DuplicateHeader("a".to_owned()));
        assert_eq!(
            err.to_string(),
            "Invalid CSV: Duplicate column name found: 'a'"
        );

        let err = load_dataset(&[], &[raw(&[("a", "1")])]).expect_err("no headers");
        assert_eq!(err, LoadError::MissingHeaders);
        let err = load_dataset(&[], &[]).expect_err("nothing at all");
        assert_eq!(err, LoadError::Empty);
    }
}
