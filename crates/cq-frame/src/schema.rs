use std::collections::BTreeMap;

use cq_types::{DType, is_null_text};
use serde::{Deserialize, Serialize};

use crate::{LoadError, RawRow};

/// Number of non-null cells sampled per column during inference.
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Column name to inferred type, plus the header order of the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    headers: Vec<String>,
    dtypes: BTreeMap<String, DType>,
}

impl Schema {
    pub fn new(columns: Vec<(String, DType)>) -> Result<Self, LoadError> {
        let mut headers = Vec::with_capacity(columns.len());
        let mut dtypes = BTreeMap::new();
        for (name, dtype) in columns {
            if dtypes.insert(name.clone(), dtype).is_some() {
                return Err(LoadError::DuplicateHeader(name));
            }
            headers.push(name);
        }
        Ok(Self { headers, dtypes })
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn dtype(&self, name: &str) -> Option<DType> {
        self.dtypes.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.dtypes.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Columns in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DType)> + '_ {
        self.headers
            .iter()
            .filter_map(|name| self.dtypes.get(name).map(|dtype| (name.as_str(), *dtype)))
    }
}

pub fn infer_schema(
    rows: &[RawRow],
    headers: &[String],
    sample_rows: usize,
) -> Result<Schema, LoadError> {
    let columns = headers
        .iter()
        .map(|header| {
            let dtype = infer_column_type(rows, header, sample_rows);
            #[cfg(feature = "tracing")]
            tracing::debug!(column = %header, dtype = %dtype, "inferred column type");
            (header.clone(), dtype)
        })
        .collect();
    Schema::new(columns)
}

/// Widen from `Int64` the first time a sampled value fails under the current
/// candidate. Null cells are skipped and do not count toward the sample.
#[must_use]
pub fn infer_column_type(rows: &[RawRow], header: &str, sample_rows: usize) -> DType {
    let mut current = DType::Int64;
    let mut sampled = 0_usize;

    for row in rows {
        if sampled >= sample_rows {
            break;
        }
        let Some(value) = row.get(header) else {
            continue;
        };
        if is_null_text(value) {
            continue;
        }
        sampled += 1;

        while !current.accepts(value) {
            match current.widen() {
                Some(next) => current = next,
                None => break,
            }
        }
        if current == DType::Utf8 {
            break;
        }
    }

    if sampled == 0 { DType::Utf8 } else { current }
}
