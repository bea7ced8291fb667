use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use cq_types::Scalar;
use serde::{Deserialize, Serialize};

use crate::{FrameError, Schema, TypedRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = FrameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(FrameError::InvalidSortDirection(value.to_owned())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("ASC"),
            Self::Descending => f.write_str("DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    #[must_use]
    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    #[must_use]
    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }

    /// Null sorts below any value; the whole ordering, nulls included, is
    /// reversed for `Descending`.
    #[must_use]
    pub fn compare(&self, left: &TypedRow, right: &TypedRow) -> Ordering {
        let ordering = match (left.get(&self.column), right.get(&self.column)) {
            (Scalar::Null, Scalar::Null) => Ordering::Equal,
            (Scalar::Null, _) => Ordering::Less,
            (_, Scalar::Null) => Ordering::Greater,
            (a, b) => compare_values(a, b),
        };
        self.direction.apply(ordering)
    }
}

/// Natural order for like kinds; differing kinds compare by their text form.
#[must_use]
pub fn compare_values(left: &Scalar, right: &Scalar) -> Ordering {
    match (left, right) {
        (Scalar::Int64(a), Scalar::Int64(b)) => a.cmp(b),
        (Scalar::Float64(a), Scalar::Float64(b)) => a.total_cmp(b),
        (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
        (Scalar::Utf8(a), Scalar::Utf8(b)) => a.cmp(b),
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

/// Stable single-key sort. Without a key, or with a key naming a column the
/// schema does not know, the input order is returned untouched.
#[must_use]
pub fn sort_rows<'a>(
    mut rows: Vec<&'a TypedRow>,
    key: Option<&SortKey>,
    schema: &Schema,
) -> Vec<&'a TypedRow> {
    let Some(key) = key.filter(|key| schema.contains(&key.column)) else {
        return rows;
    };
    rows.sort_by(|left, right| key.compare(left, right));
    rows
}
