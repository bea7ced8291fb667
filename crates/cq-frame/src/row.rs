use std::collections::BTreeMap;

use cq_types::{Scalar, is_null_text, parse_as};
use serde::{Deserialize, Serialize};

use crate::Schema;

/// One source record: column name to raw cell text. A header with no cell in
/// the record is simply absent.
pub type RawRow = BTreeMap<String, String>;

static NULL: Scalar = Scalar::Null;

/// A row whose cells have been coerced to their schema types. Built only by
/// [`coerce_row`] (or [`TypedRow::new`] in tests) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedRow {
    values: BTreeMap<String, Scalar>,
}

impl TypedRow {
    #[must_use]
    pub fn new(values: BTreeMap<String, Scalar>) -> Self {
        Self { values }
    }

    /// Cell value for `column`; a column the row does not carry reads as null.
    #[must_use]
    pub fn get(&self, column: &str) -> &Scalar {
        self.values.get(column).unwrap_or(&NULL)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, Scalar> {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for TypedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Coerce every schema column of `row`. Blank, absent and `null` cells become
/// null, and so does any cell that does not parse under its column type.
#[must_use]
pub fn coerce_row(row: &RawRow, schema: &Schema) -> TypedRow {
    let values = schema
        .iter()
        .map(|(name, dtype)| {
            let value = row
                .get(name)
                .filter(|text| !is_null_text(text))
                .and_then(|text| parse_as(text, dtype).ok())
                .unwrap_or(Scalar::Null);
            (name.to_owned(), value)
        })
        .collect();
    TypedRow::new(values)
}

#[cfg(test)]
mod tests {
    use cq_types::{DType, Scalar};

    use super::{RawRow, TypedRow, coerce_row};
    use crate::Schema;

    fn schema() -> Schema {
        Schema::new(vec![
            ("zip".to_owned(), DType::Int64),
            ("score".to_owned(), DType::Float64),
            ("active".to_owned(), DType::Bool),
            ("name".to_owned(), DType::Utf8),
        ])
        .expect("schema")
    }

    #[test]
    fn coerce_parses_each_column_under_its_type() {
        let raw = RawRow::from([
            ("zip".to_owned(), "02139".to_owned()),
            ("score".to_owned(), "9.5".to_owned()),
            ("active".to_owned(), "True".to_owned()),
            ("name".to_owned(), " Ann ".to_owned()),
        ]);
        let row = coerce_row(&raw, &schema());
        assert_eq!(row.get("zip"), &Scalar::Int64(2139));
        assert_eq!(row.get("score"), &Scalar::Float64(9.5));
        assert_eq!(row.get("active"), &Scalar::Bool(true));
        assert_eq!(row.get("name"), &Scalar::Utf8(" Ann ".to_owned()));
    }

    #[test]
    fn coerce_failures_and_blanks_become_null() {
        let raw = RawRow::from([
            ("zip".to_owned(), "K1A 0B1".to_owned()),
            ("score".to_owned(), "   ".to_owned()),
            ("active".to_owned(), "yes".to_owned()),
            ("name".to_owned(), "NULL".to_owned()),
        ]);
        let row = coerce_row(&raw, &schema());
        for column in ["zip", "score", "active", "name"] {
            assert_eq!(row.get(column), &Scalar::Null, "column {column}");
        }
    }

    #[test]
    fn missing_source_cells_still_produce_every_schema_column() {
        let row = coerce_row(&RawRow::new(), &schema());
        assert_eq!(row.len(), 4);
        assert!(row.contains("name"));
        assert!(row.values().values().all(Scalar::is_null));
    }

    #[test]
    fn unknown_column_reads_as_null() {
        let row: TypedRow = [("a", 1_i64)].into_iter().collect();
        assert_eq!(row.get("b"), &Scalar::Null);
    }
}
