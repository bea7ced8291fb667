#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_casefold::UnicodeCaseFold;

/// Semantic column type, declared from most to least specific so that the
/// derived `Ord` follows the widening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Utf8,
}

impl DType {
    /// The next candidate type once a sampled value fails to parse under `self`.
    #[must_use]
    pub fn widen(self) -> Option<Self> {
        match self {
            Self::Int64 => Some(Self::Float64),
            Self::Float64 => Some(Self::Bool),
            Self::Bool => Some(Self::Utf8),
            Self::Utf8 => None,
        }
    }

    #[must_use]
    pub fn accepts(self, text: &str) -> bool {
        parse_as(text, self).is_ok()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Int64 => "Integer",
            Self::Float64 => "Float",
            Self::Bool => "Boolean",
            Self::Utf8 => "String",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl Scalar {
    #[must_use]
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(DType::Bool),
            Self::Int64(_) => Some(DType::Int64),
            Self::Float64(_) => Some(DType::Float64),
            Self::Utf8(_) => Some(DType::Utf8),
        }
    }

    /// Runtime type name used in user-facing error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.dtype().map_or("Null", DType::name)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64(_) | Self::Float64(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Result<f64, TypeError> {
        match self {
            Self::Int64(v) => Ok(*v as f64),
            Self::Float64(v) => Ok(*v),
            Self::Null => Err(TypeError::ValueIsMissing),
            Self::Bool(_) | Self::Utf8(_) => Err(TypeError::NonNumericValue {
                value: self.to_string(),
                type_name: self.type_name(),
            }),
        }
    }

    /// Numeric ordering across Int64/Float64. Two integers compare exactly;
    /// otherwise both sides widen to `f64`, so `-0.0` equals `0.0`.
    pub fn numeric_cmp(&self, other: &Self) -> Result<Ordering, TypeError> {
        match (self, other) {
            (Self::Int64(a), Self::Int64(b)) => Ok(a.cmp(b)),
            _ => {
                let (a, b) = (self.to_f64()?, other.to_f64()?);
                Ok(a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b)))
            }
        }
    }
}

/// Text form used for export and for the mixed-kind sort fallback. Null
/// renders as the empty string; a whole float keeps its `.0` so the text
/// infers back to Float.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Utf8(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("cannot parse {value:?} as {dtype}")]
    Unparseable { value: String, dtype: DType },
    #[error("value {value:?} has non-numeric type {type_name}")]
    NonNumericValue {
        value: String,
        type_name: &'static str,
    },
    #[error("value is missing")]
    ValueIsMissing,
}

/// Blank cells and a literal `null` (any case) carry no value.
#[must_use]
pub fn is_null_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

/// Parse raw cell text under `dtype`. Numeric and boolean parsing ignores
/// surrounding whitespace; `Utf8` keeps the text verbatim.
pub fn parse_as(text: &str, dtype: DType) -> Result<Scalar, TypeError> {
    let trimmed = text.trim();
    let unparseable = || TypeError::Unparseable {
        value: text.to_owned(),
        dtype,
    };

    match dtype {
        DType::Int64 => trimmed
            .parse::<i64>()
            .map(Scalar::Int64)
            .map_err(|_| unparseable()),
        DType::Float64 => {
            // `f64::from_str` also accepts "inf"/"nan" spellings; a real
            // numeric cell always carries at least one digit.
            if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
                return Err(unparseable());
            }
            trimmed
                .parse::<f64>()
                .map(Scalar::Float64)
                .map_err(|_| unparseable())
        }
        DType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Scalar::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Scalar::Bool(false))
            } else {
                Err(unparseable())
            }
        }
        DType::Utf8 => Ok(Scalar::Utf8(text.to_owned())),
    }
}

/// Full Unicode case fold, the basis of every case-insensitive comparison.
#[must_use]
pub fn fold_case(text: &str) -> String {
    text.chars().case_fold().collect()
}

#[must_use]
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.chars().case_fold().eq(right.chars().case_fold())
}

#[must_use]
pub fn cmp_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars().case_fold().cmp(right.chars().case_fold())
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use proptest::prelude::*;

    use super::{DType, Scalar, TypeError, cmp_ignore_case, eq_ignore_case, is_null_text, parse_as};

    #[test]
    fn widening_walks_from_most_to_least_specific() {
        let mut chain = vec![DType::Int64];
        while let Some(next) = chain.last().and_then(|d| d.widen()) {
            chain.push(next);
        }
        assert_eq!(
            chain,
            vec![DType::Int64, DType::Float64, DType::Bool, DType::Utf8]
        );
        assert!(DType::Int64 < DType::Utf8);
    }

    #[test]
    fn null_text_covers_blank_and_literal_null() {
        assert!(is_null_text(""));
        assert!(is_null_text("   "));
        assert!(is_null_text("NULL"));
        assert!(is_null_text("Null"));
        assert!(!is_null_text("nullable"));
    }

    #[test]
    fn parse_as_respects_each_dtype() {
        assert_eq!(parse_as("42", DType::Int64).expect("int"), Scalar::Int64(42));
        assert_eq!(parse_as(" 7 ", DType::Int64).expect("int"), Scalar::Int64(7));
        assert_eq!(
            parse_as("3.5", DType::Float64).expect("float"),
            Scalar::Float64(3.5)
        );
        assert_eq!(parse_as("TRUE", DType::Bool).expect("bool"), Scalar::Bool(true));
        assert_eq!(
            parse_as(" keep me ", DType::Utf8).expect("utf8"),
            Scalar::Utf8(" keep me ".to_owned())
        );
    }

    #[test]
    fn parse_as_rejects_mismatches() {
        assert!(parse_as("3.5", DType::Int64).is_err());
        assert!(parse_as("1", DType::Bool).is_err());
        assert!(parse_as("inf", DType::Float64).is_err());
        assert!(parse_as("NaN", DType::Float64).is_err());
        let err = parse_as("abc", DType::Float64).expect_err("must fail");
        assert_eq!(err.to_string(), "cannot parse \"abc\" as Float");
    }

    #[test]
    fn numeric_cmp_mixes_int_and_float() {
        let cmp = Scalar::Int64(30)
            .numeric_cmp(&Scalar::Float64(30.0))
            .expect("numeric");
        assert_eq!(cmp, Ordering::Equal);
        let cmp = Scalar::Int64(2)
            .numeric_cmp(&Scalar::Float64(2.5))
            .expect("numeric");
        assert_eq!(cmp, Ordering::Less);
        let cmp = Scalar::Float64(-0.0)
            .numeric_cmp(&Scalar::Int64(0))
            .expect("numeric");
        assert_eq!(cmp, Ordering::Equal);
    }

    #[test]
    fn whole_floats_display_with_a_fraction() {
        assert_eq!(Scalar::Float64(1.0).to_string(), "1.0");
        assert_eq!(Scalar::Float64(-20.0).to_string(), "-20.0");
        assert_eq!(Scalar::Float64(2.5).to_string(), "2.5");
        assert_eq!(Scalar::Int64(1).to_string(), "1");
        assert_eq!(parse_as("1.0", DType::Int64).ok(), None);
    }

    #[test]
    fn to_f64_names_the_offending_type() {
        let err = Scalar::Utf8("x".into()).to_f64().expect_err("not numeric");
        assert_eq!(
            err,
            TypeError::NonNumericValue {
                value: "x".into(),
                type_name: "String",
            }
        );
    }

    #[test]
    fn case_insensitive_helpers_fold_unicode() {
        assert!(eq_ignore_case("Active", "aCTIVE"));
        assert!(eq_ignore_case("ÉCOLE", "école"));
        assert_eq!(cmp_ignore_case("apple", "Banana"), Ordering::Less);
    }

    #[test]
    fn scalar_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Scalar::Int64(5)).expect("serialize");
        assert_eq!(json, r#"{"kind":"int64","value":5}"#);
    }

    proptest! {
        #[test]
        fn integer_text_round_trips(value in any::<i64>()) {
            let scalar = parse_as(&value.to_string(), DType::Int64).expect("int");
            prop_assert_eq!(scalar.to_string(), value.to_string());
        }

        #[test]
        fn finite_float_text_round_trips(value in -1.0e12f64..1.0e12f64) {
            let text = Scalar::Float64(value).to_string();
            let reparsed = parse_as(&text, DType::Float64).expect("float");
            prop_assert_eq!(reparsed, Scalar::Float64(value));
        }
    }
}
