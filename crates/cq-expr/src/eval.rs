use std::borrow::Cow;
use std::cmp::Ordering;

use cq_frame::TypedRow;
use cq_types::{Scalar, TypeError, cmp_ignore_case, eq_ignore_case, fold_case};
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, LogicalOp};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Cannot compare {left} with {right}")]
    IncompatibleTypes {
        left: &'static str,
        right: &'static str,
    },
    #[error("Operator '{op}' requires String operands, found {left} and {right}")]
    StringOperation {
        op: BinaryOp,
        left: &'static str,
        right: &'static str,
    },
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl EvalError {
    fn incompatible(left: &Scalar, right: &Scalar) -> Self {
        Self::IncompatibleTypes {
            left: left.type_name(),
            right: right.type_name(),
        }
    }
}

/// Evaluate `expr` against one row and reduce the result to its truthiness.
pub fn evaluate(expr: &Expr, row: &TypedRow) -> Result<bool, EvalError> {
    let result = value(expr, row)?;
    Ok(is_truthy(&result))
}

/// Null is false, a boolean is itself, any other value is true.
#[must_use]
pub fn is_truthy(value: &Scalar) -> bool {
    match value {
        Scalar::Null => false,
        Scalar::Bool(v) => *v,
        _ => true,
    }
}

fn value<'a>(expr: &'a Expr, row: &'a TypedRow) -> Result<Cow<'a, Scalar>, EvalError> {
    match expr {
        Expr::Literal { value } => Ok(Cow::Borrowed(value)),
        Expr::Variable { name, .. } => Ok(Cow::Borrowed(row.get(name))),
        Expr::Grouping { inner } => value(inner, row),
        Expr::Binary {
            left, op, right, ..
        } => {
            let left = value(left, row)?;
            let right = value(right, row)?;
            apply(*op, &left, &right).map(|v| Cow::Owned(Scalar::Bool(v)))
        }
        Expr::Logical { op, operands } => {
            // every operand is evaluated; AND / OR never short-circuit
            let mut outcome = *op == LogicalOp::And;
            for operand in operands {
                let operand = value(operand, row)?;
                let truthy = is_truthy(&operand);
                outcome = match op {
                    LogicalOp::And => outcome && truthy,
                    LogicalOp::Or => outcome || truthy,
                };
            }
            Ok(Cow::Owned(Scalar::Bool(outcome)))
        }
    }
}

fn apply(op: BinaryOp, left: &Scalar, right: &Scalar) -> Result<bool, EvalError> {
    match op {
        BinaryOp::Eq => is_equal(left, right),
        BinaryOp::Ne => is_equal(left, right).map(|eq| !eq),
        BinaryOp::Lt => Ok(compare(left, right)?.is_lt()),
        BinaryOp::Le => Ok(compare(left, right)?.is_le()),
        BinaryOp::Gt => Ok(compare(left, right)?.is_gt()),
        BinaryOp::Ge => Ok(compare(left, right)?.is_ge()),
        BinaryOp::Contains | BinaryOp::StartsWith | BinaryOp::EndsWith => {
            string_predicate(op, left, right)
        }
    }
}

/// Equality with null matching only null, numbers by value, strings ignoring
/// case. A string is never coerced to match a number.
pub fn is_equal(left: &Scalar, right: &Scalar) -> Result<bool, EvalError> {
    match (left, right) {
        (Scalar::Null, Scalar::Null) => Ok(true),
        (Scalar::Null, _) | (_, Scalar::Null) => Ok(false),
        (a, b) if a.is_numeric() && b.is_numeric() => Ok(a.numeric_cmp(b)?.is_eq()),
        (Scalar::Utf8(a), Scalar::Utf8(b)) => Ok(eq_ignore_case(a, b)),
        (Scalar::Utf8(_), b) | (b, Scalar::Utf8(_)) if b.is_numeric() => {
            Err(EvalError::incompatible(left, right))
        }
        (Scalar::Bool(a), Scalar::Bool(b)) => Ok(a == b),
        _ => Ok(false),
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`. Null sorts below every value; only
/// number/number and string/string pairs are otherwise comparable.
pub fn compare(left: &Scalar, right: &Scalar) -> Result<Ordering, EvalError> {
    match (left, right) {
        (Scalar::Null, Scalar::Null) => Ok(Ordering::Equal),
        (Scalar::Null, _) => Ok(Ordering::Less),
        (_, Scalar::Null) => Ok(Ordering::Greater),
        (a, b) if a.is_numeric() && b.is_numeric() => Ok(a.numeric_cmp(b)?),
        (Scalar::Utf8(a), Scalar::Utf8(b)) => Ok(cmp_ignore_case(a, b)),
        _ => Err(EvalError::incompatible(left, right)),
    }
}

fn string_predicate(op: BinaryOp, left: &Scalar, right: &Scalar) -> Result<bool, EvalError> {
    let (haystack, needle) = match (left, right) {
        (Scalar::Null, _) => return Ok(false),
        (Scalar::Utf8(a), Scalar::Utf8(b)) => (fold_case(a), fold_case(b)),
        _ => {
            return Err(EvalError::StringOperation {
                op,
                left: left.type_name(),
                right: right.type_name(),
            });
        }
    };
    Ok(match op {
        BinaryOp::StartsWith => haystack.starts_with(&needle),
        BinaryOp::EndsWith => haystack.ends_with(&needle),
        _ => haystack.contains(&needle),
    })
}
