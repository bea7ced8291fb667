use std::fmt;

use cq_types::Scalar;
use serde::{Deserialize, Serialize};

/// Comparison and string-predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    StartsWith,
    EndsWith,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Parsed filter. `position` fields are byte offsets of the operator or
/// identifier in the filter text.
///
/// A run of one connective is a single `Logical` node, so `a AND b AND c`
/// adds one level to the tree however long it grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        position: usize,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        operands: Vec<Expr>,
    },
    Grouping {
        inner: Box<Expr>,
    },
    Literal {
        value: Scalar,
    },
    Variable {
        name: String,
        position: usize,
    },
}

impl Expr {
    #[must_use]
    pub fn binary(left: Self, op: BinaryOp, position: usize, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            position,
            right: Box::new(right),
        }
    }

    /// Join `operands` with `op`. A single operand is returned unwrapped.
    #[must_use]
    pub fn logical(op: LogicalOp, mut operands: Vec<Self>) -> Self {
        if operands.len() == 1 {
            return operands.remove(0);
        }
        Self::Logical { op, operands }
    }

    #[must_use]
    pub fn grouping(inner: Self) -> Self {
        Self::Grouping {
            inner: Box::new(inner),
        }
    }

    #[must_use]
    pub fn literal(value: impl Into<Scalar>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn variable(name: impl Into<String>, position: usize) -> Self {
        Self::Variable {
            name: name.into(),
            position,
        }
    }
}

/// Canonical filter text. Parsing the output of a parsed tree yields an
/// equivalent tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary {
                left, op, right, ..
            } => write!(f, "{left} {op} {right}"),
            Self::Logical { op, operands } => {
                for (index, operand) in operands.iter().enumerate() {
                    if index > 0 {
                        write!(f, " {op} ")?;
                    }
                    write!(f, "{operand}")?;
                }
                Ok(())
            }
            Self::Grouping { inner } => write!(f, "({inner})"),
            Self::Literal { value } => match value {
                Scalar::Null => f.write_str("null"),
                Scalar::Utf8(text) => write!(f, "\"{text}\""),
                other => write!(f, "{other}"),
            },
            Self::Variable { name, .. } => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use cq_types::Scalar;

    use super::{BinaryOp, Expr, LogicalOp};

    fn sample() -> Expr {
        Expr::logical(
            LogicalOp::And,
            vec![
                Expr::binary(Expr::variable("age", 0), BinaryOp::Gt, 4, Expr::literal(18.0)),
                Expr::grouping(Expr::binary(
                    Expr::variable("name", 14),
                    BinaryOp::StartsWith,
                    19,
                    Expr::literal("A"),
                )),
            ],
        )
    }

    #[test]
    fn display_renders_canonical_filter_text() {
        assert_eq!(sample().to_string(), r#"age > 18.0 AND (name startsWith "A")"#);
        assert_eq!(Expr::literal(Scalar::Null).to_string(), "null");
        assert_eq!(Expr::literal(true).to_string(), "true");
        assert_eq!(Expr::literal(2.5).to_string(), "2.5");
    }

    #[test]
    fn logical_chains_stay_flat() {
        let chain = Expr::logical(
            LogicalOp::Or,
            vec![sample(), Expr::variable("active", 40), Expr::literal(false)],
        );
        assert_eq!(
            chain.to_string(),
            r#"age > 18.0 AND (name startsWith "A") OR active OR false"#
        );
        assert_eq!(
            Expr::logical(LogicalOp::And, vec![Expr::literal(true)]),
            Expr::literal(true)
        );
    }

    #[test]
    fn expr_serializes_with_kind_tag() {
        let json = serde_json::to_value(Expr::variable("age", 0)).expect("serialize");
        assert_eq!(json["kind"], "variable");
        assert_eq!(json["name"], "age");

        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["kind"], "logical");
        assert_eq!(json["op"], "and");
        assert_eq!(json["operands"][1]["kind"], "grouping");
    }
}
