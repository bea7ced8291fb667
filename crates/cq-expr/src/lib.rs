#![forbid(unsafe_code)]

mod ast;
mod eval;
mod lexer;
mod parser;
mod token;

pub use ast::{BinaryOp, Expr, LogicalOp};
pub use eval::{EvalError, compare, evaluate, is_equal, is_truthy};
pub use lexer::{LexError, Lexer, tokenize};
pub use parser::{ParseError, parse};
pub use token::{Token, TokenKind};

use cq_frame::{Schema, TypedRow};
use cq_runtime::QueryPolicy;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Lex and parse `input` against the known column names, given in header
/// order.
pub fn parse_filter(
    input: &str,
    columns: &[String],
    policy: &QueryPolicy,
) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    Ok(parse(&tokens, columns, policy)?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub scanned: usize,
    pub matched: usize,
    pub failed: usize,
}

pub fn filter_rows<'a>(
    rows: &'a [TypedRow],
    schema: &Schema,
    filter: &str,
    policy: &QueryPolicy,
) -> Result<Vec<&'a TypedRow>, ExprError> {
    filter_rows_with_stats(rows, schema, filter, policy).map(|(matched, _)| matched)
}

/// Filter `rows` in order. Blank filter text selects every row without
/// invoking the parser. A row whose evaluation fails is excluded and counted
/// in [`FilterStats::failed`].
pub fn filter_rows_with_stats<'a>(
    rows: &'a [TypedRow],
    schema: &Schema,
    filter: &str,
    policy: &QueryPolicy,
) -> Result<(Vec<&'a TypedRow>, FilterStats), ExprError> {
    if filter.trim().is_empty() {
        let stats = FilterStats {
            scanned: rows.len(),
            matched: rows.len(),
            failed: 0,
        };
        return Ok((rows.iter().collect(), stats));
    }

    let expr = parse_filter(filter, schema.headers(), policy)?;

    let mut stats = FilterStats::default();
    let mut matched = Vec::new();
    for row in rows {
        stats.scanned += 1;
        match evaluate(&expr, row) {
            Ok(true) => matched.push(row),
            Ok(false) => {}
            Err(_err) => {
                stats.failed += 1;
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    row = stats.scanned - 1,
                    error = %_err,
                    "row excluded by evaluation error"
                );
            }
        }
    }
    stats.matched = matched.len();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        filter = %expr,
        scanned = stats.scanned,
        matched = stats.matched,
        failed = stats.failed,
        "filter applied"
    );

    Ok((matched, stats))
}
