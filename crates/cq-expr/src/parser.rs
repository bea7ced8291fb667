//! Recursive-descent parser for the filter grammar:
//!
//! ```text
//! expression := or_expr
//! or_expr    := and_expr ("OR" and_expr)*
//! and_expr   := comparison ("AND" comparison)*
//! comparison := primary (comparison_op primary)*
//! primary    := NUMBER | STRING | true | false | null | IDENTIFIER | "(" expression ")"
//! ```
//!
//! Identifiers are checked against the dataset's columns as they are read.
//! Parenthesised groups and chained comparisons each count one level against
//! [`QueryPolicy::max_depth`].

use cq_runtime::QueryPolicy;
use cq_types::Scalar;
use thiserror::Error;

use crate::ast::{Expr, LogicalOp};
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Filter expression is empty")]
    Empty,
    #[error(
        "Unknown column '{name}' at position {position}. Available columns: [{}]",
        .available.join(", ")
    )]
    UnknownColumn {
        name: String,
        position: usize,
        available: Vec<String>,
    },
    #[error("Expected expression at position {position}, but found {found}")]
    ExpectedExpression { position: usize, found: String },
    #[error("Expected ')' after expression at position {position}, but found {found}")]
    UnclosedGroup { position: usize, found: String },
    #[error("Unexpected {found} at position {position} after a complete expression")]
    TrailingInput { position: usize, found: String },
    #[error("Filter nests deeper than {limit} levels at position {position}")]
    TooDeep { position: usize, limit: usize },
}

impl ParseError {
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::UnknownColumn { position, .. }
            | Self::ExpectedExpression { position, .. }
            | Self::UnclosedGroup { position, .. }
            | Self::TrailingInput { position, .. }
            | Self::TooDeep { position, .. } => Some(*position),
        }
    }
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    current: usize,
    columns: &'t [String],
    depth: usize,
    max_depth: usize,
    eof: Token<'a>,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>], columns: &'t [String], max_depth: usize) -> Self {
        let end = tokens
            .last()
            .map_or(0, |token| token.position + token.lexeme.len());
        Self {
            tokens,
            current: 0,
            columns,
            depth: 0,
            max_depth,
            eof: Token::eof(end),
        }
    }

    fn peek(&self) -> &Token<'a> {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> &Token<'a> {
        let index = self.current;
        if index < self.tokens.len() {
            self.current += 1;
        }
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn descend(&mut self, position: usize) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeep {
                position,
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.and_expr()?];
        while self.check(TokenKind::Or) {
            self.advance();
            operands.push(self.and_expr()?);
        }
        Ok(Expr::logical(LogicalOp::Or, operands))
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.comparison()?];
        while self.check(TokenKind::And) {
            self.advance();
            operands.push(self.comparison()?);
        }
        Ok(Expr::logical(LogicalOp::And, operands))
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut left = self.primary()?;
        while let Some(op) = self.peek().kind.comparison_op() {
            let position = self.advance().position;
            // each link wraps the chain so far one level deeper
            self.descend(position)?;
            let right = self.primary()?;
            left = Expr::binary(left, op, position, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance().clone();
        match token.kind {
            TokenKind::True => Ok(Expr::literal(true)),
            TokenKind::False => Ok(Expr::literal(false)),
            TokenKind::Null => Ok(Expr::literal(Scalar::Null)),
            TokenKind::Number | TokenKind::String => Ok(Expr::Literal {
                value: token.literal.unwrap_or(Scalar::Null),
            }),
            TokenKind::Identifier => self.variable(&token),
            TokenKind::LParen => {
                self.descend(token.position)?;
                let inner = self.or_expr()?;
                if !self.check(TokenKind::RParen) {
                    let found = self.peek();
                    return Err(ParseError::UnclosedGroup {
                        position: found.position,
                        found: found.describe(),
                    });
                }
                self.advance();
                self.depth -= 1;
                Ok(Expr::grouping(inner))
            }
            _ => Err(ParseError::ExpectedExpression {
                position: token.position,
                found: token.describe(),
            }),
        }
    }

    fn variable(&self, token: &Token<'a>) -> Result<Expr, ParseError> {
        if self.columns.iter().any(|column| column == token.lexeme) {
            return Ok(Expr::variable(token.lexeme, token.position));
        }
        Err(ParseError::UnknownColumn {
            name: token.lexeme.to_owned(),
            position: token.position,
            available: self.columns.to_vec(),
        })
    }
}

/// Parse a token stream into an expression tree. Identifiers must name one
/// of `columns`, which also gives the order of the list in
/// [`ParseError::UnknownColumn`]. Tokens left over after a complete
/// expression are an error unless `policy` allows them.
pub fn parse(
    tokens: &[Token<'_>],
    columns: &[String],
    policy: &QueryPolicy,
) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens, columns, policy.max_depth);
    if parser.check(TokenKind::Eof) {
        return Err(ParseError::Empty);
    }

    let expr = parser.or_expr()?;

    let rest = parser.peek();
    if !rest.is_eof() {
        if !policy.allows_trailing_tokens() {
            return Err(ParseError::TrailingInput {
                position: rest.position,
                found: rest.describe(),
            });
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(position = rest.position, "ignoring trailing filter input");
    }

    Ok(expr)
}
