use cq_types::Scalar;
use serde::{Deserialize, Serialize};

use crate::ast::BinaryOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    LParen,
    RParen,
    // Comparison
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // String predicates
    Contains,
    StartsWith,
    EndsWith,
    // Connectives
    And,
    Or,
    // Literal keywords
    True,
    False,
    Null,
    Identifier,
    Number,
    String,
    Eof,
}

impl TokenKind {
    /// Keyword lookup; `word` must already be ASCII-lowercased.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "and" => Self::And,
            "or" => Self::Or,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            _ => return None,
        };
        Some(kind)
    }

    /// Operators that bind at the comparison level of the grammar.
    #[must_use]
    pub fn comparison_op(self) -> Option<BinaryOp> {
        let op = match self {
            Self::EqualEqual => BinaryOp::Eq,
            Self::BangEqual => BinaryOp::Ne,
            Self::Less => BinaryOp::Lt,
            Self::LessEqual => BinaryOp::Le,
            Self::Greater => BinaryOp::Gt,
            Self::GreaterEqual => BinaryOp::Ge,
            Self::Contains => BinaryOp::Contains,
            Self::StartsWith => BinaryOp::StartsWith,
            Self::EndsWith => BinaryOp::EndsWith,
            _ => return None,
        };
        Some(op)
    }
}

/// A classified slice of the filter source. `position` is a byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub literal: Option<Scalar>,
    pub position: usize,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: &'a str, literal: Option<Scalar>, position: usize) -> Self {
        Self {
            kind,
            lexeme,
            literal,
            position,
        }
    }

    #[must_use]
    pub fn eof(position: usize) -> Self {
        Self::new(TokenKind::Eof, "", None, position)
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// How the token reads in an error message.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_eof() {
            "end of input".to_owned()
        } else {
            format!("'{}'", self.lexeme)
        }
    }
}
