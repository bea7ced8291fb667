//! Single-pass lexer for filter expressions.
//!
//! The lexer is an iterator: it yields tokens in source order, ends with
//! exactly one [`TokenKind::Eof`], and stops for good after the end of input
//! or the first error. Lexemes borrow from the source string.

use cq_types::Scalar;
use thiserror::Error;

use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
    #[error("Unterminated string at position {position}")]
    UnterminatedString { position: usize },
    #[error("Invalid number '{lexeme}' at position {position}")]
    InvalidNumber { lexeme: String, position: usize },
}

impl LexError {
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { position, .. }
            | Self::UnterminatedString { position }
            | Self::InvalidNumber { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    current: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current: 0,
            finished: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.current += 1;
        }
    }

    fn token(&self, kind: TokenKind, start: usize, literal: Option<Scalar>) -> Token<'a> {
        Token::new(kind, &self.source[start..self.current], literal, start)
    }

    fn scan_token(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace();
        let start = self.current;
        let Some(c) = self.advance() else {
            return Ok(Token::eof(start));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            // A bare `=` or `!` is read as `==` / `!=`.
            '=' => {
                self.eat('=');
                TokenKind::EqualEqual
            }
            '!' => {
                self.eat('=');
                TokenKind::BangEqual
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            '"' => return self.string(start),
            c if c.is_ascii_digit() => return self.number(start),
            c if c.is_alphabetic() || c == '_' => return Ok(self.identifier(start)),
            other => {
                return Err(LexError::UnexpectedCharacter {
                    ch: other,
                    position: start,
                });
            }
        };

        Ok(self.token(kind, start, None))
    }

    fn string(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        let body_start = self.current;
        let Some(len) = self.source[body_start..].find('"') else {
            self.current = self.source.len();
            return Err(LexError::UnterminatedString { position: start });
        };
        let value = &self.source[body_start..body_start + len];
        self.current = body_start + len + 1;
        Ok(self.token(
            TokenKind::String,
            start,
            Some(Scalar::Utf8(value.to_owned())),
        ))
    }

    fn number(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.current += 1;
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.current += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.current += 1;
            }
        }

        let lexeme = &self.source[start..self.current];
        let value = lexeme
            .parse::<f64>()
            .map_err(|_| LexError::InvalidNumber {
                lexeme: lexeme.to_owned(),
                position: start,
            })?;
        Ok(self.token(TokenKind::Number, start, Some(Scalar::Float64(value))))
    }

    fn identifier(&mut self, start: usize) -> Token<'a> {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let lexeme = &self.source[start..self.current];
        let kind = TokenKind::keyword(&lexeme.to_ascii_lowercase()).unwrap_or(TokenKind::Identifier);
        self.token(kind, start, None)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.scan_token();
        if result.as_ref().map_or(true, Token::is_eof) {
            self.finished = true;
        }
        Some(result)
    }
}

/// Lex the whole input. The returned vector always ends with an `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input).collect()
}
