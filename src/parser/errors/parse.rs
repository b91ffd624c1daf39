//! Top-level parse failure types.

use std::fmt;

use text_size::TextSize;
use thiserror::Error;

use super::codes::ErrorCode;
use super::error::SyntaxError;
use crate::base::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    /// The character starts no token
    UnexpectedCharacter,
    /// An opening paren, bracket or brace is never closed
    UnterminatedDelimiter,
}

impl LexErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedCharacter => ErrorCode::E0101,
            Self::UnterminatedDelimiter => ErrorCode::E0102,
        }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnexpectedCharacter => "unexpected character",
            Self::UnterminatedDelimiter => "unterminated delimiter",
        })
    }
}

/// Tokenizer failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} at {position}: {kind} '{character}'", .kind.code())]
pub struct LexError {
    pub kind: LexErrorKind,
    pub character: char,
    pub offset: TextSize,
    pub position: Position,
}

/// A configured bound on recursion depth or group size was exceeded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{what} limit of {limit} exceeded at {position}")]
pub struct LimitExceededError {
    /// What was bounded, e.g. "nesting depth"
    pub what: &'static str,
    pub limit: usize,
    pub depth: usize,
    pub offset: TextSize,
    pub position: Position,
}

/// Any failure to turn notation text into a design
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Limit(#[from] LimitExceededError),
}

impl ParseError {
    /// Byte offset the error points at
    pub fn offset(&self) -> TextSize {
        match self {
            Self::Lex(e) => e.offset,
            Self::Syntax(e) => e.offset(),
            Self::Limit(e) => e.offset,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Lex(e) => e.position,
            Self::Syntax(e) => e.position,
            Self::Limit(e) => e.position,
        }
    }

    /// Diagnostic code, when the error carries one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Lex(e) => Some(e.kind.code()),
            Self::Syntax(e) => Some(e.code),
            Self::Limit(_) => None,
        }
    }

    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }
}
