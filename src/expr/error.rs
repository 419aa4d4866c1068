//! Error type shared by the lexer and parser.

use std::fmt;

use thiserror::Error;

/// An error raised while turning source text into an expression tree.
///
/// Evaluation never fails; ill-typed operations produce
/// [`Value::Undefined`](super::Value::Undefined) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[col {col}] {kind}: {message}")]
pub struct ExprError {
    pub message: String,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lex => write!(f, "LexError"),
            ErrorKind::Parse => write!(f, "ParseError"),
        }
    }
}

impl ExprError {
    pub fn lex(message: impl Into<String>, col: usize) -> Self {
        Self {
            message: message.into(),
            col,
            kind: ErrorKind::Lex,
        }
    }

    pub fn parse(message: impl Into<String>, col: usize) -> Self {
        Self {
            message: message.into(),
            col,
            kind: ErrorKind::Parse,
        }
    }

    pub fn is_lex(&self) -> bool {
        self.kind == ErrorKind::Lex
    }

    pub fn is_parse(&self) -> bool {
        self.kind == ErrorKind::Parse
    }
}
