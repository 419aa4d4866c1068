//! Token types for the bytebeat expression lexer.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. For string literals this is the content
    /// between the quotes; for integers it keeps the `0x` prefix.
    pub text: String,
    /// 1-based column of the first character.
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            col,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Operands
    Identifier,
    Integer,
    String,

    // Grouping
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,

    // Bitwise
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    BitwiseComplement,

    // Comparison
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,

    // Logical
    Not,
    And,
    Or,

    // Conditional
    TernaryIf,   // ?
    TernaryElse, // :
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "{} \"{}\"", self.kind, self.text),
            _ => write!(f, "{} '{}'", self.kind, self.text),
        }
    }
}
