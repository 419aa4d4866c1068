//! Expression engine — source text → tokens → AST → value.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{ErrorKind, ExprError};
pub use token::{Token, TokenKind};
pub use value::Value;

use lexer::Lexer;
use parser::Parser;

/// Split source text into tokens.
pub fn lex(source: &str) -> Result<Vec<Token>, ExprError> {
    Lexer::new(source).tokenize()
}

/// Parse source text into an expression tree.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = lex(source)?;
    Parser::new(tokens).parse()
}
