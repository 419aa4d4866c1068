//! Parser for bytebeat expressions.
//!
//! Precedence climbing over the token stream. Binding power, high to low:
//!
//! ```text
//! [ ]  >  * / %  >  + -  >  << >>  >  < <= > >=  >  == !=
//!      >  &  >  ^  >  |  >  &&  >  ||  >  ?:
//! ```
//!
//! Every binary operator is left-associative; the conditional is
//! right-associative. Prefix `-`, `~` and `!` apply to the primary that
//! immediately follows them.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::ExprError;
use super::token::{Token, TokenKind};

/// Binding power of the conditional operator.
const TERNARY_PRECEDENCE: u8 = 0;

/// Nesting limit for parentheses, prefix operators and right operands.
pub const MAX_DEPTH: usize = 256;

/// Height limit for the finished tree, counting leaves as 1.
///
/// Serializing adds a parenthesis level per operator node and re-parsing
/// a parenthesized operand costs up to two nesting levels, so any
/// accepted tree re-parses from its own serialized form.
pub const MAX_HEIGHT: usize = MAX_DEPTH / 2;

/// A parsed subtree and its height.
type Node = (Expr, usize);

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream as a single expression.
    pub fn parse(&mut self) -> Result<Expr, ExprError> {
        if self.tokens.is_empty() {
            return Err(ExprError::parse("no tokens to parse", 1));
        }

        let (expr, _) = self.parse_expression(TERNARY_PRECEDENCE)?;

        if let Some(t) = self.peek() {
            return Err(ExprError::parse(
                format!("not all tokens consumed, next is {t}"),
                t.col,
            ));
        }

        Ok(expr)
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<Node, ExprError> {
        let (mut lhs, mut height) = self.parse_primary()?;

        while let Some(t) = self.peek() {
            let kind = t.kind;
            let Some(precedence) = precedence(kind) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let col = t.col;
            self.advance();

            (lhs, height) = match kind {
                TokenKind::LeftBracket => {
                    let (index, h) = self.nested(|p| p.parse_expression(TERNARY_PRECEDENCE))?;
                    self.expect(TokenKind::RightBracket, "unbalanced brackets")?;
                    (Expr::subscript(lhs, index), grow(col, [height, h])?)
                }
                TokenKind::TernaryIf => {
                    let (consequent, hc) =
                        self.nested(|p| p.parse_expression(TERNARY_PRECEDENCE))?;
                    self.expect(TokenKind::TernaryElse, "missing ternary else ':'")?;
                    // Same binding power again: `a?b:c?d:e` nests to the right.
                    let (alternative, ha) =
                        self.nested(|p| p.parse_expression(TERNARY_PRECEDENCE))?;
                    (
                        Expr::ternary(lhs, consequent, alternative),
                        grow(col, [height, hc, ha])?,
                    )
                }
                _ => {
                    let op = binary_op(kind).ok_or_else(|| {
                        ExprError::parse(format!("unrecognized operator: {kind}"), col)
                    })?;
                    let (rhs, h) = self.nested(|p| p.parse_expression(precedence + 1))?;
                    (Expr::binary(op, lhs, rhs), grow(col, [height, h])?)
                }
            };
        }

        Ok((lhs, height))
    }

    fn parse_primary(&mut self) -> Result<Node, ExprError> {
        let Some(t) = self.peek() else {
            return Err(ExprError::parse(
                "expected primary token but got end of input",
                self.end_col(),
            ));
        };
        let kind = t.kind;
        let col = t.col;

        match kind {
            TokenKind::Identifier => {
                self.advance();
                Ok((Expr::Time, 1))
            }
            TokenKind::Integer => {
                let value = parse_integer(&t.text, col)?;
                self.advance();
                Ok((Expr::Integer(value), 1))
            }
            TokenKind::String => {
                let s = t.text.clone();
                self.advance();
                Ok((Expr::Str(s), 1))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.nested(|p| p.parse_expression(TERNARY_PRECEDENCE))?;
                self.expect(TokenKind::RightParen, "unbalanced parentheses")?;
                Ok(inner)
            }
            TokenKind::Minus | TokenKind::BitwiseComplement | TokenKind::Not => {
                self.advance();
                if self.is_at_end() {
                    return Err(ExprError::parse(
                        format!(
                            "expected operand for unary prefix operator {kind} but got end of input"
                        ),
                        col,
                    ));
                }
                let op = match kind {
                    TokenKind::Minus => UnaryOp::Negate,
                    TokenKind::BitwiseComplement => UnaryOp::Complement,
                    _ => UnaryOp::Not,
                };
                let (operand, h) = self.nested(|p| p.parse_primary())?;
                Ok((Expr::unary(op, operand), grow(col, [h])?))
            }
            _ => Err(ExprError::parse(
                format!("unexpected primary token: {t}"),
                col,
            )),
        }
    }

    /// Run `f` one nesting level deeper, failing once [`MAX_DEPTH`] is hit.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            let col = self.peek().map_or_else(|| self.end_col(), |t| t.col);
            return Err(ExprError::parse("expression nested too deeply", col));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), ExprError> {
        match self.peek() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(ExprError::parse(format!("{message}, got {t}"), t.col)),
            None => Err(ExprError::parse(
                format!("{message}, got end of input"),
                self.end_col(),
            )),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Column just past the last token, for end-of-input diagnostics.
    fn end_col(&self) -> usize {
        self.tokens.last().map_or(1, |t| {
            let quotes = if t.kind == TokenKind::String { 2 } else { 0 };
            t.col + t.text.chars().count() + quotes
        })
    }
}

/// Height of a new node over `children`, failing past [`MAX_HEIGHT`].
fn grow<const N: usize>(col: usize, children: [usize; N]) -> Result<usize, ExprError> {
    let height = 1 + children.into_iter().max().unwrap_or(0);
    if height > MAX_HEIGHT {
        return Err(ExprError::parse("expression nested too deeply", col));
    }
    Ok(height)
}

fn precedence(kind: TokenKind) -> Option<u8> {
    let p = match kind {
        TokenKind::LeftBracket => 11,
        TokenKind::Multiply | TokenKind::Divide | TokenKind::Modulo => 10,
        TokenKind::Plus | TokenKind::Minus => 9,
        TokenKind::ShiftLeft | TokenKind::ShiftRight => 8,
        TokenKind::LessThan
        | TokenKind::LessEqual
        | TokenKind::GreaterThan
        | TokenKind::GreaterEqual => 7,
        TokenKind::Equal | TokenKind::NotEqual => 6,
        TokenKind::BitwiseAnd => 5,
        TokenKind::BitwiseXor => 4,
        TokenKind::BitwiseOr => 3,
        TokenKind::And => 2,
        TokenKind::Or => 1,
        TokenKind::TernaryIf => TERNARY_PRECEDENCE,
        _ => return None,
    };
    Some(p)
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Multiply => BinaryOp::Multiply,
        TokenKind::Divide => BinaryOp::Divide,
        TokenKind::Modulo => BinaryOp::Modulo,
        TokenKind::BitwiseAnd => BinaryOp::BitAnd,
        TokenKind::BitwiseOr => BinaryOp::BitOr,
        TokenKind::BitwiseXor => BinaryOp::BitXor,
        TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
        TokenKind::ShiftRight => BinaryOp::ShiftRight,
        TokenKind::LessThan => BinaryOp::Less,
        TokenKind::GreaterThan => BinaryOp::Greater,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::Equal => BinaryOp::Equal,
        TokenKind::NotEqual => BinaryOp::NotEqual,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}

/// Resolve an integer literal, decimal or `0x`-prefixed hexadecimal.
fn parse_integer(text: &str, col: usize) -> Result<i32, ExprError> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => i32::from_str_radix(hex, 16),
        None => text.parse::<i32>(),
    };
    parsed.map_err(|_| ExprError::parse(format!("integer literal out of range: {text}"), col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer::Lexer;
    use crate::expr::Value;

    fn parse(src: &str) -> Result<Expr, ExprError> {
        let tokens = Lexer::new(src).tokenize()?;
        Parser::new(tokens).parse()
    }

    fn serialized(src: &str) -> String {
        parse(src).unwrap().serialize()
    }

    #[test]
    fn parse_simple_expression() {
        let expr = parse("t+1").unwrap();
        assert_eq!(expr.serialize(), "(t+1)");
        assert_eq!(expr.evaluate(2), Value::Integer(3));
    }

    #[test]
    fn parse_precedence() {
        let expr = parse("t+2*t").unwrap();
        assert_eq!(expr.serialize(), "(t+(2*t))");
        assert_eq!(expr.evaluate(2), Value::Integer(6));

        let expr = parse("t*2+t*3").unwrap();
        assert_eq!(expr.serialize(), "((t*2)+(t*3))");
        assert_eq!(expr.evaluate(1), Value::Integer(5));
    }

    #[test]
    fn parse_parentheses() {
        let expr = parse("(t+1)*t").unwrap();
        assert_eq!(expr.serialize(), "((t+1)*t)");
        assert_eq!(expr.evaluate(2), Value::Integer(6));
        assert_eq!(serialized("(((t*t)))"), "(t*t)");
    }

    #[test]
    fn parse_left_associative() {
        assert_eq!(serialized("t-1-2"), "((t-1)-2)");
        assert_eq!(serialized("t/2/3"), "((t/2)/3)");
        assert_eq!(serialized("t>>1>>2"), "((t>>1)>>2)");
        assert_eq!(serialized("1|2|3"), "((1|2)|3)");
    }

    #[test]
    fn parse_full_precedence_ladder() {
        assert_eq!(serialized("t<<1+2"), "(t<<(1+2))");
        assert_eq!(serialized("t<1<<2"), "(t<(1<<2))");
        assert_eq!(serialized("t==1<2"), "(t==(1<2))");
        assert_eq!(serialized("t&1==2"), "(t&(1==2))");
        assert_eq!(serialized("t^1&2"), "(t^(1&2))");
        assert_eq!(serialized("t|1^2"), "(t|(1^2))");
        assert_eq!(serialized("t&&1|2"), "(t&&(1|2))");
        assert_eq!(serialized("t||1&&2"), "(t||(1&&2))");
        assert_eq!(serialized("t||1?2:3"), "((t||1)?2:3)");
    }

    #[test]
    fn parse_mixed_levels_back_down() {
        assert_eq!(serialized("t*2+1<<3"), "(((t*2)+1)<<3)");
        assert_eq!(serialized("1+t*2-3"), "((1+(t*2))-3)");
    }

    #[test]
    fn parse_ternary() {
        let expr = parse("t>2?1:0").unwrap();
        assert_eq!(expr.serialize(), "((t>2)?1:0)");
        assert_eq!(expr.evaluate(3), Value::Integer(1));
        assert_eq!(expr.evaluate(2), Value::Integer(0));
    }

    #[test]
    fn parse_ternary_is_right_associative() {
        assert_eq!(serialized("t?1:t?2:3"), "(t?1:(t?2:3))");
        assert_eq!(serialized("t?t?1:2:3"), "(t?(t?1:2):3)");
    }

    #[test]
    fn parse_ternary_missing_else() {
        let err = parse("t?1").unwrap_err();
        assert!(err.is_parse());
        assert!(parse("t?1 2").unwrap_err().is_parse());
    }

    #[test]
    fn parse_subscript() {
        let expr = parse("\"foo\"[t]").unwrap();
        assert_eq!(expr.serialize(), "(\"foo\"[t])");
        assert_eq!(expr.evaluate(0), Value::Integer(102));
        assert_eq!(serialized("\"ab\"[t%2]*2"), "((\"ab\"[(t%2)])*2)");
    }

    #[test]
    fn parse_subscript_missing_bracket() {
        assert!(parse("\"foo\"[t").unwrap_err().is_parse());
        assert!(parse("\"foo\"[t)").unwrap_err().is_parse());
    }

    #[test]
    fn parse_unary_binds_to_primary() {
        assert_eq!(serialized("-t*2"), "((-t)*2)");
        assert_eq!(serialized("~t>>4"), "((~t)>>4)");
        assert_eq!(serialized("!t"), "(!t)");
        assert_eq!(serialized("--t"), "(-(-t))");
        assert_eq!(serialized("-(t+1)"), "(-(t+1))");
        assert_eq!(serialized("-\"ab\"[0]"), "((-\"ab\")[0])");
    }

    #[test]
    fn parse_unary_at_end_fails() {
        assert!(parse("-").unwrap_err().is_parse());
        assert!(parse("t+~").unwrap_err().is_parse());
    }

    #[test]
    fn parse_hex_literals() {
        assert_eq!(parse("0xff").unwrap(), Expr::Integer(255));
        assert_eq!(parse("0X10").unwrap(), Expr::Integer(16));
        assert_eq!(parse("0x7fffffff").unwrap(), Expr::Integer(i32::MAX));
    }

    #[test]
    fn parse_decimal_with_leading_zero_is_not_octal() {
        assert_eq!(parse("010").unwrap(), Expr::Integer(10));
    }

    #[test]
    fn parse_out_of_range_literal_fails() {
        assert!(parse("2147483648").unwrap_err().is_parse());
        assert!(parse("0x80000000").unwrap_err().is_parse());
        assert_eq!(parse("2147483647").unwrap(), Expr::Integer(i32::MAX));
    }

    #[test]
    fn parse_unbalanced_parentheses() {
        assert!(parse("(t+1").unwrap_err().is_parse());
        assert!(parse("t+1)))").unwrap_err().is_parse());
    }

    #[test]
    fn parse_incomplete_expression() {
        let err = parse("t+").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.col, 3);
    }

    #[test]
    fn parse_empty_input() {
        let err = parse("").unwrap_err();
        assert!(err.is_parse());
        assert!(parse("   ").unwrap_err().is_parse());
    }

    #[test]
    fn parse_trailing_tokens() {
        let err = parse("t t").unwrap_err();
        assert!(err.is_parse());
        assert!(err.message.contains("not all tokens consumed"));
        assert_eq!(err.col, 3);
    }

    #[test]
    fn parse_unexpected_primary() {
        assert!(parse("*t").unwrap_err().is_parse());
        assert!(parse(")").unwrap_err().is_parse());
        assert!(parse(":").unwrap_err().is_parse());
        assert!(parse("t+]").unwrap_err().is_parse());
    }

    #[test]
    fn parse_lex_errors_propagate() {
        assert!(parse("t=1").unwrap_err().is_lex());
        assert!(parse("0x").unwrap_err().is_lex());
    }

    #[test]
    fn parse_depth_limit() {
        let deep = format!("{}t{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        let err = parse(&deep).unwrap_err();
        assert!(err.message.contains("nested too deeply"));

        let ok = format!("{}t{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&ok).unwrap(), Expr::Time);
    }

    #[test]
    fn parse_height_limit_on_left_chains() {
        let longest = vec!["t"; MAX_HEIGHT].join("+");
        assert_eq!(parse(&longest).unwrap().node_count(), 2 * MAX_HEIGHT - 1);

        let err = parse(&vec!["t"; MAX_HEIGHT + 1].join("+")).unwrap_err();
        assert!(err.is_parse());
        assert!(err.message.contains("nested too deeply"));

        let subscripts = format!("\"a\"{}", "[0]".repeat(MAX_HEIGHT));
        assert!(parse(&subscripts).unwrap_err().is_parse());
    }

    #[test]
    fn parse_height_counts_every_node_kind() {
        let unary = format!("{}t", "-".repeat(MAX_HEIGHT - 1));
        assert!(parse(&unary).is_ok());
        let unary = format!("{}t", "-".repeat(MAX_HEIGHT));
        assert!(parse(&unary).unwrap_err().is_parse());

        let ternary = format!("{}t", "t?t:".repeat(MAX_HEIGHT));
        assert!(parse(&ternary).unwrap_err().is_parse());
    }

    #[test]
    fn parse_crowd() {
        let src = "((t<<1)^((t<<1)+(t>>7)&t>>12))|t>>(4-(1^7&(t>>19)))|t>>7";
        let expr = parse(src).unwrap();
        assert_eq!(
            expr.serialize(),
            "((((t<<1)^(((t<<1)+(t>>7))&(t>>12)))|(t>>(4-(1^(7&(t>>19))))))|(t>>7))"
        );
    }
}
