//! Lexer for bytebeat expressions.
//!
//! Converts source text into a flat sequence of [`Token`]s. The lexer does
//! no structural validation; unbalanced parentheses and the like are left
//! to the parser.

use super::error::ExprError;
use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let ch = self.peek();

            // Only the ASCII space separates tokens.
            if ch == ' ' {
                self.advance();
                continue;
            }

            let token = match ch {
                't' => self.single_char(TokenKind::Identifier),
                '+' => self.single_char(TokenKind::Plus),
                '-' => self.single_char(TokenKind::Minus),
                '*' => self.single_char(TokenKind::Multiply),
                '/' => self.single_char(TokenKind::Divide),
                '%' => self.single_char(TokenKind::Modulo),
                '^' => self.single_char(TokenKind::BitwiseXor),
                '~' => self.single_char(TokenKind::BitwiseComplement),
                '?' => self.single_char(TokenKind::TernaryIf),
                ':' => self.single_char(TokenKind::TernaryElse),
                '(' => self.single_char(TokenKind::LeftParen),
                ')' => self.single_char(TokenKind::RightParen),
                '[' => self.single_char(TokenKind::LeftBracket),
                ']' => self.single_char(TokenKind::RightBracket),
                '<' => self.one_or_two(
                    TokenKind::LessThan,
                    &[('<', TokenKind::ShiftLeft), ('=', TokenKind::LessEqual)],
                ),
                '>' => self.one_or_two(
                    TokenKind::GreaterThan,
                    &[('>', TokenKind::ShiftRight), ('=', TokenKind::GreaterEqual)],
                ),
                '!' => self.one_or_two(TokenKind::Not, &[('=', TokenKind::NotEqual)]),
                '&' => self.one_or_two(TokenKind::BitwiseAnd, &[('&', TokenKind::And)]),
                '|' => self.one_or_two(TokenKind::BitwiseOr, &[('|', TokenKind::Or)]),
                '=' => self.lex_equal()?,
                '"' => self.lex_string()?,
                '0'..='9' => self.lex_integer()?,
                _ => {
                    return Err(ExprError::lex(
                        format!("invalid token: '{ch}'"),
                        self.col(),
                    ));
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn col(&self) -> usize {
        self.pos + 1
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let col = self.col();
        let ch = self.advance();
        Token::new(kind, ch.to_string(), col)
    }

    /// Lex an operator that collapses into a two-character token when the
    /// next character matches one of `longer`.
    fn one_or_two(&mut self, short: TokenKind, longer: &[(char, TokenKind)]) -> Token {
        let col = self.col();
        let mut text = self.advance().to_string();

        if let Some(next) = self.current() {
            if let Some(&(_, kind)) = longer.iter().find(|(c, _)| *c == next) {
                text.push(self.advance());
                return Token::new(kind, text, col);
            }
        }

        Token::new(short, text, col)
    }

    fn lex_equal(&mut self) -> Result<Token, ExprError> {
        let col = self.col();
        match self.peek_next() {
            Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::Equal, "==", col))
            }
            Some(other) => Err(ExprError::lex(
                format!("invalid token: '={other}', expected '=='"),
                col,
            )),
            None => Err(ExprError::lex("invalid token: '=' at end of input", col)),
        }
    }

    fn lex_string(&mut self) -> Result<Token, ExprError> {
        let col = self.col();
        self.advance(); // consume opening '"'
        let mut s = String::new();
        while !self.is_at_end() && self.peek() != '"' {
            s.push(self.advance());
        }
        if self.is_at_end() {
            return Err(ExprError::lex(
                format!("unterminated string literal: \"{s}"),
                col,
            ));
        }
        self.advance(); // consume closing '"'
        Ok(Token::new(TokenKind::String, s, col))
    }

    /// Lex a decimal run, or a hexadecimal run when the literal starts with
    /// `0x`/`0X`. The prefix is kept in the token text.
    fn lex_integer(&mut self) -> Result<Token, ExprError> {
        let col = self.col();
        let mut s = String::new();
        s.push(self.advance());

        if s == "0" && matches!(self.current(), Some('x' | 'X')) {
            s.push(self.advance());
            while !self.is_at_end() && self.peek().is_ascii_hexdigit() {
                s.push(self.advance());
            }
            if s.len() == 2 {
                return Err(ExprError::lex(
                    format!("invalid hexadecimal integer: {s}"),
                    col,
                ));
            }
        } else {
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                s.push(self.advance());
            }
        }

        Ok(Token::new(TokenKind::Integer, s, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_identifier_and_integer() {
        let tokens = Lexer::new("t 42").tokenize().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "t", 1));
        assert_eq!(tokens[1], Token::new(TokenKind::Integer, "42", 3));
    }

    #[test]
    fn lex_single_char_terminals() {
        assert_eq!(
            kinds("+-*/%^~?:()[]"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Multiply,
                TokenKind::Divide,
                TokenKind::Modulo,
                TokenKind::BitwiseXor,
                TokenKind::BitwiseComplement,
                TokenKind::TernaryIf,
                TokenKind::TernaryElse,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
            ]
        );
    }

    #[test]
    fn lex_two_char_operators() {
        assert_eq!(
            kinds("<< <= < >> >= > != ! && & || | =="),
            vec![
                TokenKind::ShiftLeft,
                TokenKind::LessEqual,
                TokenKind::LessThan,
                TokenKind::ShiftRight,
                TokenKind::GreaterEqual,
                TokenKind::GreaterThan,
                TokenKind::NotEqual,
                TokenKind::Not,
                TokenKind::And,
                TokenKind::BitwiseAnd,
                TokenKind::Or,
                TokenKind::BitwiseOr,
                TokenKind::Equal,
            ]
        );
    }

    #[test]
    fn lex_operator_at_end_of_input() {
        assert_eq!(kinds("t<"), vec![TokenKind::Identifier, TokenKind::LessThan]);
        assert_eq!(kinds("t|"), vec![TokenKind::Identifier, TokenKind::BitwiseOr]);
        assert_eq!(kinds("!"), vec![TokenKind::Not]);
    }

    #[test]
    fn lex_without_spaces() {
        assert_eq!(
            kinds("t*(t>>5|t>>8)"),
            vec![
                TokenKind::Identifier,
                TokenKind::Multiply,
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::ShiftRight,
                TokenKind::Integer,
                TokenKind::BitwiseOr,
                TokenKind::Identifier,
                TokenKind::ShiftRight,
                TokenKind::Integer,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn lex_hex_keeps_prefix() {
        let tokens = Lexer::new("0xfF 0X10").tokenize().unwrap();
        assert_eq!(tokens[0].text, "0xfF");
        assert_eq!(tokens[1].text, "0X10");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Integer));
    }

    #[test]
    fn lex_bare_hex_prefix_fails() {
        let err = Lexer::new("0x").tokenize().unwrap_err();
        assert!(err.is_lex());
        assert!(Lexer::new("0X").tokenize().unwrap_err().is_lex());
        assert!(Lexer::new("0x+1").tokenize().unwrap_err().is_lex());
    }

    #[test]
    fn lex_digits_then_letter_fails() {
        let err = Lexer::new("12a").tokenize().unwrap_err();
        assert!(err.is_lex());
        assert_eq!(err.col, 3);
    }

    #[test]
    fn lex_string_literal_verbatim() {
        let tokens = Lexer::new(r#""a b\n""#).tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r"a b\n");
    }

    #[test]
    fn lex_empty_string_literal() {
        let tokens = Lexer::new(r#""""#).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "");
    }

    #[test]
    fn lex_unterminated_string_fails() {
        assert!(Lexer::new("\"foo").tokenize().unwrap_err().is_lex());
        assert!(Lexer::new("\"").tokenize().unwrap_err().is_lex());
    }

    #[test]
    fn lex_bare_assignment_fails() {
        assert!(Lexer::new("t=1").tokenize().unwrap_err().is_lex());
        assert!(Lexer::new("t=").tokenize().unwrap_err().is_lex());
    }

    #[test]
    fn lex_unknown_character_names_it() {
        let err = Lexer::new("t + @").tokenize().unwrap_err();
        assert!(err.message.contains('@'));
        assert_eq!(err.col, 5);
    }

    #[test]
    fn lex_rejects_other_letters_and_whitespace() {
        assert!(Lexer::new("x").tokenize().is_err());
        assert!(Lexer::new("T").tokenize().is_err());
        assert!(Lexer::new("t\t+1").tokenize().is_err());
    }

    #[test]
    fn lex_does_not_check_balance() {
        assert_eq!(
            kinds("(()"),
            vec![
                TokenKind::LeftParen,
                TokenKind::LeftParen,
                TokenKind::RightParen
            ]
        );
    }

    #[test]
    fn lex_empty_input() {
        assert!(Lexer::new("").tokenize().unwrap().is_empty());
        assert!(Lexer::new("   ").tokenize().unwrap().is_empty());
    }
}
