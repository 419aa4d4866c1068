//! Abstract Syntax Tree for bytebeat expressions.
//!
//! Trees are built once by the parser and only read afterwards. Each node
//! owns its children, so a whole tree is dropped in one go when the
//! interpreter replaces it.

use std::fmt;

use super::value::Value;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Complement,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Complement => "~",
            UnaryOp::Not => "!",
        }
    }

    fn apply(self, operand: Value<'_>) -> Value<'static> {
        let Some(x) = operand.as_int() else {
            return Value::Undefined;
        };
        match self {
            UnaryOp::Negate => Value::Integer(x.wrapping_neg()),
            UnaryOp::Complement => Value::Integer(!x),
            UnaryOp::Not => Value::from_bool(x == 0),
        }
    }
}

/// Infix operators. Subscript and the ternary conditional have their own
/// node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Apply a strict (both operands evaluated) integer operator.
    fn apply(self, a: i32, b: i32) -> Value<'static> {
        match self {
            BinaryOp::Add => Value::Integer(a.wrapping_add(b)),
            BinaryOp::Subtract => Value::Integer(a.wrapping_sub(b)),
            BinaryOp::Multiply => Value::Integer(a.wrapping_mul(b)),
            BinaryOp::Divide if b == 0 => Value::Undefined,
            BinaryOp::Divide => Value::Integer(a.wrapping_div(b)),
            BinaryOp::Modulo if b == 0 => Value::Undefined,
            BinaryOp::Modulo => Value::Integer(a.wrapping_rem(b)),
            BinaryOp::BitAnd => Value::Integer(a & b),
            BinaryOp::BitOr => Value::Integer(a | b),
            BinaryOp::BitXor => Value::Integer(a ^ b),
            BinaryOp::ShiftLeft => Value::Integer(a.wrapping_shl(b as u32)),
            BinaryOp::ShiftRight => Value::Integer(a.wrapping_shr(b as u32)),
            BinaryOp::Less => Value::from_bool(a < b),
            BinaryOp::Greater => Value::from_bool(a > b),
            BinaryOp::LessEqual => Value::from_bool(a <= b),
            BinaryOp::GreaterEqual => Value::from_bool(a >= b),
            BinaryOp::Equal => Value::from_bool(a == b),
            BinaryOp::NotEqual => Value::from_bool(a != b),
            BinaryOp::And => Value::from_bool(a != 0 && b != 0),
            BinaryOp::Or => Value::from_bool(a != 0 || b != 0),
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expr {
    /// Evaluates to `Undefined` for every `t`. This is the silence the
    /// interpreter plays before any expression has been accepted; the
    /// parser never produces it.
    #[default]
    Undefined,
    /// The time input `t`.
    Time,
    Integer(i32),
    Str(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Subscript {
        sequence: Box<Expr>,
        index: Box<Expr>,
    },
    Ternary {
        predicate: Box<Expr>,
        consequent: Box<Expr>,
        alternative: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn subscript(sequence: Expr, index: Expr) -> Self {
        Expr::Subscript {
            sequence: Box::new(sequence),
            index: Box::new(index),
        }
    }

    pub fn ternary(predicate: Expr, consequent: Expr, alternative: Expr) -> Self {
        Expr::Ternary {
            predicate: Box::new(predicate),
            consequent: Box::new(consequent),
            alternative: Box::new(alternative),
        }
    }

    /// Evaluate the expression at time `t`.
    pub fn evaluate(&self, t: i32) -> Value<'_> {
        match self {
            Expr::Undefined => Value::Undefined,
            Expr::Time => Value::Integer(t),
            Expr::Integer(i) => Value::Integer(*i),
            Expr::Str(s) => Value::Str(s.as_str()),
            Expr::Unary { op, operand } => op.apply(operand.evaluate(t)),
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => match left.evaluate(t).as_int() {
                None => Value::Undefined,
                Some(0) => Value::Integer(0),
                Some(_) => match right.evaluate(t).as_int() {
                    Some(b) => Value::from_bool(b != 0),
                    None => Value::Undefined,
                },
            },
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => match left.evaluate(t).as_int() {
                None => Value::Undefined,
                Some(0) => match right.evaluate(t).as_int() {
                    Some(b) => Value::from_bool(b != 0),
                    None => Value::Undefined,
                },
                Some(_) => Value::Integer(1),
            },
            Expr::Binary { op, left, right } => {
                let Some(a) = left.evaluate(t).as_int() else {
                    return Value::Undefined;
                };
                let Some(b) = right.evaluate(t).as_int() else {
                    return Value::Undefined;
                };
                op.apply(a, b)
            }
            Expr::Subscript { sequence, index } => {
                let Some(s) = sequence.evaluate(t).as_str() else {
                    return Value::Undefined;
                };
                let Some(i) = index.evaluate(t).as_int() else {
                    return Value::Undefined;
                };
                usize::try_from(i)
                    .ok()
                    .and_then(|i| s.as_bytes().get(i))
                    .map_or(Value::Undefined, |&b| Value::Integer(i32::from(b)))
            }
            Expr::Ternary {
                predicate,
                consequent,
                alternative,
            } => match predicate.evaluate(t).as_int() {
                None => Value::Undefined,
                Some(0) => alternative.evaluate(t),
                Some(_) => consequent.evaluate(t),
            },
        }
    }

    /// Render the canonical, fully parenthesized form.
    ///
    /// This is not the input text, but parsing it again yields a
    /// tree that evaluates identically for every `t`.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Undefined | Expr::Time | Expr::Integer(_) | Expr::Str(_) => 1,
            Expr::Unary { operand, .. } => 1 + operand.node_count(),
            Expr::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Expr::Subscript { sequence, index } => {
                1 + sequence.node_count() + index.node_count()
            }
            Expr::Ternary {
                predicate,
                consequent,
                alternative,
            } => 1 + predicate.node_count() + consequent.node_count() + alternative.node_count(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Undefined => write!(f, "UNDEFINED"),
            Expr::Time => write!(f, "t"),
            Expr::Integer(i) => write!(f, "{i}"),
            Expr::Str(s) => write!(f, "\"{s}\""),
            Expr::Unary { op, operand } => write!(f, "({}{operand})", op.symbol()),
            Expr::Binary { op, left, right } => write!(f, "({left}{}{right})", op.symbol()),
            Expr::Subscript { sequence, index } => write!(f, "({sequence}[{index}])"),
            Expr::Ternary {
                predicate,
                consequent,
                alternative,
            } => write!(f, "({predicate}?{consequent}:{alternative})"),
        }
    }
}
