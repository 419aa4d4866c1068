//! Evaluation result type.

use std::fmt;

/// The result of evaluating an expression.
///
/// `Undefined` is the soft failure of the language: a type mismatch, a
/// division by zero or an out-of-range subscript produce it, and every
/// operator that receives it passes it on.
///
/// Strings only ever come from literals, so a `Str` borrows from the tree
/// that produced it and evaluation never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Value<'a> {
    #[default]
    Undefined,
    Integer(i32),
    Str(&'a str),
}

impl<'a> Value<'a> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// The integer payload, if this is an `Integer`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value for a truth test: `1` for true, `0` for false.
    pub fn from_bool(b: bool) -> Self {
        Value::Integer(i32::from(b))
    }
}

impl From<i32> for Value<'_> {
    fn from(i: i32) -> Self {
        Value::Integer(i)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "\"{s}\""),
        }
    }
}
