//! Interpreter — the active expression plus a one-entry sample cache.
//!
//! The host drives [`Interpreter::sample`] once per output sample. The time
//! input usually changes slower than the output rate, so the last `(t,
//! sample)` pair is kept and returned while `t` repeats. The cache never
//! changes what `sample` returns.

use crate::expr::{self, Expr, ExprError, Value};

/// One independent expression instance.
#[derive(Debug)]
pub struct Interpreter {
    expr: Box<Expr>,
    source: Option<String>,
    cache: Option<(i32, f32)>,
    caching: bool,
}

impl Interpreter {
    /// An interpreter that plays silence until an expression is accepted.
    pub fn new() -> Self {
        Self {
            expr: Box::new(Expr::Undefined),
            source: None,
            cache: None,
            caching: true,
        }
    }

    /// An interpreter that evaluates the tree on every call.
    pub fn without_cache() -> Self {
        Self {
            caching: false,
            ..Self::new()
        }
    }

    /// Parse `source` and make it the active expression.
    ///
    /// On failure the previously accepted expression stays active.
    pub fn set_source(&mut self, source: &str) -> Result<(), ExprError> {
        let expr = expr::parse(source)?;
        self.install(Box::new(expr));
        self.source = Some(source.to_string());
        Ok(())
    }

    /// Swap in an already parsed tree and return the previous one.
    ///
    /// Used on the audio thread, where parsing and dropping trees must not
    /// happen; the caller hands the returned tree elsewhere to be freed.
    pub fn install(&mut self, expr: Box<Expr>) -> Box<Expr> {
        self.cache = None;
        self.source = None;
        std::mem::replace(&mut self.expr, expr)
    }

    /// Evaluate the active expression at `t`, bypassing the cache.
    pub fn evaluate(&self, t: i32) -> Value<'_> {
        self.expr.evaluate(t)
    }

    /// The audio sample for `t`, in `[-1.0, 1.0]`.
    pub fn sample(&mut self, t: i32) -> f32 {
        if let Some((last_t, last_sample)) = self.cache {
            if last_t == t {
                return last_sample;
            }
        }

        let sample = sample_from_value(&self.expr.evaluate(t));
        if self.caching {
            self.cache = Some((t, sample));
        }
        sample
    }

    /// The active expression tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Source text of the active expression, when it was set through
    /// [`set_source`](Self::set_source).
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// The output byte for a value: the low 8 bits of an integer result.
pub fn byte_from_value(value: &Value<'_>) -> Option<u8> {
    value.as_int().map(|i| i as u8)
}

/// Map a value to an audio sample. Non-integer results are silence.
pub fn sample_from_value(value: &Value<'_>) -> f32 {
    match byte_from_value(value) {
        Some(byte) => 2.0 * (byte as f32 / 255.0) - 1.0,
        None => 0.0,
    }
}
