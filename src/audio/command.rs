//! Commands sent from the control thread to the audio thread via ring buffer.

use crate::expr::Expr;

/// Commands sent from the control thread to the audio thread via ring buffer.
#[derive(Debug)]
pub enum AudioCommand {
    /// Replace the active expression. The tree is parsed before it is sent;
    /// the audio thread only swaps it in.
    SetExpression(Box<Expr>),

    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),

    /// Set the expression clock in ticks per second.
    SetRate(u32),

    /// Restart the expression clock at `t = 0`.
    ResetTime,
}
