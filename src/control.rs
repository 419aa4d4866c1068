//! Control channel — mpsc-based bridge from OSC (and other controllers) to
//! the thread that owns the audio engine.

use std::sync::mpsc;

/// Requests from external controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Replace the playing expression with this source text.
    SetExpression(String),
    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),
    /// Set the expression clock in ticks per second.
    SetRate(u32),
    /// Restart the expression clock at `t = 0`.
    ResetTime,
}

/// Sender half. Clone this for listener threads.
pub type ControlSender = mpsc::Sender<ControlEvent>;

/// Receiver half, held by the playback loop.
pub struct ControlReceiver {
    rx: mpsc::Receiver<ControlEvent>,
}

impl ControlReceiver {
    /// Non-blocking poll for the next event.
    pub fn poll(&self) -> Option<ControlEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create a new control channel pair.
pub fn control_channel() -> (ControlSender, ControlReceiver) {
    let (tx, rx) = mpsc::channel();
    (tx, ControlReceiver { rx })
}
