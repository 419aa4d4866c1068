//! Audio callback — runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, evaluates the active expression
//! once per output frame and writes the sample to every channel. Replaced
//! expression trees are handed back to the control thread through a second
//! ring buffer so they are freed there.

use ringbuf::traits::{Consumer, Producer};
use ringbuf::{HeapCons, HeapProd};

use super::clock::Clock;
use super::command::AudioCommand;
use crate::expr::Expr;
use crate::interpreter::Interpreter;

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    retired: HeapProd<Box<Expr>>,
    interpreter: Interpreter,
    clock: Clock,
    volume: f32,
    channels: u16,
}

impl AudioCallback {
    /// Create a new audio callback with the given ring buffer ends.
    pub fn new(
        consumer: HeapCons<AudioCommand>,
        retired: HeapProd<Box<Expr>>,
        clock: Clock,
        channels: u16,
    ) -> Self {
        Self {
            consumer,
            retired,
            interpreter: Interpreter::new(),
            clock,
            volume: 1.0,
            channels: channels.max(1),
        }
    }

    /// Called by cpal for each buffer. Fills interleaved `output`.
    pub fn process(&mut self, output: &mut [f32]) {
        // 1. Drain all pending commands from the ring buffer.
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::SetExpression(expr) => {
                    let old = self.interpreter.install(expr);
                    // Retired queue full: free here rather than stall.
                    if let Err(old) = self.retired.try_push(old) {
                        drop(old);
                    }
                }
                AudioCommand::SetVolume(v) if v.is_finite() => {
                    self.volume = v.clamp(0.0, 1.0);
                }
                AudioCommand::SetVolume(_) => {}
                AudioCommand::SetRate(rate) => {
                    self.clock.set_rate(rate);
                }
                AudioCommand::ResetTime => {
                    self.clock.reset();
                }
            }
        }

        // 2. One evaluation per frame, copied to every channel.
        for frame in output.chunks_mut(self.channels as usize) {
            let t = self.clock.next_t();
            let sample = self.interpreter.sample(t) * self.volume;
            frame.fill(sample);
        }
    }

    /// `t` of the next frame to be rendered.
    pub fn t(&self) -> i32 {
        self.clock.t()
    }
}
