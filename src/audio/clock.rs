//! Time counter — maps output frames to the expression's `t`.
//!
//! Bytebeat expressions are written against a slow clock (classically
//! 8000 ticks per second) while the device runs at 44.1/48 kHz. `t` is held
//! across the output frames that fall inside one tick.

/// Classic bytebeat rate in ticks per second.
pub const DEFAULT_RATE: u32 = 8000;

#[derive(Debug, Clone)]
pub struct Clock {
    rate: u32,
    sample_rate: u32,
    /// `t` at the last rate change or reset.
    base_t: i64,
    /// Frames rendered since `base_t`.
    frames: u64,
}

impl Clock {
    pub fn new(rate: u32, sample_rate: u32) -> Self {
        Self {
            rate: rate.max(1),
            sample_rate: sample_rate.max(1),
            base_t: 0,
            frames: 0,
        }
    }

    /// `t` for the current frame. Wraps around like the 32-bit counter it is.
    pub fn t(&self) -> i32 {
        let elapsed =
            u128::from(self.frames) * u128::from(self.rate) / u128::from(self.sample_rate);
        self.base_t.wrapping_add(elapsed as i64) as i32
    }

    /// `t` for the current frame, then advance one frame.
    pub fn next_t(&mut self) -> i32 {
        let t = self.t();
        self.frames += 1;
        t
    }

    /// Change the tick rate without a jump in `t`.
    pub fn set_rate(&mut self, rate: u32) {
        self.base_t = i64::from(self.t());
        self.frames = 0;
        self.rate = rate.max(1);
    }

    /// Restart from `t = 0`.
    pub fn reset(&mut self) {
        self.base_t = 0;
        self.frames = 0;
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
