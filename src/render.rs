//! Offline rendering — raw byte streams and WAV files.
//!
//! Raw output is the traditional way to listen to bytebeat:
//! `bytebeat raw 't*(t>>5|t>>8)' | aplay` (8 kHz unsigned 8-bit mono).

use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::audio::Clock;
use crate::expr::Expr;
use crate::interpreter::{byte_from_value, Interpreter};

/// Byte written for a non-integer result: the midpoint of the unsigned
/// 8-bit range, i.e. silence.
pub const SILENT_BYTE: u8 = 128;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Render `frames` output samples, advancing `clock` once per frame.
pub fn render_samples(interpreter: &mut Interpreter, clock: &mut Clock, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|_| interpreter.sample(clock.next_t()))
        .collect()
}

/// Write one unsigned byte per `t`, starting at `start`.
///
/// With `count` of `None` this runs until the writer fails; a closed pipe
/// (the reader went away) ends the stream without an error. Returns the
/// number of bytes written.
pub fn write_raw<W: Write>(
    expr: &Expr,
    start: i32,
    count: Option<u64>,
    writer: W,
) -> Result<u64, RenderError> {
    const CHUNK: usize = 4096;

    let mut writer = BufWriter::new(writer);
    let mut chunk = [0u8; CHUNK];
    let mut t = start;
    let mut written = 0u64;

    loop {
        let remaining = count.map_or(CHUNK as u64, |c| (c - written).min(CHUNK as u64)) as usize;
        if remaining == 0 {
            break;
        }
        for byte in chunk.iter_mut().take(remaining) {
            *byte = byte_from_value(&expr.evaluate(t)).unwrap_or(SILENT_BYTE);
            t = t.wrapping_add(1);
        }
        match writer.write_all(&chunk[..remaining]) {
            Ok(()) => written += remaining as u64,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(written),
            Err(e) => return Err(e.into()),
        }
    }

    match writer.flush() {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e.into()),
        _ => Ok(written),
    }
}

/// Write `seconds` of the interpreter's output as a mono 16-bit WAV file
/// at the expression rate, one sample per `t` starting from 0.
pub fn write_wav(
    path: &Path,
    interpreter: &mut Interpreter,
    seconds: f64,
    rate: u32,
) -> Result<u64, RenderError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let mut clock = Clock::new(rate, rate);
    let frames = (seconds.max(0.0) * f64::from(rate)) as u64;
    for _ in 0..frames {
        let sample = interpreter.sample(clock.next_t());
        writer.write_sample((sample * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;

    Ok(frames)
}
