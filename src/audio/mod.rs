//! Audio engine — cpal output stream driven by the expression interpreter.
//!
//! The engine owns the cpal output stream and talks to it through lock-free
//! ring buffers. The control thread parses new expressions and sends the
//! finished trees as [`AudioCommand`]s; the audio thread swaps them in
//! between buffers and sends the replaced trees back to be dropped here.

pub mod callback;
pub mod clock;
pub mod command;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use thiserror::Error;
use tracing::{debug, error, info};

pub use clock::{Clock, DEFAULT_RATE};
pub use command::AudioCommand;

use crate::expr::Expr;
use callback::AudioCallback;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 256;

/// Capacity of the queue carrying replaced trees back from the audio thread.
const RETIRED_CAPACITY: usize = 64;

/// Audio engine errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio output device found.
    #[error("no audio output device found")]
    NoOutputDevice,
    /// Failed to query device configuration.
    #[error("device config error: {0}")]
    DeviceConfig(String),
    /// Failed to build the audio stream.
    #[error("stream build error: {0}")]
    StreamBuild(String),
    /// Failed to start or pause the audio stream.
    #[error("stream play error: {0}")]
    StreamPlay(String),
    /// Ring buffer is full; the audio thread is not draining fast enough.
    #[error("audio command ring buffer is full")]
    BufferFull,
}

/// The audio engine. Owns the cpal stream and the control ends of the ring
/// buffers.
pub struct AudioEngine {
    stream: cpal::Stream,
    producer: HeapProd<AudioCommand>,
    retired: HeapCons<Box<Expr>>,
    sample_rate: u32,
    channels: u16,
}

impl AudioEngine {
    /// Create and start the audio engine with the default output device.
    ///
    /// `rate` is the expression clock in ticks per second.
    pub fn new(rate: u32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        Self::build_with_device(&device, sample_rate, channels, rate)
    }

    /// Create the audio engine with a specific sample rate and channel count.
    ///
    /// Uses the default output device but overrides its configuration.
    pub fn with_config(sample_rate: u32, channels: u16, rate: u32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        Self::build_with_device(&device, sample_rate, channels, rate)
    }

    /// Internal builder: sets up ring buffers, callback, and stream.
    fn build_with_device(
        device: &cpal::Device,
        sample_rate: u32,
        channels: u16,
        rate: u32,
    ) -> Result<Self, AudioError> {
        let (producer, consumer) = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY).split();
        let (retired_producer, retired) = HeapRb::<Box<Expr>>::new(RETIRED_CAPACITY).split();

        let clock = Clock::new(rate, sample_rate);
        let mut audio_callback = AudioCallback::new(consumer, retired_producer, clock, channels);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err: cpal::StreamError| {
            error!("audio stream error: {err}");
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        info!(sample_rate, channels, rate, "audio stream started");

        Ok(Self {
            stream,
            producer,
            retired,
            sample_rate,
            channels,
        })
    }

    /// Hand a parsed expression to the audio thread.
    pub fn set_expression(&mut self, expr: Expr) -> Result<(), AudioError> {
        self.collect_retired();
        let nodes = expr.node_count();
        self.push(AudioCommand::SetExpression(Box::new(expr)))?;
        debug!(nodes, "expression sent to audio thread");
        Ok(())
    }

    /// Set master volume (clamped to 0.0..=1.0 on the audio thread).
    pub fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.push(AudioCommand::SetVolume(volume))
    }

    /// Set the expression clock in ticks per second.
    pub fn set_rate(&mut self, rate: u32) -> Result<(), AudioError> {
        self.push(AudioCommand::SetRate(rate))
    }

    /// Restart the expression clock at `t = 0`.
    pub fn reset_time(&mut self) -> Result<(), AudioError> {
        self.push(AudioCommand::ResetTime)
    }

    /// Drop the trees the audio thread has replaced. Returns how many.
    pub fn collect_retired(&mut self) -> usize {
        let mut count = 0;
        while let Some(old) = self.retired.try_pop() {
            drop(old);
            count += 1;
        }
        count
    }

    fn push(&mut self, cmd: AudioCommand) -> Result<(), AudioError> {
        self.producer
            .try_push(cmd)
            .map_err(|_| AudioError::BufferFull)
    }

    /// Get the sample rate of the audio stream.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of output channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Pause the audio stream.
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))
    }

    /// Resume the audio stream.
    pub fn play(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))
    }
}
