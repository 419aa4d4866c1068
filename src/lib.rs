//! bytebeat — a one-line expression language that turns a time counter into sound.

pub mod audio;
pub mod config;
pub mod control;
pub mod expr;
pub mod interpreter;
pub mod osc;
pub mod render;
