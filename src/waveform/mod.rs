// src/waveform/mod.rs
//! Closed-form ventilator waveform model

pub mod types;
pub mod timing;
pub mod volume_control;
pub mod pressure_control;
pub mod generator;

pub use types::*;
pub use timing::CycleTiming;
pub use generator::{generate, generate_with_phase, WaveformError};
