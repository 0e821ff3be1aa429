// src/waveform/types.rs
//! Core types produced by the waveform generator

use serde::{Deserialize, Serialize};
use std::fmt;

/// One generated instant of the three ventilator curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since session (or mode) start
    pub time: f64,
    /// cmH2O
    pub pressure: f64,
    /// L/min, positive is inspiratory
    pub flow: f64,
    /// mL
    pub volume: f64,
}

impl Sample {
    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.pressure.is_finite()
            && self.flow.is_finite()
            && self.volume.is_finite()
    }
}

/// Breath phase an instant falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreathPhase {
    /// Volume-controlled inspiration, or the pressure-controlled ramp
    Inspiration,
    Plateau,
    Release,
    Expiration,
}

impl fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BreathPhase::Inspiration => "inspiration",
            BreathPhase::Plateau => "plateau",
            BreathPhase::Release => "release",
            BreathPhase::Expiration => "expiration",
        };
        f.write_str(name)
    }
}

/// Curve values before they are stamped with a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformPoint {
    pub pressure: f64,
    pub flow: f64,
    pub volume: f64,
    pub phase: BreathPhase,
}

impl WaveformPoint {
    pub fn at(self, time: f64) -> Sample {
        Sample {
            time,
            pressure: self.pressure,
            flow: self.flow,
            volume: self.volume,
        }
    }
}
