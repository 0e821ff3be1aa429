//! Pressure-controlled (PC-CMV) breath model
//! Location: src/waveform/pressure_control.rs
//!
//! Inspiration is split into ramp, plateau and release; expiration follows.
//! Each phase is a closed-form function of its own normalized position.

use super::timing::CycleTiming;
use super::types::{BreathPhase, WaveformPoint};
use crate::config::constants::waveform::*;
use crate::ventilator::VentilatorSettings;
use std::f64::consts::PI;

/// Phase boundaries inside inspiration, in seconds from breath start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureControlPhases {
    pub ramp_time: f64,
    /// Configured plateau clamped to half the inspiratory time
    pub plateau_time: f64,
    pub inspiratory_time: f64,
}

impl PressureControlPhases {
    pub fn new(settings: &VentilatorSettings, timing: &CycleTiming) -> Self {
        let inspiratory_time = timing.inspiratory_time;
        Self {
            ramp_time: PC_RAMP_FRACTION * inspiratory_time,
            plateau_time: settings
                .plateau_time
                .min(PC_MAX_PLATEAU_FRACTION * inspiratory_time),
            inspiratory_time,
        }
    }

    pub fn plateau_end(&self) -> f64 {
        self.ramp_time + self.plateau_time
    }

    pub fn release_time(&self) -> f64 {
        self.inspiratory_time - self.plateau_end()
    }

    pub fn phase_at(&self, time_in_cycle: f64) -> BreathPhase {
        if time_in_cycle < self.ramp_time {
            BreathPhase::Inspiration
        } else if time_in_cycle < self.plateau_end() {
            BreathPhase::Plateau
        } else if time_in_cycle < self.inspiratory_time {
            BreathPhase::Release
        } else {
            BreathPhase::Expiration
        }
    }
}

/// Inspiratory flow scale from driving pressure over airway resistance
pub fn peak_flow(settings: &VentilatorSettings) -> f64 {
    (settings.pressure_support / settings.resistance) * SECONDS_PER_MINUTE
}

/// Evaluate the pressure-controlled curves at one cycle position
pub fn evaluate(settings: &VentilatorSettings, timing: &CycleTiming) -> WaveformPoint {
    let phases = PressureControlPhases::new(settings, timing);
    let t = timing.time_in_cycle;
    let peak_flow = peak_flow(settings);
    let peep = settings.peep;
    let support = settings.pressure_support;
    let vt = settings.tidal_volume_ml;

    let phase = phases.phase_at(t);
    let (pressure, flow, volume) = match phase {
        BreathPhase::Inspiration => {
            let x = t / phases.ramp_time;
            (
                peep + support * (1.0 - (-PC_RAMP_PRESSURE_RISE * x).exp()),
                peak_flow * (1.0 - x * x),
                vt * 0.5 * (1.0 - (PI * x / 2.0).cos()),
            )
        }
        BreathPhase::Plateau => {
            let x = (t - phases.ramp_time) / phases.plateau_time;
            let span = PC_PLATEAU_END_VOLUME_FRACTION - PC_RAMP_END_VOLUME_FRACTION;
            (
                peep + support,
                PC_PLATEAU_FLOW_FRACTION * peak_flow,
                vt * (PC_RAMP_END_VOLUME_FRACTION + span * x),
            )
        }
        BreathPhase::Release => {
            let x = (t - phases.plateau_end()) / phases.release_time();
            let span = 1.0 - PC_PLATEAU_END_VOLUME_FRACTION;
            (
                peep + support * (-PC_RELEASE_PRESSURE_DECAY * x).exp(),
                PC_RELEASE_FLOW_FRACTION * peak_flow,
                vt * (PC_PLATEAU_END_VOLUME_FRACTION + span * (1.0 - x)),
            )
        }
        BreathPhase::Expiration => {
            let x = timing.expiratory_phase();
            (
                peep + (settings.peak_pressure - peep) * (-PC_EXPIRATORY_PRESSURE_DECAY * x).exp(),
                -PC_EXPIRATORY_FLOW_FRACTION * peak_flow * (-PC_EXPIRATORY_FLOW_DECAY * x).exp(),
                vt * (-PC_EXPIRATORY_VOLUME_DECAY * x).exp(),
            )
        }
    };

    WaveformPoint {
        pressure,
        flow,
        volume,
        phase,
    }
}
