//! Volume-controlled (VC-CMV) breath model
//! Location: src/waveform/volume_control.rs

use super::timing::CycleTiming;
use super::types::{BreathPhase, WaveformPoint};
use crate::config::constants::waveform::*;
use crate::ventilator::VentilatorSettings;
use std::f64::consts::PI;

/// Evaluate the volume-controlled curves at one cycle position
pub fn evaluate(settings: &VentilatorSettings, timing: &CycleTiming) -> WaveformPoint {
    if timing.is_inspiration() {
        inspiration(settings, timing)
    } else {
        expiration(settings, timing)
    }
}

/// Decelerating flow from the initial to the final target over `Ti`
fn inspiratory_flow(time_in_cycle: f64, inspiratory_time: f64) -> f64 {
    let k = -(VC_FINAL_FLOW_LPM / VC_INITIAL_FLOW_LPM).ln() / inspiratory_time;
    VC_INITIAL_FLOW_LPM * (-k * time_in_cycle).exp()
}

fn inspiration(settings: &VentilatorSettings, timing: &CycleTiming) -> WaveformPoint {
    let x = timing.inspiratory_phase();

    let flow = inspiratory_flow(timing.time_in_cycle, timing.inspiratory_time);
    let volume = settings.tidal_volume_ml * 0.5 * (1.0 - (PI * x).cos());
    let pressure = settings.peep
        + (settings.peak_pressure - settings.peep) * (1.0 - (-VC_PRESSURE_RISE_RATE * x).exp());

    WaveformPoint {
        pressure,
        flow,
        volume,
        phase: BreathPhase::Inspiration,
    }
}

fn expiration(settings: &VentilatorSettings, timing: &CycleTiming) -> WaveformPoint {
    let x = timing.expiratory_phase();

    let flow = -VC_PEAK_EXPIRATORY_FLOW_LPM * (-VC_EXPIRATORY_FLOW_DECAY * x).exp();
    let volume = settings.tidal_volume_ml * (-VC_EXPIRATORY_VOLUME_DECAY * x).exp();

    // Keeps a visible trace when PEEP is near zero
    let pressure = if settings.peep <= LOW_PEEP_THRESHOLD {
        settings.peep + LOW_PEEP_DISPLAY_OFFSET
    } else {
        settings.peep
    };

    WaveformPoint {
        pressure,
        flow,
        volume,
        phase: BreathPhase::Expiration,
    }
}
