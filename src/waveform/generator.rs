//! Ventilator waveform generation
//! Location: src/waveform/generator.rs

use super::timing::CycleTiming;
use super::types::{BreathPhase, Sample, WaveformPoint};
use super::{pressure_control, volume_control};
use crate::ventilator::{VentilationMode, VentilatorSettings};
use thiserror::Error;

/// Generator errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaveformError {
    /// A malformed parameter combination produced NaN or infinity
    #[error(
        "{mode} produced a non-finite sample at t={time}s \
         (pressure={pressure}, flow={flow}, volume={volume})"
    )]
    NonFiniteSample {
        mode: VentilationMode,
        time: f64,
        pressure: f64,
        flow: f64,
        volume: f64,
    },
}

/// Curves and phase for `elapsed_time`, without the finiteness check
pub fn evaluate(settings: &VentilatorSettings, elapsed_time: f64) -> WaveformPoint {
    let timing = CycleTiming::new(settings, elapsed_time);
    match settings.mode {
        VentilationMode::VolumeControlled => volume_control::evaluate(settings, &timing),
        VentilationMode::PressureControlled => pressure_control::evaluate(settings, &timing),
    }
}

/// Generate the sample for `elapsed_time` seconds under `settings`.
///
/// Deterministic in its inputs. Non-finite results are returned as
/// [`WaveformError::NonFiniteSample`] instead of being passed on.
pub fn generate(settings: &VentilatorSettings, elapsed_time: f64) -> Result<Sample, WaveformError> {
    generate_with_phase(settings, elapsed_time).map(|(sample, _)| sample)
}

/// Like [`generate`], also reporting the breath phase
pub fn generate_with_phase(
    settings: &VentilatorSettings,
    elapsed_time: f64,
) -> Result<(Sample, BreathPhase), WaveformError> {
    let point = evaluate(settings, elapsed_time);
    let sample = point.at(elapsed_time);

    if !sample.is_finite() {
        return Err(WaveformError::NonFiniteSample {
            mode: settings.mode,
            time: elapsed_time,
            pressure: sample.pressure,
            flow: sample.flow,
            volume: sample.volume,
        });
    }

    Ok((sample, point.phase))
}
