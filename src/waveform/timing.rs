//! Breath cycle timing derived from rate and I:E ratio

use crate::config::constants::waveform::{MIN_EFFECTIVE_RATE, SECONDS_PER_MINUTE};
use crate::ventilator::VentilatorSettings;

/// Position of one instant inside its breath cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTiming {
    /// Full breath length in seconds
    pub total_time: f64,
    pub inspiratory_time: f64,
    pub expiratory_time: f64,
    /// Seconds since the current breath started
    pub time_in_cycle: f64,
    /// `time_in_cycle / total_time`, in [0, 1)
    pub cycle_progress: f64,
}

impl CycleTiming {
    pub fn new(settings: &VentilatorSettings, elapsed_time: f64) -> Self {
        let total_time = SECONDS_PER_MINUTE / settings.respiratory_rate.max(MIN_EFFECTIVE_RATE);
        let inspiratory_time = total_time / (1.0 + 1.0 / settings.ie_ratio);
        let expiratory_time = total_time / (1.0 + settings.ie_ratio);

        let time_in_cycle = elapsed_time.rem_euclid(total_time);

        Self {
            total_time,
            inspiratory_time,
            expiratory_time,
            time_in_cycle,
            cycle_progress: time_in_cycle / total_time,
        }
    }

    pub fn is_inspiration(&self) -> bool {
        self.time_in_cycle < self.inspiratory_time
    }

    /// Normalized position inside inspiration
    pub fn inspiratory_phase(&self) -> f64 {
        self.time_in_cycle / self.inspiratory_time
    }

    /// Normalized position inside expiration
    pub fn expiratory_phase(&self) -> f64 {
        (self.time_in_cycle - self.inspiratory_time) / self.expiratory_time
    }
}
