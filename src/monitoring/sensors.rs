// src/monitoring/sensors.rs
//! Simulated bedside sensor readings

use crate::config::constants::monitoring::*;
use crate::config::constants::ventilator::{
    MAX_COMPLIANCE, MAX_RESISTANCE, MIN_COMPLIANCE, MIN_RESISTANCE,
};
use crate::ventilator::VentilatorSettings;
use crate::waveform::Sample;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Latest sensor values, refreshed on the sensor interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReadings {
    /// L/min, never negative
    pub expired_flow: f64,
    /// mL, never negative
    pub expired_volume: f64,
    pub effective_compliance: f64,
    pub effective_resistance: f64,
    pub spo2: u8,
    pub heart_rate: u16,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            expired_flow: 0.0,
            expired_volume: 0.0,
            effective_compliance: crate::config::constants::ventilator::DEFAULT_COMPLIANCE,
            effective_resistance: crate::config::constants::ventilator::DEFAULT_RESISTANCE,
            spo2: INITIAL_SPO2_PERCENT,
            heart_rate: INITIAL_HEART_RATE_BPM,
        }
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..=high)
}

impl SensorReadings {
    /// Resample every reading.
    ///
    /// Flow and volume track the newest generated sample; they keep their
    /// previous value while the history is empty.
    pub fn refresh<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        settings: &VentilatorSettings,
        latest: Option<&Sample>,
    ) {
        if let Some(sample) = latest {
            self.expired_flow = (sample.flow * jitter(rng, EXPIRED_FLOW_JITTER)).max(0.0);
            self.expired_volume = (sample.volume * jitter(rng, EXPIRED_VOLUME_JITTER)).max(0.0);
        }

        self.effective_compliance = (settings.compliance * jitter(rng, COMPLIANCE_DRIFT))
            .clamp(MIN_COMPLIANCE, MAX_COMPLIANCE);
        self.effective_resistance = (settings.resistance * jitter(rng, RESISTANCE_DRIFT))
            .clamp(MIN_RESISTANCE, MAX_RESISTANCE);

        let spo2 = self.spo2 as i16 + rng.gen_range(-SPO2_STEP..=SPO2_STEP);
        self.spo2 = spo2.clamp(MIN_SPO2_PERCENT as i16, MAX_SPO2_PERCENT as i16) as u8;

        let heart_rate = self.heart_rate as i32 + rng.gen_range(-HEART_RATE_STEP..=HEART_RATE_STEP);
        self.heart_rate =
            heart_rate.clamp(MIN_HEART_RATE_BPM as i32, MAX_HEART_RATE_BPM as i32) as u16;
    }
}

impl fmt::Display for SensorReadings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exp. flow {:.1} L/min | Exp. vol {:.0} mL | C {:.3} L/cmH2O | R {:.1} cmH2O/L/s | SpO2 {}% | HR {} bpm",
            self.expired_flow,
            self.expired_volume,
            self.effective_compliance,
            self.effective_resistance,
            self.spo2,
            self.heart_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(flow: f64, volume: f64) -> Sample {
        Sample {
            time: 1.0,
            pressure: 10.0,
            flow,
            volume,
        }
    }

    #[test]
    fn test_refresh_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let settings = VentilatorSettings::default();
        let mut readings = SensorReadings::default();

        for _ in 0..500 {
            readings.refresh(&mut rng, &settings, Some(&sample(30.0, 400.0)));
            assert!((27.0..=33.0).contains(&readings.expired_flow));
            assert!((380.0..=420.0).contains(&readings.expired_volume));
            assert!((MIN_COMPLIANCE..=MAX_COMPLIANCE).contains(&readings.effective_compliance));
            assert!((MIN_RESISTANCE..=MAX_RESISTANCE).contains(&readings.effective_resistance));
            assert!((MIN_SPO2_PERCENT..=MAX_SPO2_PERCENT).contains(&readings.spo2));
            assert!((MIN_HEART_RATE_BPM..=MAX_HEART_RATE_BPM).contains(&readings.heart_rate));
        }
    }

    #[test]
    fn test_expiratory_flow_reads_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut readings = SensorReadings::default();
        readings.refresh(&mut rng, &VentilatorSettings::default(), Some(&sample(-40.0, 300.0)));
        assert_eq!(readings.expired_flow, 0.0);
    }

    #[test]
    fn test_empty_history_keeps_flow_and_volume() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut readings = SensorReadings {
            expired_flow: 12.0,
            expired_volume: 250.0,
            ..Default::default()
        };
        readings.refresh(&mut rng, &VentilatorSettings::default(), None);
        assert_eq!(readings.expired_flow, 12.0);
        assert_eq!(readings.expired_volume, 250.0);
    }

    #[test]
    fn test_effective_mechanics_clamped() {
        let mut rng = StdRng::seed_from_u64(11);
        let settings = VentilatorSettings {
            compliance: MAX_COMPLIANCE,
            resistance: MIN_RESISTANCE,
            ..Default::default()
        };
        let mut readings = SensorReadings::default();
        for _ in 0..100 {
            readings.refresh(&mut rng, &settings, None);
            assert!(readings.effective_compliance <= MAX_COMPLIANCE);
            assert!(readings.effective_resistance >= MIN_RESISTANCE);
        }
    }
}
