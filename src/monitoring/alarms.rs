// src/monitoring/alarms.rs
//! Alarm limits and evaluation

use super::sensors::SensorReadings;
use crate::config::constants::monitoring::*;
use crate::utils::validation::{validate_bounds, ValidationError, ValidationResult};
use crate::ventilator::VentilatorSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Adjustable alarm thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmLimitField {
    PipMax,
    PipMin,
    PeepMax,
    RateMax,
    TidalVolumeMax,
    Spo2Min,
}

impl AlarmLimitField {
    pub const ALL: [AlarmLimitField; 6] = [
        AlarmLimitField::PipMax,
        AlarmLimitField::PipMin,
        AlarmLimitField::PeepMax,
        AlarmLimitField::RateMax,
        AlarmLimitField::TidalVolumeMax,
        AlarmLimitField::Spo2Min,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlarmLimitField::PipMax => "pip_max",
            AlarmLimitField::PipMin => "pip_min",
            AlarmLimitField::PeepMax => "peep_max",
            AlarmLimitField::RateMax => "rate_max",
            AlarmLimitField::TidalVolumeMax => "tidal_volume_max",
            AlarmLimitField::Spo2Min => "spo2_min",
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        match self {
            AlarmLimitField::PipMax => PIP_MAX_RANGE,
            AlarmLimitField::PipMin => PIP_MIN_RANGE,
            AlarmLimitField::PeepMax => PEEP_MAX_RANGE,
            AlarmLimitField::RateMax => RATE_MAX_RANGE,
            AlarmLimitField::TidalVolumeMax => TIDAL_VOLUME_MAX_RANGE,
            AlarmLimitField::Spo2Min => SPO2_MIN_RANGE,
        }
    }
}

impl fmt::Display for AlarmLimitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlarmLimitField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_lowercase().as_str() {
            "pip_max" | "pipmax" => AlarmLimitField::PipMax,
            "pip_min" | "pipmin" => AlarmLimitField::PipMin,
            "peep_max" | "peepmax" => AlarmLimitField::PeepMax,
            "rate_max" | "rr_max" | "fr_max" => AlarmLimitField::RateMax,
            "tidal_volume_max" | "vt_max" => AlarmLimitField::TidalVolumeMax,
            "spo2_min" => AlarmLimitField::Spo2Min,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// Current alarm thresholds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AlarmLimits {
    #[serde(default = "defaults::pip_max")]
    pub pip_max: f64,
    #[serde(default = "defaults::pip_min")]
    pub pip_min: f64,
    #[serde(default = "defaults::peep_max")]
    pub peep_max: f64,
    #[serde(default = "defaults::rate_max")]
    pub rate_max: f64,
    #[serde(default = "defaults::tidal_volume_max")]
    pub tidal_volume_max: f64,
    #[serde(default = "defaults::spo2_min")]
    pub spo2_min: f64,
}

mod defaults {
    use crate::config::constants::monitoring::*;

    pub fn pip_max() -> f64 { DEFAULT_PIP_MAX }
    pub fn pip_min() -> f64 { DEFAULT_PIP_MIN }
    pub fn peep_max() -> f64 { DEFAULT_PEEP_MAX }
    pub fn rate_max() -> f64 { DEFAULT_RATE_MAX }
    pub fn tidal_volume_max() -> f64 { DEFAULT_TIDAL_VOLUME_MAX }
    pub fn spo2_min() -> f64 { DEFAULT_SPO2_MIN }
}

impl Default for AlarmLimits {
    fn default() -> Self {
        Self {
            pip_max: DEFAULT_PIP_MAX,
            pip_min: DEFAULT_PIP_MIN,
            peep_max: DEFAULT_PEEP_MAX,
            rate_max: DEFAULT_RATE_MAX,
            tidal_volume_max: DEFAULT_TIDAL_VOLUME_MAX,
            spo2_min: DEFAULT_SPO2_MIN,
        }
    }
}

impl AlarmLimits {
    pub fn get(&self, field: AlarmLimitField) -> f64 {
        match field {
            AlarmLimitField::PipMax => self.pip_max,
            AlarmLimitField::PipMin => self.pip_min,
            AlarmLimitField::PeepMax => self.peep_max,
            AlarmLimitField::RateMax => self.rate_max,
            AlarmLimitField::TidalVolumeMax => self.tidal_volume_max,
            AlarmLimitField::Spo2Min => self.spo2_min,
        }
    }

    /// Validate and store one threshold; rejected values change nothing
    pub fn set(&mut self, field: AlarmLimitField, value: f64) -> ValidationResult<()> {
        let value = validate_bounds(field.name(), value, field.bounds())?;
        let slot = match field {
            AlarmLimitField::PipMax => &mut self.pip_max,
            AlarmLimitField::PipMin => &mut self.pip_min,
            AlarmLimitField::PeepMax => &mut self.peep_max,
            AlarmLimitField::RateMax => &mut self.rate_max,
            AlarmLimitField::TidalVolumeMax => &mut self.tidal_volume_max,
            AlarmLimitField::Spo2Min => &mut self.spo2_min,
        };
        *slot = value;
        Ok(())
    }

    pub fn validate(&self) -> ValidationResult<()> {
        for field in AlarmLimitField::ALL {
            validate_bounds(field.name(), self.get(field), field.bounds())?;
        }
        if self.pip_min >= self.pip_max {
            return Err(ValidationError::ConstraintViolation {
                fields: vec!["pip_min".to_string(), "pip_max".to_string()],
                message: "low pressure limit must be below the high pressure limit".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AlarmSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlarmKind {
    HighPressure,
    LowPressure,
    Hypoxemia,
    HighVolume,
    Tachypnea,
    HighPeep,
}

impl AlarmKind {
    pub fn severity(&self) -> AlarmSeverity {
        match self {
            AlarmKind::HighPressure | AlarmKind::Hypoxemia => AlarmSeverity::Critical,
            AlarmKind::LowPressure
            | AlarmKind::HighVolume
            | AlarmKind::Tachypnea
            | AlarmKind::HighPeep => AlarmSeverity::Warning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlarmKind::HighPressure => "High pressure",
            AlarmKind::LowPressure => "Low pressure",
            AlarmKind::Hypoxemia => "Hypoxemia",
            AlarmKind::HighVolume => "High volume",
            AlarmKind::Tachypnea => "Tachypnea",
            AlarmKind::HighPeep => "High PEEP",
        }
    }
}

/// A raised alarm with the threshold it crossed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alarm {
    pub kind: AlarmKind,
    pub message: String,
}

impl Alarm {
    fn new(kind: AlarmKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn severity(&self) -> AlarmSeverity {
        self.kind.severity()
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

/// All alarms active for the given state.
///
/// `recent_pressures` is the pressure tail of the history (up to the last
/// [`ALARM_PRESSURE_LOOKBACK_SAMPLES`]); pressure alarms stay silent while
/// it is empty.
pub fn evaluate(
    limits: &AlarmLimits,
    readings: &SensorReadings,
    settings: &VentilatorSettings,
    recent_pressures: &[f64],
) -> Vec<Alarm> {
    let mut alarms = Vec::new();

    let max_pressure = recent_pressures.iter().copied().reduce(f64::max);
    let min_pressure = recent_pressures.iter().copied().reduce(f64::min);

    if max_pressure.is_some_and(|p| p > limits.pip_max) {
        alarms.push(Alarm::new(
            AlarmKind::HighPressure,
            format!("PIP > {} cmH2O", limits.pip_max),
        ));
    }
    if min_pressure.is_some_and(|p| p < limits.pip_min) {
        alarms.push(Alarm::new(
            AlarmKind::LowPressure,
            format!("PIP < {} cmH2O", limits.pip_min),
        ));
    }
    if f64::from(readings.spo2) < limits.spo2_min {
        alarms.push(Alarm::new(
            AlarmKind::Hypoxemia,
            format!("SpO2 < {}%", limits.spo2_min),
        ));
    }
    if readings.expired_volume > limits.tidal_volume_max {
        alarms.push(Alarm::new(
            AlarmKind::HighVolume,
            format!("Vt > {} mL", limits.tidal_volume_max),
        ));
    }
    if settings.respiratory_rate > limits.rate_max {
        alarms.push(Alarm::new(
            AlarmKind::Tachypnea,
            format!("RR > {} rpm", limits.rate_max),
        ));
    }
    if settings.peep > limits.peep_max {
        alarms.push(Alarm::new(
            AlarmKind::HighPeep,
            format!("PEEP > {} cmH2O", limits.peep_max),
        ));
    }

    alarms
}
