// src/ventilator/settings.rs
//! Ventilator settings record and the typed setter interface

use crate::config::constants::ventilator::*;
use crate::utils::validation::{validate_bounds, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Ventilation mode: which variable the ventilator controls each breath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VentilationMode {
    #[default]
    VolumeControlled,
    PressureControlled,
}

impl VentilationMode {
    /// Short clinical label shown on the monitor
    pub fn label(&self) -> &'static str {
        match self {
            VentilationMode::VolumeControlled => "VC-CMV",
            VentilationMode::PressureControlled => "PC-CMV",
        }
    }
}

impl fmt::Display for VentilationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VentilationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vc" | "vc-cmv" | "volume" | "volume_controlled" => Ok(VentilationMode::VolumeControlled),
            "pc" | "pc-cmv" | "pressure" | "pressure_controlled" => {
                Ok(VentilationMode::PressureControlled)
            }
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Tunable numeric settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    RespiratoryRate,
    TidalVolume,
    Peep,
    PeakPressure,
    IeRatio,
    PressureSupport,
    PlateauTime,
    Resistance,
    Compliance,
}

impl SettingField {
    pub const ALL: [SettingField; 9] = [
        SettingField::RespiratoryRate,
        SettingField::TidalVolume,
        SettingField::Peep,
        SettingField::PeakPressure,
        SettingField::IeRatio,
        SettingField::PressureSupport,
        SettingField::PlateauTime,
        SettingField::Resistance,
        SettingField::Compliance,
    ];

    /// Field name as used in config files
    pub fn name(&self) -> &'static str {
        match self {
            SettingField::RespiratoryRate => "respiratory_rate",
            SettingField::TidalVolume => "tidal_volume_ml",
            SettingField::Peep => "peep",
            SettingField::PeakPressure => "peak_pressure",
            SettingField::IeRatio => "ie_ratio",
            SettingField::PressureSupport => "pressure_support",
            SettingField::PlateauTime => "plateau_time",
            SettingField::Resistance => "resistance",
            SettingField::Compliance => "compliance",
        }
    }

    /// Inclusive control range
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            SettingField::RespiratoryRate => (MIN_RESPIRATORY_RATE, MAX_RESPIRATORY_RATE),
            SettingField::TidalVolume => (MIN_TIDAL_VOLUME_ML, MAX_TIDAL_VOLUME_ML),
            SettingField::Peep => (MIN_PEEP_CMH2O, MAX_PEEP_CMH2O),
            SettingField::PeakPressure => (MIN_PEAK_PRESSURE_CMH2O, MAX_PEAK_PRESSURE_CMH2O),
            SettingField::IeRatio => (MIN_IE_RATIO, MAX_IE_RATIO),
            SettingField::PressureSupport => {
                (MIN_PRESSURE_SUPPORT_CMH2O, MAX_PRESSURE_SUPPORT_CMH2O)
            }
            SettingField::PlateauTime => (MIN_PLATEAU_TIME_S, MAX_PLATEAU_TIME_S),
            SettingField::Resistance => (MIN_RESISTANCE, MAX_RESISTANCE),
            SettingField::Compliance => (MIN_COMPLIANCE, MAX_COMPLIANCE),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SettingField::RespiratoryRate => "rpm",
            SettingField::TidalVolume => "mL",
            SettingField::Peep | SettingField::PeakPressure | SettingField::PressureSupport => {
                "cmH2O"
            }
            SettingField::IeRatio => "",
            SettingField::PlateauTime => "s",
            SettingField::Resistance => "cmH2O/L/s",
            SettingField::Compliance => "L/cmH2O",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_lowercase().as_str() {
            "respiratory_rate" | "rate" | "rr" | "fr" => SettingField::RespiratoryRate,
            "tidal_volume_ml" | "tidal_volume" | "vt" => SettingField::TidalVolume,
            "peep" => SettingField::Peep,
            "peak_pressure" | "pip" => SettingField::PeakPressure,
            "ie_ratio" | "ie" | "i:e" => SettingField::IeRatio,
            "pressure_support" | "support" | "ps" => SettingField::PressureSupport,
            "plateau_time" | "plateau" => SettingField::PlateauTime,
            "resistance" | "raw" => SettingField::Resistance,
            "compliance" => SettingField::Compliance,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// Complete ventilator settings, owned by the simulation session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VentilatorSettings {
    /// Breaths per minute
    #[serde(default = "defaults::respiratory_rate")]
    pub respiratory_rate: f64,

    /// mL per breath
    #[serde(default = "defaults::tidal_volume_ml")]
    pub tidal_volume_ml: f64,

    /// cmH2O
    #[serde(default = "defaults::peep")]
    pub peep: f64,

    /// cmH2O
    #[serde(default = "defaults::peak_pressure")]
    pub peak_pressure: f64,

    /// Inspiratory over expiratory duration
    #[serde(default = "defaults::ie_ratio")]
    pub ie_ratio: f64,

    #[serde(default)]
    pub mode: VentilationMode,

    /// cmH2O above PEEP, pressure-controlled only
    #[serde(default = "defaults::pressure_support")]
    pub pressure_support: f64,

    /// Seconds, pressure-controlled only
    #[serde(default = "defaults::plateau_time")]
    pub plateau_time: f64,

    /// cmH2O·s/L
    #[serde(default = "defaults::resistance")]
    pub resistance: f64,

    /// L/cmH2O
    #[serde(default = "defaults::compliance")]
    pub compliance: f64,
}

mod defaults {
    use crate::config::constants::ventilator::*;

    pub fn respiratory_rate() -> f64 { DEFAULT_RESPIRATORY_RATE }
    pub fn tidal_volume_ml() -> f64 { DEFAULT_TIDAL_VOLUME_ML }
    pub fn peep() -> f64 { DEFAULT_PEEP_CMH2O }
    pub fn peak_pressure() -> f64 { DEFAULT_PEAK_PRESSURE_CMH2O }
    pub fn ie_ratio() -> f64 { DEFAULT_IE_RATIO }
    pub fn pressure_support() -> f64 { DEFAULT_PRESSURE_SUPPORT_CMH2O }
    pub fn plateau_time() -> f64 { DEFAULT_PLATEAU_TIME_S }
    pub fn resistance() -> f64 { DEFAULT_RESISTANCE }
    pub fn compliance() -> f64 { DEFAULT_COMPLIANCE }
}

impl Default for VentilatorSettings {
    fn default() -> Self {
        Self {
            respiratory_rate: defaults::respiratory_rate(),
            tidal_volume_ml: defaults::tidal_volume_ml(),
            peep: defaults::peep(),
            peak_pressure: defaults::peak_pressure(),
            ie_ratio: defaults::ie_ratio(),
            mode: VentilationMode::default(),
            pressure_support: defaults::pressure_support(),
            plateau_time: defaults::plateau_time(),
            resistance: defaults::resistance(),
            compliance: defaults::compliance(),
        }
    }
}

impl VentilatorSettings {
    /// Current value of a numeric field
    pub fn get(&self, field: SettingField) -> f64 {
        match field {
            SettingField::RespiratoryRate => self.respiratory_rate,
            SettingField::TidalVolume => self.tidal_volume_ml,
            SettingField::Peep => self.peep,
            SettingField::PeakPressure => self.peak_pressure,
            SettingField::IeRatio => self.ie_ratio,
            SettingField::PressureSupport => self.pressure_support,
            SettingField::PlateauTime => self.plateau_time,
            SettingField::Resistance => self.resistance,
            SettingField::Compliance => self.compliance,
        }
    }

    /// Validate and apply one setter call.
    ///
    /// Out-of-range values leave the settings untouched. The I:E ratio is
    /// rounded to one decimal, and a new pressure support level also moves
    /// the peak pressure to `peep + support`.
    pub fn apply_setting(&mut self, field: SettingField, value: f64) -> ValidationResult<()> {
        let value = validate_bounds(field.name(), value, field.bounds())?;

        match field {
            SettingField::RespiratoryRate => self.respiratory_rate = value,
            SettingField::TidalVolume => self.tidal_volume_ml = value,
            SettingField::Peep => self.peep = value,
            SettingField::PeakPressure => self.peak_pressure = value,
            SettingField::IeRatio => self.ie_ratio = (value * 10.0).round() / 10.0,
            SettingField::PressureSupport => {
                self.pressure_support = value;
                self.peak_pressure = self.peep + value;
            }
            SettingField::PlateauTime => self.plateau_time = value,
            SettingField::Resistance => self.resistance = value,
            SettingField::Compliance => self.compliance = value,
        }

        debug!(field = field.name(), value = self.get(field), "ventilator setting applied");
        Ok(())
    }

    /// Check every field against its control range.
    ///
    /// Peak pressure is checked against `max(PIP range, peep + support)`
    /// because pressure support is allowed to drive it past the dial range.
    pub fn validate(&self) -> ValidationResult<()> {
        for field in SettingField::ALL {
            let (min, mut max) = field.bounds();
            if field == SettingField::PeakPressure {
                max = max.max(self.peep + self.pressure_support);
            }
            validate_bounds(field.name(), self.get(field), (min, max))?;
        }
        Ok(())
    }
}
