// src/monitoring/readout.rs
//! Parameter readout shown beside the waveforms

use crate::ventilator::VentilatorSettings;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub mode: &'static str,
    pub peak_pressure: f64,
    pub peep: f64,
    pub tidal_volume_ml: f64,
    pub respiratory_rate: f64,
    pub ie_ratio: f64,
}

impl Readout {
    pub fn from_settings(settings: &VentilatorSettings) -> Self {
        Self {
            mode: settings.mode.label(),
            peak_pressure: settings.peak_pressure,
            peep: settings.peep,
            tidal_volume_ml: settings.tidal_volume_ml,
            respiratory_rate: settings.respiratory_rate,
            ie_ratio: settings.ie_ratio,
        }
    }

    /// I:E as the clinical `1:<ratio>` label
    pub fn ie_label(&self) -> String {
        format!("1:{:.1}", self.ie_ratio)
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | PIP {:.0} cmH2O | PEEP {:.0} cmH2O | Vt {:.0} mL | RR {:.0} rpm | I:E {}",
            self.mode,
            self.peak_pressure,
            self.peep,
            self.tidal_volume_ml,
            self.respiratory_rate,
            self.ie_label()
        )
    }
}
