//! vent-sim: mechanical ventilator waveform simulator
//!
//! Generates pressure, flow and volume waveforms for volume-controlled and
//! pressure-controlled mandatory ventilation, keeps a bounded scrolling
//! history, and hands the visible window to a renderer once per tick.
//!
//! - Closed-form waveform generator for VC-CMV and PC-CMV
//! - Bounded sample history with a sliding display window
//! - Rate-driven tick scheduler
//! - Simulated patient monitor with alarms and clinical events
//! - Layered TOML configuration with environment overrides
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vent_sim::config::SimulatorConfig;
//! use vent_sim::session::SimulationSession;
//! use vent_sim::ventilator::{SettingField, VentilationMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = SimulationSession::new(&SimulatorConfig::default())?;
//!     session.start();
//!
//!     let tick = session.tick()?;
//!     println!("{:?} {:?}", tick.phase, tick.sample);
//!
//!     session.apply_setting(SettingField::Peep, 8.0)?;
//!     session.set_mode(VentilationMode::PressureControlled);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod utils;
pub mod ventilator;
pub mod waveform;

#[cfg(feature = "desktop")]
pub mod runtime;

// Re-export commonly used types for convenience
pub use error::{VentError, VentResult};
pub use session::{SimulationSession, Tick};
pub use ventilator::{Command, SettingField, VentilationMode, VentilatorSettings};
pub use waveform::{generate, BreathPhase, Sample};

pub use utils::{
    time::TimeProvider,
    validation::{ValidationError, ValidationResult},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Mechanical ventilator waveform simulator".to_string(),
        features: vec![
            "Volume- and pressure-controlled waveforms".to_string(),
            "Bounded scrolling history".to_string(),
            "Patient monitor with alarms".to_string(),
            "Layered TOML configuration".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "vent-sim");
    }
}
