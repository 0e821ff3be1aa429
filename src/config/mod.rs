// src/config/mod.rs
//! Simulator configuration: defaults, file layering and validation

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::acquisition::BufferConfig;
use crate::monitoring::MonitorConfig;
use crate::scheduler::tick_interval_ms;
use crate::utils::validation::{validate_range, ValidationError, ValidationResult};
use crate::ventilator::{PatientProfile, VentilationMode, VentilatorSettings};
use serde::{Deserialize, Serialize};

/// Complete simulator configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Named patient profile seeding the ventilator settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default)]
    pub ventilator: VentilatorSettings,

    #[serde(default)]
    pub display: BufferConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub monitoring: MonitorConfig,
}

/// Driver loop settings; the tick interval itself follows the rate
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Stop after this many seconds; run until quit when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_duration_secs: Option<f64>,

    /// Hand a frame to the renderer every N ticks
    #[serde(default = "defaults::render_every_n_ticks")]
    pub render_every_n_ticks: u32,
}

mod defaults {
    pub fn render_every_n_ticks() -> u32 { 1 }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            run_duration_secs: None,
            render_every_n_ticks: defaults::render_every_n_ticks(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(duration) = self.run_duration_secs {
            validate_range(
                "scheduler.run_duration_secs",
                duration,
                0.0,
                constants::scheduler::MAX_RUN_DURATION_SECS,
            )?;
        }
        validate_range(
            "scheduler.render_every_n_ticks",
            self.render_every_n_ticks as f64,
            1.0,
            u32::MAX as f64,
        )?;
        Ok(())
    }
}

impl SimulatorConfig {
    /// Ventilator settings after applying the profile, if any.
    ///
    /// A profile overrides rate, Vt, PEEP, PIP, I:E and lung mechanics; mode
    /// and the pressure-controlled parameters come from `[ventilator]`.
    pub fn initial_settings(&self) -> ValidationResult<VentilatorSettings> {
        let mut settings = self.ventilator.clone();
        if let Some(name) = &self.profile {
            let profile = PatientProfile::by_name(name)
                .ok_or_else(|| ValidationError::UnknownField(format!("profile '{name}'")))?;
            profile.apply_to(&mut settings);
        }
        Ok(settings)
    }

    /// Range checks for every section
    pub fn validate(&self) -> ValidationResult<()> {
        self.initial_settings()?.validate()?;
        self.display.validate()?;
        self.scheduler.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }

    /// Cross-section checks that ranges alone cannot catch
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let settings = match self.initial_settings() {
            Ok(settings) => settings,
            Err(e) => return Err(vec![e.to_string()]),
        };

        if settings.peak_pressure <= settings.peep {
            errors.push(format!(
                "Peak pressure ({} cmH2O) must exceed PEEP ({} cmH2O)",
                settings.peak_pressure, settings.peep
            ));
        }

        let span = self.history_span_secs(&settings);
        if span < self.display.window_size_secs {
            errors.push(format!(
                "History holds {:.1} s at {} rpm, shorter than the {} s display window",
                span, settings.respiratory_rate, self.display.window_size_secs
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Seconds of samples the history can hold at the initial tick rate
    fn history_span_secs(&self, settings: &VentilatorSettings) -> f64 {
        let interval_ms = tick_interval_ms(settings.respiratory_rate);
        self.display.capacity() as f64 * interval_ms as f64
            / constants::scheduler::MILLISECONDS_PER_SECOND
    }

    pub fn summary(&self) -> ConfigSummary {
        let settings = self
            .initial_settings()
            .unwrap_or_else(|_| self.ventilator.clone());

        ConfigSummary {
            profile: self.profile.clone(),
            mode: settings.mode,
            respiratory_rate: settings.respiratory_rate,
            tick_interval_ms: tick_interval_ms(settings.respiratory_rate),
            history_capacity: self.display.capacity(),
            window_size_secs: self.display.window_size_secs,
            monitoring_enabled: self.monitoring.enabled,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub profile: Option<String>,
    pub mode: VentilationMode,
    pub respiratory_rate: f64,
    pub tick_interval_ms: u64,
    pub history_capacity: usize,
    pub window_size_secs: f64,
    pub monitoring_enabled: bool,
}
