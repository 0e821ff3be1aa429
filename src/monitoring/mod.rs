// src/monitoring/mod.rs
//! Patient monitor: sensors, alarms and clinical events
//!
//! Driven from the session tick with the time since session start. Sensors
//! refresh on a fixed interval and alarms are re-evaluated after every
//! refresh; clinical events fire first after a short delay and then on the
//! (much longer) event interval.

pub mod alarms;
pub mod events;
pub mod readout;
pub mod sensors;

pub use alarms::{Alarm, AlarmKind, AlarmLimitField, AlarmLimits, AlarmSeverity};
pub use events::{ClinicalEvent, EventLog, LogEntry};
pub use readout::Readout;
pub use sensors::SensorReadings;

use crate::acquisition::SampleHistory;
use crate::config::constants::monitoring::*;
use crate::config::constants::scheduler::MILLISECONDS_PER_SECOND;
use crate::utils::validation::{validate_range, ValidationResult};
use crate::ventilator::{Command, VentilatorSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::sensor_interval_ms")]
    pub sensor_interval_ms: u64,

    #[serde(default = "defaults::event_interval_secs")]
    pub event_interval_secs: u64,

    #[serde(default = "defaults::first_event_delay_secs")]
    pub first_event_delay_secs: u64,

    #[serde(default = "defaults::event_log_capacity")]
    pub event_log_capacity: usize,

    /// Apply setting changes in response to clinical events
    #[serde(default = "defaults::auto_adjust")]
    pub auto_adjust: bool,

    /// Fixed RNG seed for reproducible runs; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub alarm_limits: AlarmLimits,
}

mod defaults {
    use crate::config::constants::monitoring::*;

    pub fn enabled() -> bool { true }
    pub fn sensor_interval_ms() -> u64 { DEFAULT_SENSOR_INTERVAL_MS }
    pub fn event_interval_secs() -> u64 { DEFAULT_EVENT_INTERVAL_SECS }
    pub fn first_event_delay_secs() -> u64 { DEFAULT_FIRST_EVENT_DELAY_SECS }
    pub fn event_log_capacity() -> usize { DEFAULT_EVENT_LOG_CAPACITY }
    pub fn auto_adjust() -> bool { true }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            sensor_interval_ms: defaults::sensor_interval_ms(),
            event_interval_secs: defaults::event_interval_secs(),
            first_event_delay_secs: defaults::first_event_delay_secs(),
            event_log_capacity: defaults::event_log_capacity(),
            auto_adjust: defaults::auto_adjust(),
            seed: None,
            alarm_limits: AlarmLimits::default(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "monitoring.sensor_interval_ms",
            self.sensor_interval_ms as f64,
            1.0,
            f64::MAX,
        )?;
        validate_range(
            "monitoring.event_interval_secs",
            self.event_interval_secs as f64,
            1.0,
            f64::MAX,
        )?;
        validate_range(
            "monitoring.event_log_capacity",
            self.event_log_capacity as f64,
            1.0,
            f64::MAX,
        )?;
        self.alarm_limits.validate()
    }

    fn sensor_interval_secs(&self) -> f64 {
        self.sensor_interval_ms as f64 / MILLISECONDS_PER_SECOND
    }
}

/// What one monitor update did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorUpdate {
    pub sensors_refreshed: bool,
    /// Alarms that were not active before this update
    pub raised: Vec<AlarmKind>,
    pub event: Option<ClinicalEvent>,
    /// Setting change to route through the session's command path
    pub adjustment: Option<Command>,
}

pub struct PatientMonitor {
    config: MonitorConfig,
    limits: AlarmLimits,
    auto_adjust: bool,
    readings: SensorReadings,
    alarms: Vec<Alarm>,
    log: EventLog,
    rng: StdRng,
    next_sensor_at: f64,
    next_event_at: f64,
}

impl PatientMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: MonitorConfig, rng: StdRng) -> Self {
        Self {
            limits: config.alarm_limits.clone(),
            auto_adjust: config.auto_adjust,
            readings: SensorReadings::default(),
            alarms: Vec::new(),
            log: EventLog::new(config.event_log_capacity),
            rng,
            next_sensor_at: 0.0,
            next_event_at: config.first_event_delay_secs as f64,
            config,
        }
    }

    /// Run whatever is due at `elapsed_secs` (time since session start)
    pub fn update(
        &mut self,
        elapsed_secs: f64,
        settings: &VentilatorSettings,
        history: &SampleHistory,
    ) -> MonitorUpdate {
        let mut update = MonitorUpdate::default();
        if !self.config.enabled {
            return update;
        }

        if elapsed_secs >= self.next_sensor_at {
            self.readings
                .refresh(&mut self.rng, settings, history.latest());
            update.sensors_refreshed = true;
            update.raised = self.evaluate_alarms(settings, history);
            self.next_sensor_at = elapsed_secs + self.config.sensor_interval_secs();
        }

        if elapsed_secs >= self.next_event_at {
            let event = ClinicalEvent::choose(&mut self.rng);
            update.event = Some(event);
            update.adjustment = self.trigger_event(event, elapsed_secs, settings);
            self.next_event_at = elapsed_secs + self.config.event_interval_secs as f64;
        }

        update
    }

    /// Apply `event` now, returning the automatic adjustment if enabled
    pub fn trigger_event(
        &mut self,
        event: ClinicalEvent,
        elapsed_secs: f64,
        settings: &VentilatorSettings,
    ) -> Option<Command> {
        let message = event.apply(&mut self.rng, &mut self.readings);
        info!(event = %event, elapsed = elapsed_secs, "{message}");
        self.log.record(elapsed_secs, message);

        if !self.auto_adjust {
            return None;
        }

        let adjustment = event.auto_adjustment(settings, &self.readings)?;
        info!(command = %adjustment, "automatic adjustment");
        self.log
            .record(elapsed_secs, format!("Automatic adjustment: {adjustment}"));
        Some(adjustment)
    }

    fn evaluate_alarms(
        &mut self,
        settings: &VentilatorSettings,
        history: &SampleHistory,
    ) -> Vec<AlarmKind> {
        let pressures: Vec<f64> = history
            .recent(ALARM_PRESSURE_LOOKBACK_SAMPLES)
            .map(|s| s.pressure)
            .collect();
        let current = alarms::evaluate(&self.limits, &self.readings, settings, &pressures);

        let mut raised = Vec::new();
        for alarm in &current {
            if !self.alarms.iter().any(|a| a.kind == alarm.kind) {
                warn!(severity = ?alarm.severity(), "alarm raised: {alarm}");
                raised.push(alarm.kind);
            }
        }
        for alarm in &self.alarms {
            if !current.iter().any(|a| a.kind == alarm.kind) {
                info!("alarm cleared: {}", alarm.kind.label());
            }
        }

        self.alarms = current;
        raised
    }

    pub fn set_auto_adjust(&mut self, enabled: bool, elapsed_secs: f64) {
        self.auto_adjust = enabled;
        let state = if enabled { "ENABLED" } else { "DISABLED" };
        info!(enabled, "automatic adjustments toggled");
        self.log
            .record(elapsed_secs, format!("Automatic adjustments {state}"));
    }

    /// Change one alarm threshold; the pair of pressure limits must stay ordered
    pub fn set_alarm_limit(&mut self, field: AlarmLimitField, value: f64) -> ValidationResult<()> {
        let mut limits = self.limits.clone();
        limits.set(field, value)?;
        limits.validate()?;
        self.limits = limits;
        info!(limit = %field, value, "alarm limit changed");
        Ok(())
    }

    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    pub fn active_alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn limits(&self) -> &AlarmLimits {
        &self.limits
    }

    pub fn auto_adjust_enabled(&self) -> bool {
        self.auto_adjust
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
