// src/session.rs
//! Simulation session: owns the settings and drives one tick at a time
//!
//! One tick is generate, append, monitor, then pack the visible window.
//! Commands are applied between ticks by the same owner, so nothing here
//! needs locking.

use crate::acquisition::{BufferManager, BufferMetrics};
use crate::config::SimulatorConfig;
use crate::error::VentResult;
use crate::monitoring::{MonitorUpdate, PatientMonitor, Readout};
use crate::render::RenderFrame;
use crate::scheduler::TickScheduler;
use crate::utils::time::{MonotonicTimeProvider, SessionClock, TimeProvider};
use crate::utils::validation::ValidationError;
use crate::ventilator::{Command, SettingField, VentilationMode, VentilatorSettings};
use crate::waveform::{generate_with_phase, BreathPhase, Sample};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one successful tick
#[derive(Debug, Clone)]
pub struct Tick {
    pub sample: Sample,
    pub phase: BreathPhase,
    pub frame: RenderFrame,
    pub monitor: MonitorUpdate,
}

pub struct SimulationSession {
    settings: VentilatorSettings,
    buffers: BufferManager,
    scheduler: TickScheduler,
    monitor: PatientMonitor,
    time: Arc<dyn TimeProvider>,
    /// Waveform time origin; reset on mode switch
    waveform_clock: SessionClock,
    /// Session time origin for the monitor and event log
    session_clock: SessionClock,
    ticks: u64,
    failed_ticks: u64,
}

impl SimulationSession {
    /// Session on the wall clock
    pub fn new(config: &SimulatorConfig) -> VentResult<Self> {
        Self::with_time_provider(config, Arc::new(MonotonicTimeProvider::new()))
    }

    pub fn with_time_provider(
        config: &SimulatorConfig,
        time: Arc<dyn TimeProvider>,
    ) -> VentResult<Self> {
        Self::with_monitor(config, time, PatientMonitor::new(config.monitoring.clone()))
    }

    /// Session with a caller-built monitor (seeded RNG in tests)
    pub fn with_monitor(
        config: &SimulatorConfig,
        time: Arc<dyn TimeProvider>,
        monitor: PatientMonitor,
    ) -> VentResult<Self> {
        config.validate()?;
        let settings = config.initial_settings()?;
        let buffers = BufferManager::new(config.display.clone())?;
        let scheduler = TickScheduler::new(settings.respiratory_rate);

        info!(
            mode = %settings.mode,
            rate = settings.respiratory_rate,
            interval_ms = scheduler.interval_ms(),
            "simulation session created"
        );

        Ok(Self {
            settings,
            buffers,
            scheduler,
            monitor,
            time,
            waveform_clock: SessionClock::new(),
            session_clock: SessionClock::new(),
            ticks: 0,
            failed_ticks: 0,
        })
    }

    pub fn start(&mut self) {
        self.scheduler.start();
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Generate the sample for the current wall-clock time and update
    /// history, monitor and frame.
    ///
    /// A non-finite sample is returned as an error and leaves the history
    /// untouched.
    pub fn tick(&mut self) -> VentResult<Tick> {
        let now = self.time.now();
        let elapsed = self.waveform_clock.elapsed_secs(now);
        let session_elapsed = self.session_clock.elapsed_secs(now);

        let (sample, phase) = match generate_with_phase(&self.settings, elapsed) {
            Ok(generated) => generated,
            Err(e) => {
                self.failed_ticks += 1;
                warn!(error = %e, "dropping non-finite sample");
                return Err(e.into());
            }
        };

        if let Err(e) = self.buffers.append(sample) {
            self.failed_ticks += 1;
            return Err(e.into());
        }
        self.ticks += 1;

        let monitor = self
            .monitor
            .update(session_elapsed, &self.settings, self.buffers.history());
        if let Some(adjustment) = monitor.adjustment {
            if let Err(e) = self.apply(adjustment) {
                warn!(error = %e, command = %adjustment, "automatic adjustment rejected");
            }
        }

        Ok(Tick {
            sample,
            phase,
            frame: self.buffers.render_frame(),
            monitor,
        })
    }

    /// Apply one control command between ticks
    pub fn apply(&mut self, command: Command) -> VentResult<()> {
        match command {
            Command::Set { field, value } => self.apply_setting(field, value)?,
            Command::SetMode(mode) => self.set_mode(mode),
            Command::SetAlarmLimit { limit, value } => self.monitor.set_alarm_limit(limit, value)?,
            Command::SetAutoAdjust(enabled) => {
                let elapsed = self.session_elapsed_secs();
                self.monitor.set_auto_adjust(enabled, elapsed);
            }
            Command::Quit => self.stop(),
        }
        Ok(())
    }

    /// Validate and apply a numeric setting.
    ///
    /// Out-of-range values are rejected and the previous value is kept. A
    /// rate change restarts the tick scheduler with the new interval.
    pub fn apply_setting(&mut self, field: SettingField, value: f64) -> Result<(), ValidationError> {
        self.settings.apply_setting(field, value)?;

        if field == SettingField::RespiratoryRate {
            self.scheduler.restart(self.settings.respiratory_rate);
        }
        Ok(())
    }

    /// Switch ventilation mode.
    ///
    /// Clears the history and resets the waveform time origin; the next
    /// sample is at t = 0 in the new mode. Selecting the current mode again
    /// resets as well.
    pub fn set_mode(&mut self, mode: VentilationMode) {
        info!(from = %self.settings.mode, to = %mode, "ventilation mode selected");
        self.settings.mode = mode;
        self.buffers.reset();
        self.waveform_clock.reset();
    }

    /// Seconds since the session's first tick (0 before it)
    pub fn session_elapsed_secs(&self) -> f64 {
        self.session_clock
            .peek_secs(self.time.now())
            .unwrap_or(0.0)
    }

    pub fn settings(&self) -> &VentilatorSettings {
        &self.settings
    }

    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn monitor(&self) -> &PatientMonitor {
        &self.monitor
    }

    pub fn readout(&self) -> Readout {
        Readout::from_settings(&self.settings)
    }

    pub fn buffer_metrics(&self) -> BufferMetrics {
        self.buffers.metrics()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn failed_ticks(&self) -> u64 {
        self.failed_ticks
    }
}
