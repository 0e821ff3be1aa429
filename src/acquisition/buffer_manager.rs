// src/acquisition/buffer_manager.rs
//! Rolling sample history with a sliding display window

use crate::acquisition::history::{HistoryError, SampleHistory};
use crate::config::constants::history::*;
use crate::render::RenderFrame;
use crate::utils::validation::{validate_range, ValidationResult};
use crate::waveform::Sample;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Buffer configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BufferConfig {
    #[serde(default = "defaults::points_per_cycle")]
    pub points_per_cycle: usize,
    #[serde(default = "defaults::max_cycles")]
    pub max_cycles: usize,
    /// Seconds of history shown per frame
    #[serde(default = "defaults::window_size_secs")]
    pub window_size_secs: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            points_per_cycle: DEFAULT_POINTS_PER_CYCLE,
            max_cycles: DEFAULT_MAX_CYCLES,
            window_size_secs: DEFAULT_WINDOW_SIZE_SECS,
        }
    }
}

impl BufferConfig {
    /// Maximum number of retained samples
    pub fn capacity(&self) -> usize {
        self.points_per_cycle.saturating_mul(self.max_cycles)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "display.points_per_cycle",
            self.points_per_cycle as f64,
            1.0,
            MAX_HISTORY_CAPACITY as f64,
        )?;
        validate_range(
            "display.max_cycles",
            self.max_cycles as f64,
            1.0,
            MAX_HISTORY_CAPACITY as f64,
        )?;
        validate_range(
            "display.capacity",
            self.capacity() as f64,
            1.0,
            MAX_HISTORY_CAPACITY as f64,
        )?;
        validate_range(
            "display.window_size_secs",
            self.window_size_secs,
            MIN_WINDOW_SIZE_SECS,
            MAX_WINDOW_SIZE_SECS,
        )?;
        Ok(())
    }
}

mod defaults {
    use super::*;

    pub fn points_per_cycle() -> usize {
        DEFAULT_POINTS_PER_CYCLE
    }
    pub fn max_cycles() -> usize {
        DEFAULT_MAX_CYCLES
    }
    pub fn window_size_secs() -> f64 {
        DEFAULT_WINDOW_SIZE_SECS
    }
}

/// Samples inside `[t_min, t_max]`, oldest first. Derived per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWindow {
    pub t_min: f64,
    pub t_max: f64,
    pub samples: Vec<Sample>,
}

impl VisibleWindow {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Buffer counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BufferMetrics {
    pub utilization: f32,
    pub samples_appended: u64,
    pub samples_evicted: u64,
    pub samples_rejected: u64,
    pub resets: u64,
}

/// Owns the sample history and derives the visible window from it
#[derive(Debug, Clone)]
pub struct BufferManager {
    history: SampleHistory,
    config: BufferConfig,

    samples_appended: u64,
    samples_evicted: u64,
    samples_rejected: u64,
    resets: u64,
}

impl BufferManager {
    /// Create new buffer manager
    pub fn new(config: BufferConfig) -> Result<Self, HistoryError> {
        let history = SampleHistory::new(config.capacity())?;
        debug!(
            capacity = history.capacity(),
            window_secs = config.window_size_secs,
            "sample buffer created"
        );

        Ok(Self {
            history,
            config,
            samples_appended: 0,
            samples_evicted: 0,
            samples_rejected: 0,
            resets: 0,
        })
    }

    /// Push a sample to the tail, evicting from the head past capacity
    pub fn append(&mut self, sample: Sample) -> Result<(), HistoryError> {
        match self.history.push(sample) {
            Ok(evicted) => {
                self.samples_appended += 1;
                self.samples_evicted += evicted as u64;
                Ok(())
            }
            Err(e) => {
                self.samples_rejected += 1;
                warn!(error = %e, "sample rejected");
                Err(e)
            }
        }
    }

    /// Samples from the most recent `window_size_secs` seconds.
    ///
    /// `t_max` is the newest sample time (0 when empty) and
    /// `t_min = max(0, t_max - window_size_secs)`.
    pub fn visible_window(&self, window_size_secs: f64) -> VisibleWindow {
        let t_max = self.history.last_time().unwrap_or(0.0);
        let t_min = (t_max - window_size_secs).max(0.0);

        let samples = self
            .history
            .since(t_min)
            .take_while(|s| s.time <= t_max)
            .copied()
            .collect();

        VisibleWindow {
            t_min,
            t_max,
            samples,
        }
    }

    /// Visible window for the configured window size
    pub fn current_window(&self) -> VisibleWindow {
        self.visible_window(self.config.window_size_secs)
    }

    /// Pack the configured window into plot-ready arrays
    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::from_window(&self.current_window())
    }

    /// Drop every sample (mode switch)
    pub fn reset(&mut self) {
        self.history.clear();
        self.resets += 1;
        debug!(resets = self.resets, "sample buffer cleared");
    }

    pub fn metrics(&self) -> BufferMetrics {
        BufferMetrics {
            utilization: self.history.utilization(),
            samples_appended: self.samples_appended,
            samples_evicted: self.samples_evicted,
            samples_rejected: self.samples_rejected,
            resets: self.resets,
        }
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.history.latest()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}
