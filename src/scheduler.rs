// src/scheduler.rs
//! Tick scheduling derived from the respiratory rate
//!
//! The scheduler only decides *when* to tick. It never accumulates time:
//! every tick reads elapsed wall-clock time from the session's
//! [`TimeProvider`](crate::utils::time::TimeProvider).

use crate::config::constants::scheduler::*;
use crate::config::constants::waveform::MIN_EFFECTIVE_RATE;
use std::time::Duration;
use tracing::debug;

/// `clamp(floor(1000 / rate), 10, 100)` milliseconds
pub fn tick_interval_ms(respiratory_rate: f64) -> u64 {
    let rate = respiratory_rate.max(MIN_EFFECTIVE_RATE);
    let raw = (MILLISECONDS_PER_SECOND / rate).floor() as u64;
    raw.clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS)
}

/// Tick period plus a generation counter.
///
/// Every restart bumps the generation; a driver holding a timer built for
/// an older generation must rebuild it before the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickScheduler {
    interval_ms: u64,
    generation: u64,
    running: bool,
}

impl TickScheduler {
    pub fn new(respiratory_rate: f64) -> Self {
        Self {
            interval_ms: tick_interval_ms(respiratory_rate),
            generation: 0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.generation += 1;
            debug!(interval_ms = self.interval_ms, generation = self.generation, "tick scheduler started");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            debug!(generation = self.generation, "tick scheduler stopped");
        }
    }

    /// Stop, recompute the interval for `respiratory_rate`, start again.
    ///
    /// A stopped scheduler only takes the new interval and stays stopped.
    /// Returns the generation after the restart.
    pub fn restart(&mut self, respiratory_rate: f64) -> u64 {
        let was_running = self.running;
        self.stop();
        let previous = self.interval_ms;
        self.interval_ms = tick_interval_ms(respiratory_rate);
        if was_running {
            self.start();
        }
        debug!(
            rate = respiratory_rate,
            previous_ms = previous,
            interval_ms = self.interval_ms,
            "tick scheduler reconfigured"
        );
        self.generation
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_examples() {
        assert_eq!(tick_interval_ms(30.0), 33);
        assert_eq!(tick_interval_ms(5.0), 100);
        assert_eq!(tick_interval_ms(15.0), 66);
        assert_eq!(tick_interval_ms(50.0), 20);
    }

    #[test]
    fn test_interval_clamped() {
        assert_eq!(tick_interval_ms(200.0), MIN_TICK_INTERVAL_MS);
        assert_eq!(tick_interval_ms(0.0), MAX_TICK_INTERVAL_MS);
        assert_eq!(tick_interval_ms(-3.0), MAX_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_start_stop_generation() {
        let mut scheduler = TickScheduler::new(15.0);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.generation(), 0);

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());
        assert_eq!(scheduler.generation(), 1);

        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_restart_replaces_interval() {
        let mut scheduler = TickScheduler::new(15.0);
        scheduler.start();

        let generation = scheduler.restart(30.0);
        assert_eq!(generation, 2);
        assert_eq!(scheduler.interval(), Duration::from_millis(33));
        assert!(scheduler.is_running());

        // Same interval still restarts
        assert_eq!(scheduler.restart(30.0), 3);
    }

    #[test]
    fn test_restart_keeps_stopped_scheduler_stopped() {
        let mut scheduler = TickScheduler::new(15.0);
        assert_eq!(scheduler.restart(30.0), 0);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.interval_ms(), 33);

        scheduler.start();
        scheduler.stop();
        assert_eq!(scheduler.restart(5.0), 1);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.interval_ms(), 100);

        scheduler.start();
        assert_eq!(scheduler.generation(), 2);
    }
}
