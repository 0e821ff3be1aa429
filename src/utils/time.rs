//! Time sources and the session clock
//!
//! Elapsed time is always read from a [`TimeProvider`] rather than
//! accumulated from tick counts, so scheduler jitter never turns into
//! waveform drift.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    /// Monotonic time since an arbitrary fixed origin
    fn now(&self) -> Duration;

    fn now_nanos(&self) -> u64 {
        self.now().as_nanos() as u64
    }
}

/// Wall-clock provider anchored at construction
pub struct MonotonicTimeProvider {
    anchor: Instant,
}

impl MonotonicTimeProvider {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MonotonicTimeProvider {
    fn now(&self) -> Duration {
        self.anchor.elapsed()
    }
}

/// Mock time provider for deterministic testing
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    current_time: AtomicU64,
}

impl MockTimeProvider {
    pub fn new(initial_time_nanos: u64) -> Self {
        Self {
            current_time: AtomicU64::new(initial_time_nanos),
        }
    }

    pub fn advance_by(&self, duration: Duration) {
        self.current_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn advance_secs_f64(&self, secs: f64) {
        self.advance_by(Duration::from_secs_f64(secs));
    }

    pub fn set_time(&self, nanos: u64) {
        self.current_time.store(nanos, Ordering::Relaxed);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.current_time.load(Ordering::Relaxed))
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for std::sync::Arc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Elapsed-time origin for a session.
///
/// The origin is established lazily by the first reading after a reset, so
/// the first sample of a session (or of a new mode) is always at t = 0.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    origin: Option<Duration>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self { origin: None }
    }

    /// Seconds since the origin, establishing it on first use.
    pub fn elapsed_secs(&mut self, now: Duration) -> f64 {
        match self.origin {
            Some(origin) => now.saturating_sub(origin).as_secs_f64(),
            None => {
                self.origin = Some(now);
                0.0
            }
        }
    }

    /// Seconds since the origin without establishing one.
    pub fn peek_secs(&self, now: Duration) -> Option<f64> {
        self.origin.map(|origin| now.saturating_sub(origin).as_secs_f64())
    }

    pub fn reset(&mut self) {
        self.origin = None;
    }

    pub fn is_started(&self) -> bool {
        self.origin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_advances() {
        let provider = MockTimeProvider::new(1_000);
        provider.advance_by(Duration::from_millis(5));
        assert_eq!(provider.now_nanos(), 1_000 + 5_000_000);

        provider.set_time(42);
        assert_eq!(provider.now(), Duration::from_nanos(42));
    }

    #[test]
    fn test_session_clock_first_reading_is_zero() {
        let provider = MockTimeProvider::new(7_000_000_000);
        let mut clock = SessionClock::new();
        assert!(!clock.is_started());
        assert_eq!(clock.elapsed_secs(provider.now()), 0.0);

        provider.advance_secs_f64(1.5);
        assert!((clock.elapsed_secs(provider.now()) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_session_clock_reset_restarts_origin() {
        let provider = MockTimeProvider::new(0);
        let mut clock = SessionClock::new();
        clock.elapsed_secs(provider.now());
        provider.advance_secs_f64(3.0);

        clock.reset();
        assert_eq!(clock.peek_secs(provider.now()), None);
        assert_eq!(clock.elapsed_secs(provider.now()), 0.0);
    }

    #[test]
    fn test_monotonic_provider_moves_forward() {
        let provider = MonotonicTimeProvider::new();
        let first = provider.now();
        std::thread::sleep(Duration::from_millis(1));
        assert!(provider.now() > first);
    }
}
