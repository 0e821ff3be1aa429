//! Common utility functions for vent-sim
//!
//! - Time sources and the session clock
//! - Range validation used by commands, config and alarm limits

pub mod time;
pub mod validation;

pub use time::{MockTimeProvider, MonotonicTimeProvider, SessionClock, TimeProvider};

pub use validation::{validate_bounds, validate_range, ValidationError, ValidationResult};
