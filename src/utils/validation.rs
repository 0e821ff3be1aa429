//! Validation utilities for vent-sim
//!
//! Range checks shared by the command interface, the configuration loader
//! and the alarm limit editor. All bounds come from `config::constants`.

use thiserror::Error;

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of valid range
    #[error("Field '{field}' value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite input
    #[error("Field '{field}' must be a finite number")]
    NotFinite { field: String },

    /// Unknown field name from a text command or config key
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Cross-field validation failure
    #[error("Constraint violation for fields [{}]: {message}", fields.join(", "))]
    ConstraintViolation {
        fields: Vec<String>,
        message: String,
    },
}

/// Check that `value` is finite and lies within `[min, max]`.
pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }

    Ok(value)
}

/// Same as [`validate_range`] with the bounds packed as a tuple.
pub fn validate_bounds(field: &str, value: f64, bounds: (f64, f64)) -> ValidationResult<f64> {
    validate_range(field, value, bounds.0, bounds.1)
}
