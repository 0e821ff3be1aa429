// src/error.rs
//! Unified error handling for the simulator
//!
//! Each module boundary owns its own error enum; `VentError` wraps them so a
//! session tick or the desktop driver can propagate any of them with `?`.

use crate::acquisition::HistoryError;
use crate::config::ConfigError;
use crate::utils::validation::ValidationError;
use crate::ventilator::CommandParseError;
use crate::waveform::WaveformError;
use thiserror::Error;

/// Crate-level error type
#[derive(Debug, Error)]
pub enum VentError {
    /// A setting or limit outside its allowed range
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generator produced NaN or infinity; the sample was dropped
    #[error(transparent)]
    Waveform(#[from] WaveformError),

    /// Sample history rejected an append
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A control line could not be parsed
    #[error(transparent)]
    Command(#[from] CommandParseError),

    /// Failure outside the model, such as a renderer write
    #[error("{component}: {operation} failed: {reason}")]
    System {
        component: String,
        operation: String,
        reason: String,
    },
}

/// Result type alias for simulator operations
pub type VentResult<T> = Result<T, VentError>;

impl VentError {
    /// True for errors that leave the session usable (skip the tick and go on)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VentError::Waveform(_) | VentError::History(_) | VentError::Validation(_) | VentError::Command(_)
        )
    }
}

/// Convenience trait for tagging foreign errors with where they happened
pub trait IntoVentError<T> {
    fn vent_err(self, component: &str, operation: &str) -> VentResult<T>;
}

impl<T, E> IntoVentError<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn vent_err(self, component: &str, operation: &str) -> VentResult<T> {
        self.map_err(|err| VentError::System {
            component: component.to_string(),
            operation: operation.to_string(),
            reason: err.to_string(),
        })
    }
}
