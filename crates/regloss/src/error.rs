//! Error types for loss configuration and evaluation.
//!
//! Numerical degeneracies (zero local variance, empty masks) are absorbed by
//! the losses themselves. Errors are reserved for broken preconditions:
//! unusable hyperparameters and fields whose shape does not fit the loss.

use regloss_core::FieldError;
use thiserror::Error;

/// Main error type for loss operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LossError {
    /// Hyperparameters rejected at configuration time.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Field rank or extent does not fit the loss.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Two inputs that must agree in shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Wrong number of channels.
    #[error("Channel mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Error raised by a field primitive.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Result type for loss operations.
pub type Result<T> = std::result::Result<T, LossError>;

impl LossError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }
}

/// Fail unless `value` is finite.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(LossError::invalid_configuration(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Fail unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LossError::invalid_configuration(format!(
            "{} must be finite and positive, got {}",
            name, value
        )));
    }
    Ok(())
}
