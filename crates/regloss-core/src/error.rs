//! Error types for field operations.

use thiserror::Error;

/// Error raised when a field or window violates a shape precondition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Rank or axis count does not match what the operation needs.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Two fields that must agree in shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Window extents are not usable as a box filter.
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Penalty name is neither `l1` nor `l2`.
    #[error("Unknown penalty: {0}")]
    UnknownPenalty(String),

    /// Lattice weighting parameters are unusable.
    #[error("Invalid weighting: {0}")]
    InvalidWeighting(String),
}

/// Result type for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;

impl FieldError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create an invalid window error.
    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }

    /// Create an invalid weighting error.
    pub fn invalid_weighting(msg: impl Into<String>) -> Self {
        Self::InvalidWeighting(msg.into())
    }
}
