//! Error types for grid construction, queries and serialization.

use thiserror::Error;

/// Main error type for tricubic interpolation.
#[derive(Error, Debug)]
pub enum TricubicError {
    /// An axis has fewer than two samples.
    #[error("Axis {axis} has {len} samples, at least 2 are required")]
    TooFewSamples { axis: char, len: usize },

    /// An axis is not strictly increasing.
    #[error("Axis {axis} is not strictly increasing at index {index}: {previous} >= {value}")]
    NonMonotonic {
        axis: char,
        index: usize,
        previous: f64,
        value: f64,
    },

    /// An axis contains a NaN or infinite sample.
    #[error("Axis {axis} has a non-finite sample at index {index}")]
    NonFinite { axis: char, index: usize },

    /// Shape of an input does not match the axes.
    #[error("Dimension mismatch for {what}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A coordinate lies outside the sampled range of an axis.
    #[error("Coordinate {axis}={value} is outside the interpolation range [{min}, {max}]")]
    OutOfRange {
        axis: char,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A cell index lies outside the grid of cells.
    #[error("Cell index {index:?} is outside the cell grid {dims:?}")]
    CellIndex { index: [usize; 3], dims: [usize; 3] },

    /// An argument does not satisfy its documented constraint.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid for the current state of the function.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Underlying read or write failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tricubic operations.
pub type Result<T> = std::result::Result<T, TricubicError>;

impl TricubicError {
    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an illegal state error.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }
}
