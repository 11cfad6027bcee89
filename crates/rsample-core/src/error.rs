//! Error types for resampling operations.
//!
//! All validation errors are raised before any computation starts; the
//! engine never produces partial output.

use thiserror::Error;

/// Main error type for resampling operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResampleError {
    /// Spline order outside the supported range.
    #[error("spline order {0} not supported (expected 0..=5)")]
    InvalidOrder(usize),

    /// Unrecognized boundary mode tag.
    #[error("invalid boundary mode '{0}'")]
    InvalidMode(String),

    /// A per-axis parameter does not have one entry per input axis.
    #[error("rank mismatch: {name} has length {actual}, expected {expected}")]
    RankMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Axis index outside the input rank.
    #[error("invalid axis {axis} for an input with {rank} dimensions")]
    InvalidAxis { axis: usize, rank: usize },

    /// Buffer data length inconsistent with its shape.
    #[error("shape mismatch: shape {shape:?} holds {expected} elements, got {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// A gradient path that is deliberately left unimplemented.
    ///
    /// Returned instead of a silent zero so that a graph host cannot
    /// mistake a disconnected input for one with vanishing gradient.
    #[error("gradient of {op} with respect to {input} is not implemented")]
    NotDifferentiable {
        op: &'static str,
        input: &'static str,
    },
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;
