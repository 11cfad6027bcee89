//! Spline-based N-dimensional resampling.
//!
//! `rsample-core` converts arrays into B-spline interpolation coefficients
//! (causal/anti-causal recursive prefiltering), resamples them with
//! per-axis zoom and shift under configurable boundary handling, and
//! provides the exact adjoint of both operators so a surrounding
//! differentiable graph can propagate gradients through the resampling.
//!
//! The numerical engine lives in [`buffer`], [`boundary`], [`spline`] and
//! [`resample`] and works on plain `f64` buffers; [`ops`] adapts it to
//! backend tensors for graph hosts.

pub mod boundary;
pub mod buffer;
pub mod error;
pub mod ops;
pub mod resample;
pub mod spline;

pub use boundary::BoundaryMode;
pub use buffer::NdBuffer;
pub use error::{ResampleError, Result};
pub use resample::ZoomShift;
pub use spline::{SplineFilter, SplineOrder};
