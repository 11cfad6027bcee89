//! Dense n-dimensional sample buffers.
//!
//! The resampling engine operates on plain row-major `f64` buffers so that
//! the numerical kernels stay independent of any tensor backend; the `ops`
//! module converts to and from backend tensors at the API boundary.

use crate::error::{ResampleError, Result};

/// Dense row-major array of `f64` samples with explicit shape and strides.
///
/// Inputs are read-only once handed to an operation; outputs and
/// intermediates are freshly allocated by the engine and returned by value.
#[derive(Debug, Clone, PartialEq)]
pub struct NdBuffer {
    data: Vec<f64>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

/// Row-major element strides for a shape (last axis varies fastest).
pub(crate) fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}

impl NdBuffer {
    /// Wrap existing data in a buffer of the given shape.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(ResampleError::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        let strides = compute_strides(&shape);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Zero-filled buffer of the given shape.
    pub fn zeros(shape: &[usize]) -> Self {
        let len = shape.iter().product();
        Self {
            data: vec![0.0; len],
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the buffer, returning its data and shape.
    pub fn into_parts(self) -> (Vec<f64>, Vec<usize>) {
        (self.data, self.shape)
    }

    /// Linear offset of a multi-index.
    pub(crate) fn offset(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(&self.strides)
            .map(|(i, s)| i * s)
            .sum()
    }

    /// Start offsets of every line running along `axis`.
    ///
    /// A line is the 1-D slice obtained by holding every other index fixed;
    /// elements of a line are `stride[axis]` apart. Returns an empty list
    /// when the buffer has no elements.
    pub(crate) fn line_offsets(&self, axis: usize) -> Vec<usize> {
        if self.data.is_empty() {
            return Vec::new();
        }
        let count = self.data.len() / self.shape[axis];
        let mut offsets = Vec::with_capacity(count);
        let mut index = vec![0usize; self.rank()];
        loop {
            offsets.push(self.offset(&index));
            if !increment_skipping(&mut index, &self.shape, axis) {
                break;
            }
        }
        offsets
    }
}

/// Advance a row-major multi-index by one; returns `false` once the index
/// has wrapped past the end.
pub(crate) fn increment_index(index: &mut [usize], shape: &[usize]) -> bool {
    for d in (0..shape.len()).rev() {
        index[d] += 1;
        if index[d] < shape[d] {
            return true;
        }
        index[d] = 0;
    }
    false
}

/// Like [`increment_index`] but keeps `skip` fixed at zero.
fn increment_skipping(index: &mut [usize], shape: &[usize], skip: usize) -> bool {
    for d in (0..shape.len()).rev() {
        if d == skip {
            continue;
        }
        index[d] += 1;
        if index[d] < shape[d] {
            return true;
        }
        index[d] = 0;
    }
    false
}
