//! Tensor-level operations for graph hosts.
//!
//! Thin adapter between backend tensors and the buffer-based engine:
//! argument validation, data extraction, operation dispatch. Forward and
//! gradient entry points come in pairs so a surrounding differentiable
//! graph can wire vector-Jacobian products directly; gradients that are
//! deliberately unavailable fail with an explicit error instead of a
//! silent zero.
//!
//! Internally every operation computes in `f64`; results are converted
//! back to the backend's float element type on the way out.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use crate::boundary::BoundaryMode;
use crate::buffer::NdBuffer;
use crate::error::{ResampleError, Result};
use crate::resample::{effective_zoom, zoomed_len, ZoomShift};
use crate::spline::{SplineFilter, SplineOrder};

fn to_buffer<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> NdBuffer {
    let shape = tensor.shape().dims;
    let data = tensor
        .to_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .expect("float tensor data");
    NdBuffer::new(data, shape).expect("tensor data matches its shape")
}

fn to_tensor<B: Backend, const D: usize>(buffer: NdBuffer, device: &B::Device) -> Tensor<B, D> {
    let (data, shape) = buffer.into_parts();
    Tensor::from_data(TensorData::new(data, shape), device)
}

/// Compute B-spline interpolation coefficients along one axis.
///
/// Orders 0 and 1 need no prefiltering and return the input unchanged;
/// orders 2 to 5 run the recursive prefilter over every line along `axis`.
///
/// # Examples
/// ```rust
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
/// use rsample_core::ops;
///
/// type Backend = NdArray<f64>;
///
/// let device = Default::default();
/// let image = Tensor::<Backend, 2>::from_floats(
///     [[0.0, 1.0, 0.0], [2.0, 3.0, 2.0]],
///     &device,
/// );
/// let coeffs = ops::spline_filter_1d(&image, 3, 1).unwrap();
/// assert_eq!(coeffs.shape().dims, vec![2, 3]);
/// ```
pub fn spline_filter_1d<B: Backend, const D: usize>(
    input: &Tensor<B, D>,
    order: usize,
    axis: usize,
) -> Result<Tensor<B, D>> {
    let order = SplineOrder::new(order)?;
    if axis >= D {
        return Err(ResampleError::InvalidAxis { axis, rank: D });
    }
    if !order.requires_prefilter() {
        return Ok(input.clone());
    }
    tracing::debug!(order = order.get(), axis, "spline_filter_1d");
    let device = input.device();
    let filtered = SplineFilter::new(order).apply_axis(&to_buffer(input), axis)?;
    Ok(to_tensor(filtered, &device))
}

/// Gradient of [`spline_filter_1d`]: the transpose of the linear filter
/// applied to the output gradient. Its own gradient is the forward filter
/// again (the transpose of a transpose).
pub fn spline_filter_1d_grad<B: Backend, const D: usize>(
    grad_output: &Tensor<B, D>,
    order: usize,
    axis: usize,
) -> Result<Tensor<B, D>> {
    let order = SplineOrder::new(order)?;
    if axis >= D {
        return Err(ResampleError::InvalidAxis { axis, rank: D });
    }
    if !order.requires_prefilter() {
        return Ok(grad_output.clone());
    }
    let device = grad_output.device();
    let grad = SplineFilter::new(order).apply_adjoint_axis(&to_buffer(grad_output), axis)?;
    Ok(to_tensor(grad, &device))
}

/// Compute B-spline interpolation coefficients along every axis, in
/// increasing axis order.
pub fn spline_filter<B: Backend, const D: usize>(
    input: &Tensor<B, D>,
    order: usize,
) -> Result<Tensor<B, D>> {
    let order = SplineOrder::new(order)?;
    if !order.requires_prefilter() {
        return Ok(input.clone());
    }
    tracing::debug!(order = order.get(), rank = D, "spline_filter");
    let device = input.device();
    let filtered = SplineFilter::new(order).apply(&to_buffer(input))?;
    Ok(to_tensor(filtered, &device))
}

/// Resample spline coefficients onto `output_shape` with per-axis zoom and
/// shift.
///
/// The coordinate of output cell `o` along axis `d` is
/// `o * zoom[d] + shift[d]`; out-of-range taps follow `mode`, with `cval`
/// substituted under [`BoundaryMode::Constant`]. For orders >= 2 the input
/// must already be prefiltered (see [`spline_filter`]); the [`zoom`] helper
/// does both steps.
pub fn zoom_shift<B: Backend, const D: usize>(
    input: &Tensor<B, D>,
    output_shape: [usize; D],
    zoom: &[f64],
    shift: &[f64],
    order: usize,
    mode: BoundaryMode,
    cval: f64,
) -> Result<Tensor<B, D>> {
    let order = SplineOrder::new(order)?;
    tracing::debug!(order = order.get(), %mode, "zoom_shift");
    let op = ZoomShift::new(zoom.to_vec(), shift.to_vec(), order, mode).with_fill_value(cval);
    let output = op.apply(&to_buffer(input), &output_shape)?;
    Ok(to_tensor(output, &input.device()))
}

/// Gradient of [`zoom_shift`] with respect to its input: the exact
/// transpose of the forward gather, scattered onto `input_shape`.
///
/// The effective per-axis zoom is derived from `input_shape` and the
/// gradient's shape as `(input_len - 1) / (grad_len - 1)` (1 for degenerate
/// axes); the `zoom` argument is validated for rank but not consulted,
/// matching the forward/adjoint convention of the operator pair. The
/// output shape, zoom and shift inputs of the forward operation carry no
/// gradient, and the fill-value gradient is explicitly unimplemented
/// ([`zoom_shift_grad_cval`]).
pub fn zoom_shift_grad<B: Backend, const D: usize>(
    grad_output: &Tensor<B, D>,
    input_shape: [usize; D],
    zoom: &[f64],
    shift: &[f64],
    order: usize,
    mode: BoundaryMode,
) -> Result<Tensor<B, D>> {
    let order = SplineOrder::new(order)?;
    let op = ZoomShift::new(zoom.to_vec(), shift.to_vec(), order, mode);
    let grad = op.apply_adjoint(&to_buffer(grad_output), &input_shape)?;
    Ok(to_tensor(grad, &grad_output.device()))
}

/// Gradient of [`zoom_shift`] with respect to the constant fill value.
///
/// Always fails with [`ResampleError::NotDifferentiable`]: the fill-value
/// gradient is not implemented, and callers wiring gradient graphs must
/// surface that instead of treating it as zero.
pub fn zoom_shift_grad_cval<B: Backend, const D: usize>(
    _grad_output: &Tensor<B, D>,
) -> Result<Tensor<B, 1>> {
    Err(ResampleError::NotDifferentiable {
        op: "zoom_shift",
        input: "cval",
    })
}

/// Zoom an array by per-axis factors using spline interpolation.
///
/// Output lengths are `round(len * factor)` (rounding half away from
/// zero). Each axis is then resampled with the effective zoom
/// `(in_len - 1) / (out_len - 1)`, so the first and last samples of every
/// non-degenerate axis map onto the first and last output cells. With
/// `prefilter` the input is run through [`spline_filter`] first, which is
/// required for faithful interpolation at orders >= 2.
///
/// # Examples
/// ```rust
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
/// use rsample_core::{ops, BoundaryMode};
///
/// type Backend = NdArray<f64>;
///
/// let device = Default::default();
/// let image = Tensor::<Backend, 2>::from_floats(
///     [[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]],
///     &device,
/// );
/// let zoomed = ops::zoom(&image, &[2.0, 2.0], 1, BoundaryMode::Nearest, 0.0, true).unwrap();
/// assert_eq!(zoomed.shape().dims, vec![4, 6]);
/// ```
pub fn zoom<B: Backend, const D: usize>(
    input: &Tensor<B, D>,
    factors: &[f64],
    order: usize,
    mode: BoundaryMode,
    cval: f64,
    prefilter: bool,
) -> Result<Tensor<B, D>> {
    let checked = SplineOrder::new(order)?;
    if factors.len() != D {
        return Err(ResampleError::RankMismatch {
            name: "zoom",
            expected: D,
            actual: factors.len(),
        });
    }
    let in_shape = input.shape().dims;
    let mut output_shape = [0usize; D];
    let mut zooms = [0.0f64; D];
    for d in 0..D {
        output_shape[d] = zoomed_len(in_shape[d], factors[d]);
        zooms[d] = effective_zoom(in_shape[d], output_shape[d]);
    }
    let filtered = if prefilter && checked.requires_prefilter() {
        spline_filter(input, order)?
    } else {
        input.clone()
    };
    zoom_shift(
        &filtered,
        output_shape,
        &zooms,
        &[0.0; D],
        order,
        mode,
        cval,
    )
}

/// Shift an array by per-axis offsets using spline interpolation.
///
/// Output cell `o` reads from input coordinate `o - offset`, so positive
/// offsets move content towards higher indices. The shape is unchanged.
pub fn shift<B: Backend, const D: usize>(
    input: &Tensor<B, D>,
    offsets: &[f64],
    order: usize,
    mode: BoundaryMode,
    cval: f64,
    prefilter: bool,
) -> Result<Tensor<B, D>> {
    let checked = SplineOrder::new(order)?;
    if offsets.len() != D {
        return Err(ResampleError::RankMismatch {
            name: "shift",
            expected: D,
            actual: offsets.len(),
        });
    }
    let output_shape: [usize; D] = input
        .shape()
        .dims
        .try_into()
        .expect("tensor rank matches D");
    let mut shifts = [0.0f64; D];
    for d in 0..D {
        shifts[d] = -offsets[d];
    }
    let filtered = if prefilter && checked.requires_prefilter() {
        spline_filter(input, order)?
    } else {
        input.clone()
    };
    zoom_shift(
        &filtered,
        output_shape,
        &[1.0; D],
        &shifts,
        order,
        mode,
        cval,
    )
}
