//! Adjoint correctness at the tensor level: `<Op(x), y> == <x, Op^T(y)>`
//! for every boundary mode and order.

use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use rsample_core::{ops, BoundaryMode, ResampleError};

type TestBackend = NdArray<f64>;

/// Deterministic pseudo-random samples in [0, 1).
fn pseudo_random(seed: u64, len: usize) -> Vec<f64> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

fn tensor_2d(values: Vec<f64>, shape: [usize; 2]) -> Tensor<TestBackend, 2> {
    let device = Default::default();
    Tensor::from_data(
        burn::tensor::TensorData::new(values, shape.to_vec()),
        &device,
    )
}

fn to_vec(tensor: &Tensor<TestBackend, 2>) -> Vec<f64> {
    tensor
        .to_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .unwrap()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// The grad op derives its zoom from the shapes, so the forward must be
/// driven with the matching values for the pair to be transposes.
fn shape_zoom(input: [usize; 2], output: [usize; 2]) -> [f64; 2] {
    let mut zoom = [1.0; 2];
    for d in 0..2 {
        if output[d] > 1 {
            zoom[d] = (input[d] as f64 - 1.0) / (output[d] as f64 - 1.0);
        }
    }
    zoom
}

#[test]
fn zoom_shift_adjoint_all_modes_and_orders() {
    let in_shape = [3, 4];
    let out_shape = [5, 7];
    let zoom = shape_zoom(in_shape, out_shape);
    let x = tensor_2d(pseudo_random(1, 12), in_shape);
    let y = tensor_2d(pseudo_random(2, 35), out_shape);
    for mode in BoundaryMode::ALL {
        for order in 0..=5 {
            let fx = ops::zoom_shift(&x, out_shape, &zoom, &[0.0, 0.0], order, mode, 0.0).unwrap();
            let fty =
                ops::zoom_shift_grad(&y, in_shape, &zoom, &[0.0, 0.0], order, mode).unwrap();
            let lhs = dot(&to_vec(&fx), &to_vec(&y));
            let rhs = dot(&to_vec(&x), &to_vec(&fty));
            assert!(
                (lhs - rhs).abs() < 1e-6,
                "{mode} order {order}: {lhs} vs {rhs}"
            );
        }
    }
}

#[test]
fn zoom_shift_adjoint_downsampling() {
    let in_shape = [6, 5];
    let out_shape = [3, 2];
    let zoom = shape_zoom(in_shape, out_shape);
    let x = tensor_2d(pseudo_random(3, 30), in_shape);
    let y = tensor_2d(pseudo_random(4, 6), out_shape);
    for mode in BoundaryMode::ALL {
        for order in 0..=5 {
            let fx = ops::zoom_shift(&x, out_shape, &zoom, &[0.0, 0.0], order, mode, 0.0).unwrap();
            let fty =
                ops::zoom_shift_grad(&y, in_shape, &zoom, &[0.0, 0.0], order, mode).unwrap();
            let lhs = dot(&to_vec(&fx), &to_vec(&y));
            let rhs = dot(&to_vec(&x), &to_vec(&fty));
            assert!(
                (lhs - rhs).abs() < 1e-6,
                "{mode} order {order}: {lhs} vs {rhs}"
            );
        }
    }
}

#[test]
fn zoom_shift_adjoint_with_shift() {
    let shape = [4, 4];
    let shift = [0.6, -1.2];
    let x = tensor_2d(pseudo_random(5, 16), shape);
    let y = tensor_2d(pseudo_random(6, 16), shape);
    for mode in BoundaryMode::ALL {
        for order in 0..=5 {
            let fx = ops::zoom_shift(&x, shape, &[1.0, 1.0], &shift, order, mode, 0.0).unwrap();
            let fty = ops::zoom_shift_grad(&y, shape, &[1.0, 1.0], &shift, order, mode).unwrap();
            let lhs = dot(&to_vec(&fx), &to_vec(&y));
            let rhs = dot(&to_vec(&x), &to_vec(&fty));
            assert!(
                (lhs - rhs).abs() < 1e-6,
                "{mode} order {order}: {lhs} vs {rhs}"
            );
        }
    }
}

#[test]
fn spline_filter_adjoint() {
    let shape = [4, 6];
    let x = tensor_2d(pseudo_random(7, 24), shape);
    let y = tensor_2d(pseudo_random(8, 24), shape);
    for order in 2..=5 {
        for axis in 0..2 {
            let fx = ops::spline_filter_1d(&x, order, axis).unwrap();
            let fty = ops::spline_filter_1d_grad(&y, order, axis).unwrap();
            let lhs = dot(&to_vec(&fx), &to_vec(&y));
            let rhs = dot(&to_vec(&x), &to_vec(&fty));
            assert!(
                (lhs - rhs).abs() < 1e-6,
                "order {order} axis {axis}: {lhs} vs {rhs}"
            );
        }
    }
}

#[test]
fn filter_grad_of_grad_is_forward() {
    // the grad op is itself linear; its adjoint is the forward filter
    // again, so <F^T y, x> must equal <y, F x>
    let x = tensor_2d(pseudo_random(9, 24), [4, 6]);
    let y = tensor_2d(pseudo_random(10, 24), [4, 6]);
    for order in 2..=5 {
        let grad_y = ops::spline_filter_1d_grad(&y, order, 0).unwrap();
        let forward_x = ops::spline_filter_1d(&x, order, 0).unwrap();
        let lhs = dot(&to_vec(&grad_y), &to_vec(&x));
        let rhs = dot(&to_vec(&y), &to_vec(&forward_x));
        assert!((lhs - rhs).abs() < 1e-6, "order {order}: {lhs} vs {rhs}");
    }
}

#[test]
fn zoom_shift_grad_of_grad_is_forward_with_zero_fill() {
    // transpose of the transpose: scattering y and gathering back against
    // x agrees with gathering x and reading off against y, with the fill
    // value pinned to zero on the second-order path
    let in_shape = [4, 3];
    let out_shape = [7, 5];
    let zoom = shape_zoom(in_shape, out_shape);
    let x = tensor_2d(pseudo_random(12, 12), in_shape);
    let y = tensor_2d(pseudo_random(13, 35), out_shape);
    for mode in BoundaryMode::ALL {
        for order in 0..=5 {
            let grad_y =
                ops::zoom_shift_grad(&y, in_shape, &zoom, &[0.0, 0.0], order, mode).unwrap();
            let forward_x =
                ops::zoom_shift(&x, out_shape, &zoom, &[0.0, 0.0], order, mode, 0.0).unwrap();
            let lhs = dot(&to_vec(&grad_y), &to_vec(&x));
            let rhs = dot(&to_vec(&y), &to_vec(&forward_x));
            assert!(
                (lhs - rhs).abs() < 1e-6,
                "{mode} order {order}: {lhs} vs {rhs}"
            );
        }
    }
}

#[test]
fn cval_gradient_is_explicitly_unimplemented() {
    let y = tensor_2d(pseudo_random(11, 6), [2, 3]);
    let err = ops::zoom_shift_grad_cval(&y).unwrap_err();
    assert!(matches!(
        err,
        ResampleError::NotDifferentiable {
            op: "zoom_shift",
            input: "cval",
        }
    ));
}
