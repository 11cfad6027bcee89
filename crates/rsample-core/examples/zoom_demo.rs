//! Zoom Demo Example
//!
//! Builds a small synthetic image, zooms it with cubic spline
//! interpolation and prints a coarse rendering of both grids.
//!
//! Usage:
//!   cargo run --example zoom_demo

use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use rsample_core::{ops, BoundaryMode};

type Backend = NdArray<f64>;

fn render(label: &str, values: &[f64], shape: (usize, usize)) {
    println!("{label} ({}x{}):", shape.0, shape.1);
    for row in 0..shape.0 {
        let line: String = (0..shape.1)
            .map(|col| {
                let v = values[row * shape.1 + col];
                match v {
                    v if v > 0.75 => '#',
                    v if v > 0.5 => '+',
                    v if v > 0.25 => '.',
                    _ => ' ',
                }
            })
            .collect();
        println!("  |{line}|");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let device = Default::default();

    // a soft diagonal ramp with a bright spot
    let (rows, cols) = (6, 8);
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let ramp = (r + c) as f64 / (rows + cols - 2) as f64;
            let spot = if r == 2 && c == 3 { 0.6 } else { 0.0 };
            data.push((ramp * 0.6 + spot).min(1.0));
        }
    }
    let image = Tensor::<Backend, 2>::from_data(
        burn::tensor::TensorData::new(data.clone(), vec![rows, cols]),
        &device,
    );
    render("input", &data, (rows, cols));

    let zoomed = ops::zoom(&image, &[2.0, 2.0], 3, BoundaryMode::Mirror, 0.0, true)?;
    let out_shape = zoomed.shape().dims;
    let values = zoomed.to_data().convert::<f64>().to_vec::<f64>().unwrap();
    render("zoomed x2", &values, (out_shape[0], out_shape[1]));

    let shifted = ops::shift(&image, &[0.0, 2.5], 1, BoundaryMode::Constant, 0.0, true)?;
    let values = shifted.to_data().convert::<f64>().to_vec::<f64>().unwrap();
    render("shifted", &values, (rows, cols));

    Ok(())
}
