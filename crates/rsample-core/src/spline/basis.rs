//! B-spline basis functions.
//!
//! For a fractional coordinate `x` and order `k`, interpolation gathers
//! `k + 1` consecutive taps starting at an order-dependent origin, weighted
//! by the centered cardinal B-spline of degree `k`. The weights always sum
//! to one (partition of unity), which is what makes the stencil an
//! interpolation rather than a smoothing.

use serde::{Deserialize, Serialize};

use crate::error::{ResampleError, Result};

/// Spline interpolation order, restricted to the supported range `0..=5`.
///
/// Order 0 is nearest-neighbour, order 1 is linear; orders 2 to 5 are
/// increasingly smooth piecewise polynomials and require prefiltered
/// coefficients to interpolate the original samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SplineOrder(u8);

impl SplineOrder {
    /// Validate and wrap an order value.
    pub fn new(order: usize) -> Result<Self> {
        if order > 5 {
            return Err(ResampleError::InvalidOrder(order));
        }
        Ok(Self(order as u8))
    }

    /// The raw order value.
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Number of taps contributing to one interpolated value.
    pub fn support(self) -> usize {
        self.0 as usize + 1
    }

    /// Whether evaluation expects prefiltered coefficients. Orders 0 and 1
    /// interpolate the raw samples directly.
    pub fn requires_prefilter(self) -> bool {
        self.0 >= 2
    }
}

impl TryFrom<u8> for SplineOrder {
    type Error = ResampleError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value as usize)
    }
}

impl From<SplineOrder> for u8 {
    fn from(order: SplineOrder) -> u8 {
        order.0
    }
}

/// Lowest tap index contributing to the value at coordinate `x`.
///
/// Odd orders center the stencil on the containing cell
/// (`floor(x) - order/2`), even orders on the nearest knot
/// (`floor(x + 0.5) - order/2`).
pub(crate) fn tap_origin(x: f64, order: usize) -> i64 {
    let base = if order % 2 == 1 {
        x.floor()
    } else {
        (x + 0.5).floor()
    };
    base as i64 - (order / 2) as i64
}

/// Fill `weights` (length `order + 1`) with the basis weights of the taps
/// starting at [`tap_origin`].
pub(crate) fn basis_weights(x: f64, order: usize, weights: &mut [f64]) {
    debug_assert_eq!(weights.len(), order + 1);
    match order {
        0 => weights[0] = 1.0,
        1 => {
            let f = x - x.floor();
            weights[0] = 1.0 - f;
            weights[1] = f;
        }
        _ => {
            let origin = tap_origin(x, order);
            for (j, w) in weights.iter_mut().enumerate() {
                *w = bspline(order, x - (origin + j as i64) as f64);
            }
        }
    }
}

/// Centered cardinal B-spline of degree `order` evaluated at offset `t`.
///
/// Orders 0 and 1 are handled directly in [`basis_weights`]; the kernel is
/// only probed inside its support there, so the half-sample edge of the
/// box kernel never arises.
fn bspline(order: usize, t: f64) -> f64 {
    let a = t.abs();
    match order {
        0 => {
            if a < 0.5 {
                1.0
            } else {
                0.0
            }
        }
        1 => {
            if a < 1.0 {
                1.0 - a
            } else {
                0.0
            }
        }
        2 => {
            if a < 0.5 {
                0.75 - a * a
            } else if a < 1.5 {
                let q = 1.5 - a;
                0.5 * q * q
            } else {
                0.0
            }
        }
        3 => {
            if a < 1.0 {
                a * a * (0.5 * a - 1.0) + 2.0 / 3.0
            } else if a < 2.0 {
                let q = 2.0 - a;
                q * q * q / 6.0
            } else {
                0.0
            }
        }
        4 => {
            if a < 0.5 {
                let f = a * a;
                f * (0.25 * f - 0.625) + 115.0 / 192.0
            } else if a < 1.5 {
                (55.0 + a * (20.0 + a * (-120.0 + a * (80.0 - 16.0 * a)))) / 96.0
            } else if a < 2.5 {
                let q = 2.5 - a;
                let f = q * q;
                f * f / 24.0
            } else {
                0.0
            }
        }
        5 => {
            if a < 1.0 {
                let f = a * a;
                f * (f * (0.25 - a / 12.0) - 0.5) + 0.55
            } else if a < 2.0 {
                (51.0 + a * (75.0 + a * (-210.0 + a * (150.0 + a * (-45.0 + 5.0 * a))))) / 120.0
            } else if a < 3.0 {
                let q = 3.0 - a;
                let f = q * q;
                f * f * q / 120.0
            } else {
                0.0
            }
        }
        _ => unreachable!("order validated to 0..=5"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_validation() {
        assert!(SplineOrder::new(0).is_ok());
        assert!(SplineOrder::new(5).is_ok());
        assert_eq!(
            SplineOrder::new(6).unwrap_err(),
            ResampleError::InvalidOrder(6)
        );
    }

    #[test]
    fn test_order_properties() {
        let cubic = SplineOrder::new(3).unwrap();
        assert_eq!(cubic.support(), 4);
        assert!(cubic.requires_prefilter());
        assert!(!SplineOrder::new(1).unwrap().requires_prefilter());
    }

    #[test]
    fn test_order_serde_round_trip() {
        let json = serde_json::to_string(&SplineOrder::new(3).unwrap()).unwrap();
        assert_eq!(json, "3");
        let back: SplineOrder = serde_json::from_str("2").unwrap();
        assert_eq!(back.get(), 2);
        assert!(serde_json::from_str::<SplineOrder>("9").is_err());
    }

    #[test]
    fn test_tap_origin_conventions() {
        // odd orders anchor on the containing cell
        assert_eq!(tap_origin(2.3, 1), 2);
        assert_eq!(tap_origin(2.3, 3), 1);
        assert_eq!(tap_origin(-0.4, 3), -2);
        // even orders anchor on the nearest knot
        assert_eq!(tap_origin(2.3, 0), 2);
        assert_eq!(tap_origin(2.7, 0), 3);
        assert_eq!(tap_origin(1.5, 0), 2);
        assert_eq!(tap_origin(2.3, 2), 1);
        assert_eq!(tap_origin(2.7, 4), 1);
    }

    #[test]
    fn test_partition_of_unity() {
        for order in 0..=5usize {
            let mut weights = vec![0.0; order + 1];
            for step in 0..50 {
                let x = 1.0 + step as f64 / 50.0;
                basis_weights(x, order, &mut weights);
                let sum: f64 = weights.iter().sum();
                assert!(
                    (sum - 1.0).abs() < 1e-10,
                    "order {order} at x={x}: weight sum {sum}"
                );
                assert!(weights.iter().all(|w| *w >= -1e-12));
            }
        }
    }

    #[test]
    fn test_linear_weights() {
        let mut weights = [0.0; 2];
        basis_weights(3.25, 1, &mut weights);
        assert!((weights[0] - 0.75).abs() < 1e-15);
        assert!((weights[1] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_cubic_kernel_values() {
        assert!((bspline(3, 0.0) - 2.0 / 3.0).abs() < 1e-15);
        assert!((bspline(3, 1.0) - 1.0 / 6.0).abs() < 1e-15);
        assert_eq!(bspline(3, 2.0), 0.0);
        // symmetry
        assert!((bspline(3, 0.3) - bspline(3, -0.3)).abs() < 1e-15);
        assert!((bspline(5, 1.2) - bspline(5, -1.2)).abs() < 1e-15);
    }

    #[test]
    fn test_kernel_continuity_at_knots() {
        // piecewise sections meet at the section boundaries
        for (order, edges) in [
            (2usize, vec![0.5, 1.5]),
            (3, vec![1.0, 2.0]),
            (4, vec![0.5, 1.5, 2.5]),
            (5, vec![1.0, 2.0, 3.0]),
        ] {
            for edge in edges {
                let below = bspline(order, edge - 1e-9);
                let above = bspline(order, edge + 1e-9);
                assert!(
                    (below - above).abs() < 1e-7,
                    "order {order} discontinuous at {edge}"
                );
            }
        }
    }

    #[test]
    fn test_integer_knot_values_match_synthesis() {
        // at an integer coordinate the stencil weights are the kernel's
        // values at the integer offsets
        let mut weights = [0.0; 4];
        basis_weights(5.0, 3, &mut weights);
        assert!((weights[0] - 1.0 / 6.0).abs() < 1e-15);
        assert!((weights[1] - 2.0 / 3.0).abs() < 1e-15);
        assert!((weights[2] - 1.0 / 6.0).abs() < 1e-15);
        assert!(weights[3].abs() < 1e-15);
    }
}
