//! Out-of-range index handling.
//!
//! Interpolation stencils and filter recursions read taps that can fall
//! outside the sampled axis; the boundary mode decides which in-range
//! sample such a tap maps to, or whether it contributes a constant fill
//! value instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResampleError;

/// Policy for mapping an out-of-range tap index back into an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Clamp to the closest edge sample.
    Nearest,
    /// Periodic wrap-around.
    Wrap,
    /// Reflect about the array edges, repeating the edge sample
    /// (extension period `2n`).
    Reflect,
    /// Reflect about the edge samples themselves, without repeating them
    /// (extension period `2n - 2`).
    Mirror,
    /// Substitute a constant fill value for anything outside the axis.
    Constant,
}

impl BoundaryMode {
    /// Every supported mode, in tag order.
    pub const ALL: [BoundaryMode; 5] = [
        BoundaryMode::Nearest,
        BoundaryMode::Wrap,
        BoundaryMode::Reflect,
        BoundaryMode::Mirror,
        BoundaryMode::Constant,
    ];

    /// Fold a raw tap index against an axis of length `len`.
    ///
    /// Returns the in-range index the tap reads from, or `None` when the
    /// tap contributes the fill value instead of a sample. Axes of length 1
    /// fold everything onto index 0 (except under [`BoundaryMode::Constant`]);
    /// axes of length 0 hold no samples and always yield `None`.
    pub fn fold(self, index: i64, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let n = len as i64;
        if (0..n).contains(&index) {
            return Some(index as usize);
        }
        if self == BoundaryMode::Constant {
            return None;
        }
        if n == 1 {
            return Some(0);
        }
        let folded = match self {
            BoundaryMode::Nearest => index.clamp(0, n - 1),
            BoundaryMode::Wrap => index.rem_euclid(n),
            BoundaryMode::Reflect => {
                let m = index.rem_euclid(2 * n);
                if m < n {
                    m
                } else {
                    2 * n - 1 - m
                }
            }
            BoundaryMode::Mirror => {
                let period = 2 * n - 2;
                let m = index.rem_euclid(period);
                if m < n {
                    m
                } else {
                    period - m
                }
            }
            BoundaryMode::Constant => unreachable!(),
        };
        Some(folded as usize)
    }

    fn tag(self) -> &'static str {
        match self {
            BoundaryMode::Nearest => "nearest",
            BoundaryMode::Wrap => "wrap",
            BoundaryMode::Reflect => "reflect",
            BoundaryMode::Mirror => "mirror",
            BoundaryMode::Constant => "constant",
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BoundaryMode {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(BoundaryMode::Nearest),
            "wrap" => Ok(BoundaryMode::Wrap),
            "reflect" => Ok(BoundaryMode::Reflect),
            "mirror" => Ok(BoundaryMode::Mirror),
            "constant" => Ok(BoundaryMode::Constant),
            other => Err(ResampleError::InvalidMode(other.to_string())),
        }
    }
}
