//! Uniform interior grid of the Poisson problem.

use serde::{Deserialize, Serialize};

use crate::field::Real;

/// Interior grid: `m` points along the transformed X axis, `n` points along
/// the eliminated Y axis. Boundary points are not counted, so the full grid
/// including boundaries is `(m + 2) × (n + 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    pub m: usize,
    pub n: usize,
    pub hx: Real,
    pub hy: Real,
}

impl Grid2D {
    pub fn new(m: usize, n: usize, hx: Real, hy: Real) -> Self {
        Self { m, n, hx, hy }
    }

    /// Row-major index with the transform axis contiguous.
    #[inline]
    pub fn idx(&self, i: usize, k: usize) -> usize {
        k * self.m + i
    }

    pub fn len(&self) -> usize {
        self.m * self.n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `hy / hx`, the anisotropy entering the shutter diagonal.
    pub fn ratio(&self) -> Real {
        self.hy / self.hx
    }

    /// X coordinate of interior column `i` (boundary `bx` sits at x = 0).
    pub fn x(&self, i: usize) -> Real {
        self.hx * (i + 1) as Real
    }

    /// Y coordinate of row `k` (boundary `by` sits at y = 0).
    pub fn y(&self, k: usize) -> Real {
        self.hy * (k + 1) as Real
    }
}
