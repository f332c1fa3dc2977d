//! Gaussian weight generation.
//!
//! Kernels are stored as `n x m` grids of normalized weights. The separable
//! path uses a single row (`n = 1`), the full 2D path a square matrix.


use crate::FILTER_SIZE;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Tolerance for the weight sum of caller-supplied kernels.
pub const NORMALIZATION_TOLERANCE: f32 = 1e-3;

/// Fixed 7-tap row equal to a sigma = 3 Gaussian, rounded to five decimals.
pub const REFERENCE_ROW: [f32; FILTER_SIZE] = [
    0.10629, 0.14032, 0.16577, 0.17524, 0.16577, 0.14032, 0.10629,
];

#[derive(Debug, PartialEq)]
pub struct Kernel {
    weights: Grid<f32>,
}

impl Kernel {
    /// Build an `n x m` Gaussian kernel normalized to sum to 1.
    ///
    /// Weight at `(y, x)` is `exp(-((y - yo)² + (x - xo)²) / (2σ²))` with
    /// `yo = (n - 1) / 2` and `xo = (m - 1) / 2` in integer arithmetic.
    pub fn gaussian(n: usize, m: usize, sigma: f32) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidKernel(format!(
                "sigma must be positive and finite, got {}",
                sigma
            )));
        }
        if n == 0 || m == 0 {
            return Err(Error::InvalidKernel(format!(
                "kernel dimensions must be non-zero, got {}x{}",
                n, m
            )));
        }

        let y_off = ((n - 1) / 2) as i64;
        let x_off = ((m - 1) / 2) as i64;
        let two_sigma_sq = 2.0 * sigma * sigma;

        let mut weights = Grid::try_from_fn(m, n, |x, y| {
            let dy = y as i64 - y_off;
            let dx = x as i64 - x_off;
            (-((dy * dy + dx * dx) as f32) / two_sigma_sq).exp()
        })?;

        // 2σ² underflows to 0 for tiny sigma, turning the center tap into NaN
        let sum: f32 = weights.as_slice().iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(Error::InvalidKernel(format!(
                "sigma {} is too small to produce finite weights",
                sigma
            )));
        }
        for w in weights.as_mut_slice() {
            *w /= sum;
        }

        tracing::trace!(n, m, sigma, "generated gaussian kernel");
        Ok(Self { weights })
    }

    /// A single-row Gaussian for separable filtering.
    pub fn gaussian_row(taps: usize, sigma: f32) -> Result<Self> {
        Self::gaussian(1, taps, sigma)
    }

    /// Wrap caller-supplied weights. They must be finite and sum to 1.
    pub fn from_weights(n: usize, m: usize, weights: &[f32]) -> Result<Self> {
        if n == 0 || m == 0 || n.checked_mul(m) != Some(weights.len()) {
            return Err(Error::InvalidKernel(format!(
                "{} weights do not form a {}x{} kernel",
                weights.len(),
                n,
                m
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidKernel("weights must be finite".into()));
        }
        let sum: f32 = weights.iter().sum();
        if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
            return Err(Error::InvalidKernel(format!(
                "weights must sum to 1, got {}",
                sum
            )));
        }

        Ok(Self {
            weights: Grid::try_from_slice(m, n, weights)?,
        })
    }

    /// The fixed [`REFERENCE_ROW`] as a 1x7 kernel.
    pub fn reference_row() -> Result<Self> {
        Self::from_weights(1, FILTER_SIZE, &REFERENCE_ROW)
    }

    /// Square kernel with `w(y, x) = row[y] * row[x]` built from a
    /// single-row kernel.
    pub fn outer_product(&self) -> Result<Self> {
        if self.height() != 1 {
            return Err(Error::KernelShape {
                expected: (1, self.width()),
                actual: (self.height(), self.width()),
            });
        }
        let row = self.row(0);
        let m = row.len();
        let weights = Grid::try_from_fn(m, m, |x, y| row[y] * row[x])?;
        Ok(Self { weights })
    }

    /// Number of kernel rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.weights.height()
    }

    /// Number of taps per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.weights.width()
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        self.weights.row(y)
    }

    #[inline]
    pub fn weights(&self) -> &Grid<f32> {
        &self.weights
    }

    pub fn sum(&self) -> f32 {
        self.weights.as_slice().iter().sum()
    }

    /// Row `y` as a fixed 7-tap array, or a shape error.
    pub(crate) fn taps(&self, y: usize) -> Result<[f32; FILTER_SIZE]> {
        self.row(y)
            .try_into()
            .map_err(|_| Error::KernelShape {
                expected: (self.height(), FILTER_SIZE),
                actual: (self.height(), self.width()),
            })
    }

    /// Fail unless the kernel is exactly `rows x FILTER_SIZE`.
    pub(crate) fn expect_shape(&self, rows: usize) -> Result<()> {
        if (self.height(), self.width()) != (rows, FILTER_SIZE) {
            return Err(Error::KernelShape {
                expected: (rows, FILTER_SIZE),
                actual: (self.height(), self.width()),
            });
        }
        Ok(())
    }
}
