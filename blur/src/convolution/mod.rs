//! 7-tap convolution of a bordered canvas.
//!
//! Two forms are provided, each in a scalar and a 4-lane vector flavor:
//! - a horizontal 1D pass, applied twice around a transpose for the
//!   separable blur
//! - a full 7x7 2D pass
//!
//! Every pass reads from the unmodified input and writes into a fresh
//! destination, which then replaces the canvas contents. Pixels the pass does
//! not compute keep their input values. Rows are distributed over rayon in
//! chunks of [`ROWS_PER_CHUNK`].

#[cfg(test)]
mod tests;

pub(crate) mod scalar;
pub(crate) mod simd;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::border::Canvas;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::{EXTENSION_BORDER, FILTER_SIZE};

use scalar::RADIUS;
use simd::{MatrixTaps, NativeLane, RowTaps};

/// Rows handed to a worker at once; keeps writers on distinct cache lines.
const ROWS_PER_CHUNK: usize = 8;

/// Convolution variant used by [`convolve`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Strategy {
    /// Separable, one pixel at a time.
    #[strum(serialize = "scalar-1d")]
    #[serde(rename = "scalar-1d")]
    Scalar1D,
    /// Full 7x7 kernel, one pixel at a time.
    #[strum(serialize = "scalar-2d")]
    #[serde(rename = "scalar-2d")]
    Scalar2D,
    /// Separable, four outputs per iteration.
    #[default]
    #[strum(serialize = "vector-1d")]
    #[serde(rename = "vector-1d")]
    Vector1D,
    /// Full 7x7 kernel, vector multiply-accumulate per pixel.
    #[strum(serialize = "vector-2d")]
    #[serde(rename = "vector-2d")]
    Vector2D,
}

impl Strategy {
    /// Whether this strategy uses a 1x7 kernel applied along both axes.
    pub fn is_separable(self) -> bool {
        matches!(self, Strategy::Scalar1D | Strategy::Vector1D)
    }

    pub fn is_vectorized(self) -> bool {
        matches!(self, Strategy::Vector1D | Strategy::Vector2D)
    }

    /// Number of kernel rows this strategy expects.
    pub fn kernel_rows(self) -> usize {
        if self.is_separable() { 1 } else { FILTER_SIZE }
    }
}

/// Run `strategy` over `canvas`.
///
/// Separable strategies expect a 1x7 kernel, 2D strategies a 7x7 one.
pub fn convolve(canvas: &mut Canvas, kernel: &Kernel, strategy: Strategy) -> Result<()> {
    tracing::debug!(
        %strategy,
        width = canvas.width(),
        height = canvas.height(),
        "convolving canvas"
    );
    let vectorized = strategy.is_vectorized();
    if strategy.is_separable() {
        convolve_separable(canvas, kernel, vectorized)
    } else {
        convolve_2d(canvas, kernel, vectorized)
    }
}

/// Horizontal pass with a 1x7 kernel.
///
/// Every canvas row is filtered across the interior columns
/// `[EXTENSION_BORDER, EXTENSION_BORDER + cols)`. Filtering the border rows
/// too lets a following vertical pass read already filtered neighbors.
pub fn convolve_1d(canvas: &mut Canvas, kernel: &Kernel, vectorized: bool) -> Result<()> {
    canvas.validate()?;
    kernel.expect_shape(1)?;
    let taps = kernel.taps(0)?;

    let start = EXTENSION_BORDER;
    let end = EXTENSION_BORDER + canvas.cols();
    let width = canvas.width();
    let src = canvas.grid();
    let mut dst = src.try_clone()?;

    if vectorized {
        let row_taps = RowTaps::<NativeLane>::new(&taps);
        for_each_row(dst.as_mut_slice(), width, |y, out_row| {
            simd::convolve_row_1d(src.row(y), out_row, &row_taps, start, end);
        });
    } else {
        for_each_row(dst.as_mut_slice(), width, |y, out_row| {
            scalar::convolve_row_1d(src.row(y), out_row, &taps, start, end);
        });
    }

    canvas.replace_grid(dst);
    Ok(())
}

/// Full 7x7 pass over the interior.
pub fn convolve_2d(canvas: &mut Canvas, kernel: &Kernel, vectorized: bool) -> Result<()> {
    canvas.validate()?;
    kernel.expect_shape(FILTER_SIZE)?;
    let mut weights = [[0.0f32; FILTER_SIZE]; FILTER_SIZE];
    for (r, row) in weights.iter_mut().enumerate() {
        *row = kernel.taps(r)?;
    }

    let start = EXTENSION_BORDER;
    let end = EXTENSION_BORDER + canvas.cols();
    let interior_rows = EXTENSION_BORDER..EXTENSION_BORDER + canvas.rows();
    let width = canvas.width();
    let src = canvas.grid();
    let mut dst = src.try_clone()?;

    let window = |y: usize| -> [&[f32]; FILTER_SIZE] {
        std::array::from_fn(|r| src.row(y + r - RADIUS))
    };

    if vectorized {
        let matrix = MatrixTaps::<NativeLane>::new(&weights);
        for_each_row(dst.as_mut_slice(), width, |y, out_row| {
            if interior_rows.contains(&y) {
                simd::convolve_row_2d(&window(y), out_row, &matrix, start, end);
            }
        });
    } else {
        for_each_row(dst.as_mut_slice(), width, |y, out_row| {
            if interior_rows.contains(&y) {
                scalar::convolve_row_2d(&window(y), out_row, &weights, start, end);
            }
        });
    }

    canvas.replace_grid(dst);
    Ok(())
}

/// Separable blur: horizontal pass, transpose, horizontal pass, transpose
/// back.
pub fn convolve_separable(canvas: &mut Canvas, kernel: &Kernel, vectorized: bool) -> Result<()> {
    convolve_1d(canvas, kernel, vectorized)?;
    let mut transposed = canvas.transposed()?;
    convolve_1d(&mut transposed, kernel, vectorized)?;
    *canvas = transposed.transposed()?;
    Ok(())
}

/// Call `f(y, row)` for every `width`-long row of `data` in parallel.
fn for_each_row<F>(data: &mut [f32], width: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync,
{
    data.par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, row) in chunk.chunks_exact_mut(width).enumerate() {
                f(y_start + local_y, row);
            }
        });
}
