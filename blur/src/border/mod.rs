//! Border extension of integer rasters into float canvases.
//!
//! The canvas surrounds the source with [`EXTENSION_BORDER`] pixels on each
//! side and is padded to a multiple of [`VECTOR_LANES`] in both directions, so
//! convolution can read every tap without edge checks and 4-wide loads never
//! leave the allocation. Every pixel outside the source is written according
//! to a [`BorderPolicy`].


use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::transpose::transpose;
use crate::{EXTENSION_BORDER, VECTOR_LANES};

/// How pixels outside the source image are filled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Constant 0.
    Zero,
    /// Nearest edge pixel.
    #[default]
    Replicate,
    /// Reflection about the edge pixel (`-1 -> 1`), repeated for small images.
    Mirror,
}

impl BorderPolicy {
    /// Map a possibly out-of-range coordinate onto `0..n`.
    ///
    /// Returns `None` when the pixel has no source (zero padding).
    #[inline]
    pub fn source_coord(self, i: isize, n: usize) -> Option<usize> {
        debug_assert!(n > 0);
        let n = n as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        match self {
            BorderPolicy::Zero => None,
            BorderPolicy::Replicate => Some(i.clamp(0, n - 1) as usize),
            BorderPolicy::Mirror => {
                if n == 1 {
                    return Some(0);
                }
                let period = 2 * (n - 1);
                let m = i.rem_euclid(period);
                let reflected = if m < n { m } else { period - m };
                Some(reflected as usize)
            }
        }
    }
}

/// Canvas dimension for a source dimension: border on both sides, rounded up
/// to a whole number of vector lanes.
#[inline]
pub fn padded_dim(n: usize) -> usize {
    (n + 2 * EXTENSION_BORDER).next_multiple_of(VECTOR_LANES)
}

/// A float canvas with the source image centered inside its border.
///
/// `cols x rows` is the source size; the interior occupies
/// `[EXTENSION_BORDER, EXTENSION_BORDER + cols)` horizontally and
/// `[EXTENSION_BORDER, EXTENSION_BORDER + rows)` vertically.
#[derive(Debug, PartialEq)]
pub struct Canvas {
    grid: Grid<f32>,
    cols: usize,
    rows: usize,
}

impl Canvas {
    /// Wrap an existing grid, checking that it can hold a bordered
    /// `cols x rows` image.
    pub fn from_grid(grid: Grid<f32>, cols: usize, rows: usize) -> Result<Self> {
        let canvas = Self { grid, cols, rows };
        canvas.validate()?;
        Ok(canvas)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let need_w = self.cols.checked_add(2 * EXTENSION_BORDER);
        let need_h = self.rows.checked_add(2 * EXTENSION_BORDER);
        let fits = need_w.is_some_and(|w| w <= self.grid.width())
            && need_h.is_some_and(|h| h <= self.grid.height());
        if !fits {
            return Err(Error::CanvasTooSmall {
                width: self.grid.width(),
                height: self.grid.height(),
                cols: self.cols,
                rows: self.rows,
                border: EXTENSION_BORDER,
            });
        }
        Ok(())
    }

    /// Source image width.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Source image height.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Canvas width (`newCols`).
    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Canvas height (`newRows`).
    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[inline]
    pub fn grid(&self) -> &Grid<f32> {
        &self.grid
    }

    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid<f32> {
        &mut self.grid
    }

    #[inline]
    pub fn into_grid(self) -> Grid<f32> {
        self.grid
    }

    /// Replace the pixel data, keeping the geometry.
    pub(crate) fn replace_grid(&mut self, grid: Grid<f32>) {
        debug_assert_eq!(grid.dims(), self.grid.dims());
        self.grid = grid;
    }

    /// Value at source coordinates `(x, y)`.
    #[inline]
    pub fn interior(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.cols && y < self.rows, "({}, {}) outside interior", x, y);
        self.grid[(x + EXTENSION_BORDER, y + EXTENSION_BORDER)]
    }

    /// Copy of the interior region.
    pub fn interior_grid(&self) -> Result<Grid<f32>> {
        self.grid
            .try_crop(EXTENSION_BORDER, EXTENSION_BORDER, self.cols, self.rows)
    }

    /// Transposed canvas: rows become columns, source dimensions swap too.
    pub fn transposed(&self) -> Result<Self> {
        Ok(Self {
            grid: transpose(&self.grid)?,
            cols: self.rows,
            rows: self.cols,
        })
    }
}

/// Copy `source` into the center of a new bordered float canvas.
pub fn extend(source: &Grid<u32>, policy: BorderPolicy) -> Result<Canvas> {
    let (cols, rows) = source.dims();
    if cols == 0 || rows == 0 {
        return Err(Error::EmptyImage);
    }

    let new_cols = padded_dim(cols);
    let new_rows = padded_dim(rows);
    if new_cols != cols + 2 * EXTENSION_BORDER || new_rows != rows + 2 * EXTENSION_BORDER {
        tracing::debug!(
            cols,
            rows,
            new_cols,
            new_rows,
            "padding canvas to a multiple of {} lanes",
            VECTOR_LANES
        );
    }

    let mut grid = Grid::<f32>::try_new(new_cols, new_rows)?;
    let border = EXTENSION_BORDER as isize;

    for (cy, out_row) in grid.rows_mut().enumerate() {
        let Some(sy) = policy.source_coord(cy as isize - border, rows) else {
            out_row.fill(0.0);
            continue;
        };
        let src_row = source.row(sy);

        let interior = &mut out_row[EXTENSION_BORDER..EXTENSION_BORDER + cols];
        for (dst, &src) in interior.iter_mut().zip(src_row) {
            *dst = src as f32;
        }

        let outside = (0..EXTENSION_BORDER).chain(EXTENSION_BORDER + cols..new_cols);
        for cx in outside {
            out_row[cx] = policy
                .source_coord(cx as isize - border, cols)
                .map_or(0.0, |sx| src_row[sx] as f32);
        }
    }

    Ok(Canvas { grid, cols, rows })
}
