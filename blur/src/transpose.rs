//! Matrix transpose used to turn a vertical pass into a horizontal one.

use crate::error::Result;
use crate::grid::{Element, Grid};

/// Tile edge; a 16x16 f32 tile is 1 KiB, comfortably inside L1.
const TILE: usize = 16;

/// Return a new `height x width` grid with `out[(y, x)] = grid[(x, y)]`.
///
/// Works in square tiles so both the reads and the writes stay within a few
/// cache lines at a time.
pub fn transpose<T: Element>(grid: &Grid<T>) -> Result<Grid<T>> {
    let (width, height) = grid.dims();
    let mut out = Grid::<T>::try_new(height, width)?;

    let src = grid.as_slice();
    let dst = out.as_mut_slice();

    for y0 in (0..height).step_by(TILE) {
        let y1 = (y0 + TILE).min(height);
        for x0 in (0..width).step_by(TILE) {
            let x1 = (x0 + TILE).min(width);
            for y in y0..y1 {
                let src_row = &src[y * width..(y + 1) * width];
                for x in x0..x1 {
                    dst[x * height + y] = src_row[x];
                }
            }
        }
    }

    Ok(out)
}
