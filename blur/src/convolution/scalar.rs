//! Reference per-pixel kernels.

use crate::FILTER_SIZE;

/// Taps on each side of the center.
pub(crate) const RADIUS: usize = FILTER_SIZE / 2;

/// `sum(taps[k] * row[x + k - RADIUS])`.
#[inline(always)]
pub(crate) fn convolve_pixel_1d(row: &[f32], x: usize, taps: &[f32; FILTER_SIZE]) -> f32 {
    let window = &row[x - RADIUS..x + RADIUS + 1];
    window.iter().zip(taps).map(|(&v, &w)| v * w).sum()
}

#[inline]
pub(crate) fn convolve_row_1d(
    src: &[f32],
    dst: &mut [f32],
    taps: &[f32; FILTER_SIZE],
    start: usize,
    end: usize,
) {
    for x in start..end {
        dst[x] = convolve_pixel_1d(src, x, taps);
    }
}

#[inline(always)]
pub(crate) fn convolve_pixel_2d(
    rows: &[&[f32]; FILTER_SIZE],
    x: usize,
    weights: &[[f32; FILTER_SIZE]; FILTER_SIZE],
) -> f32 {
    let mut sum = 0.0f32;
    for (row, taps) in rows.iter().zip(weights) {
        sum += convolve_pixel_1d(row, x, taps);
    }
    sum
}

#[inline]
pub(crate) fn convolve_row_2d(
    rows: &[&[f32]; FILTER_SIZE],
    dst: &mut [f32],
    weights: &[[f32; FILTER_SIZE]; FILTER_SIZE],
    start: usize,
    end: usize,
) {
    for x in start..end {
        dst[x] = convolve_pixel_2d(rows, x, weights);
    }
}
