//! Float to integer pixel conversion.

use crate::error::Result;
use crate::grid::Grid;

/// Integer pixels plus the number of values that had to be clamped.
#[derive(Debug, PartialEq)]
pub struct Quantized {
    pub pixels: Grid<u32>,
    pub clamped: usize,
}

/// Truncate every value toward zero and clamp it into `[0, max_value]`.
///
/// Values that truncate below zero and NaN become 0, values above
/// `max_value` become `max_value`; each such value is counted in
/// [`Quantized::clamped`].
pub fn quantize(grid: &Grid<f32>, max_value: u32) -> Result<Quantized> {
    let mut pixels = Grid::<u32>::try_new(grid.width(), grid.height())?;
    let mut clamped = 0usize;

    for (dst, &v) in pixels.as_mut_slice().iter_mut().zip(grid.as_slice()) {
        // `as` truncates toward zero and saturates, so (-1, 0) maps to 0 in range
        *dst = if v.is_nan() || v <= -1.0 {
            clamped += 1;
            0
        } else {
            let t = v as u32;
            if t > max_value {
                clamped += 1;
                max_value
            } else {
                t
            }
        };
    }

    if clamped > 0 {
        tracing::warn!(
            clamped,
            max_value,
            "clamped out-of-range values during quantization"
        );
    }

    Ok(Quantized { pixels, clamped })
}
