//! 4-lane vectorized convolution kernels.
//!
//! The kernels are written once against the [`VectorLane`] trait and
//! instantiated with the native lane type for the target:
//! - SSE on x86_64
//! - NEON on aarch64
//! - a portable `[f32; 4]` lane everywhere else
//!
//! The portable lane also serves as a reference in tests, since it performs
//! the same operations in the same order as the hardware lanes.

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

pub(crate) mod portable;

#[cfg(test)]
mod tests;

use crate::{FILTER_SIZE, VECTOR_LANES};

use super::scalar;
use super::scalar::RADIUS;

#[cfg(target_arch = "x86_64")]
pub(crate) type NativeLane = sse::SseLane;

#[cfg(target_arch = "aarch64")]
pub(crate) type NativeLane = neon::NeonLane;

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub(crate) type NativeLane = portable::PortableLane;

/// A vector of four f32 lanes.
///
/// `load` and `store` touch the first four elements of the slice and panic if
/// it is shorter. Neither requires alignment.
pub(crate) trait VectorLane: Copy + Send + Sync {
    fn zero() -> Self;
    fn splat(value: f32) -> Self;
    fn load(src: &[f32]) -> Self;
    fn from_array(values: [f32; VECTOR_LANES]) -> Self;
    fn add(self, other: Self) -> Self;
    fn mul(self, other: Self) -> Self;
    /// Sum of all lanes, reduced pairwise: `(l0 + l1) + (l2 + l3)`.
    fn hsum(self) -> f32;
    fn store(self, dst: &mut [f32]);

    #[inline(always)]
    fn to_array(self) -> [f32; VECTOR_LANES] {
        let mut out = [0.0; VECTOR_LANES];
        self.store(&mut out);
        out
    }
}

/// Shifted coefficient vectors for the 4-outputs-per-iteration row kernel.
///
/// The 7 taps are embedded in a 15-element array with four zeros on each
/// side. Output lane `l` (pixel `x + l`) reads the windows
/// `[x - 4, x)`, `[x, x + 4)` and `[x + 4, x + 8)` against
/// `coef[3 - l..]`, `coef[7 - l..]` and `coef[11 - l..]`.
#[derive(Clone, Copy)]
pub(crate) struct RowTaps<L> {
    lo: [L; VECTOR_LANES],
    mid: [L; VECTOR_LANES],
    hi: [L; VECTOR_LANES],
    taps: [f32; FILTER_SIZE],
}

impl<L: VectorLane> RowTaps<L> {
    pub(crate) fn new(taps: &[f32; FILTER_SIZE]) -> Self {
        let mut coef = [0.0f32; FILTER_SIZE + 2 * VECTOR_LANES];
        coef[VECTOR_LANES..VECTOR_LANES + FILTER_SIZE].copy_from_slice(taps);

        Self {
            lo: std::array::from_fn(|l| L::load(&coef[3 - l..])),
            mid: std::array::from_fn(|l| L::load(&coef[7 - l..])),
            hi: std::array::from_fn(|l| L::load(&coef[11 - l..])),
            taps: *taps,
        }
    }
}

/// Convolve `src[start..end]` into `dst[start..end]`, four pixels at a time.
///
/// Lane 0 has no taps in the right window and lane 3 none in the left one, so
/// those products are skipped. A tail shorter than four pixels is finished by
/// the scalar routine; nothing outside `start..end` is written.
///
/// `src` must extend at least four pixels past both ends of `start..end`.
#[inline(always)]
pub(crate) fn convolve_row_1d<L: VectorLane>(
    src: &[f32],
    dst: &mut [f32],
    taps: &RowTaps<L>,
    start: usize,
    end: usize,
) {
    let mut x = start;
    while x + VECTOR_LANES <= end {
        let a = L::load(&src[x - VECTOR_LANES..]);
        let b = L::load(&src[x..]);
        let c = L::load(&src[x + VECTOR_LANES..]);

        let s0 = a.mul(taps.lo[0]).add(b.mul(taps.mid[0]));
        let s1 = a
            .mul(taps.lo[1])
            .add(b.mul(taps.mid[1]))
            .add(c.mul(taps.hi[1]));
        let s2 = a
            .mul(taps.lo[2])
            .add(b.mul(taps.mid[2]))
            .add(c.mul(taps.hi[2]));
        let s3 = b.mul(taps.mid[3]).add(c.mul(taps.hi[3]));

        L::from_array([s0.hsum(), s1.hsum(), s2.hsum(), s3.hsum()]).store(&mut dst[x..]);
        x += VECTOR_LANES;
    }

    for x in x..end {
        dst[x] = scalar::convolve_pixel_1d(src, x, &taps.taps);
    }
}

/// Per-row weight vectors for the one-pixel-per-iteration 2D kernel.
///
/// Row `r` is split into a leading group `[k0, k1, k2, k3]` read over
/// `[x - 3, x + 1)` and a trailing group `[0, k4, k5, k6]` read over
/// `[x, x + 4)`. The windows overlap at `x`, which the zero weight cancels.
#[derive(Clone, Copy)]
pub(crate) struct MatrixTaps<L> {
    lead: [L; FILTER_SIZE],
    trail: [L; FILTER_SIZE],
}

impl<L: VectorLane> MatrixTaps<L> {
    pub(crate) fn new(weights: &[[f32; FILTER_SIZE]; FILTER_SIZE]) -> Self {
        Self {
            lead: std::array::from_fn(|r| L::load(&weights[r][..VECTOR_LANES])),
            trail: std::array::from_fn(|r| {
                let w = &weights[r];
                L::from_array([0.0, w[4], w[5], w[6]])
            }),
        }
    }
}

/// Full 7x7 convolution of one output row, single horizontal reduction per
/// pixel. `rows` are the seven source rows centered on the output row.
#[inline(always)]
pub(crate) fn convolve_row_2d<L: VectorLane>(
    rows: &[&[f32]; FILTER_SIZE],
    dst: &mut [f32],
    taps: &MatrixTaps<L>,
    start: usize,
    end: usize,
) {
    for x in start..end {
        let mut acc = L::zero();
        for (r, row) in rows.iter().enumerate() {
            let lead = L::load(&row[x - RADIUS..]);
            let trail = L::load(&row[x..]);
            acc = acc.add(lead.mul(taps.lead[r])).add(trail.mul(taps.trail[r]));
        }
        dst[x] = acc.hsum();
    }
}
