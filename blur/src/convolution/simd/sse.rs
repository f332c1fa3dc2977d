//! SSE implementation of [`VectorLane`] (x86_64).
//!
//! Only SSE/SSE2 instructions are used, both part of the x86_64 baseline, so
//! no runtime feature detection is needed.

use std::arch::x86_64::*;

use super::VectorLane;
use crate::VECTOR_LANES;

#[derive(Clone, Copy)]
pub(crate) struct SseLane(__m128);

impl VectorLane for SseLane {
    #[inline(always)]
    fn zero() -> Self {
        unsafe { Self(_mm_setzero_ps()) }
    }

    #[inline(always)]
    fn splat(value: f32) -> Self {
        unsafe { Self(_mm_set1_ps(value)) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let src = &src[..VECTOR_LANES];
        // SAFETY: `src` holds four initialized f32s; loadu has no alignment
        // requirement.
        unsafe { Self(_mm_loadu_ps(src.as_ptr())) }
    }

    #[inline(always)]
    fn from_array(values: [f32; VECTOR_LANES]) -> Self {
        unsafe { Self(_mm_loadu_ps(values.as_ptr())) }
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        unsafe { Self(_mm_add_ps(self.0, other.0)) }
    }

    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        unsafe { Self(_mm_mul_ps(self.0, other.0)) }
    }

    #[inline(always)]
    fn hsum(self) -> f32 {
        unsafe {
            let v = self.0;
            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(v, v); // [b, a, d, c]
            let sums = _mm_add_ps(v, shuf); // [a+b, a+b, c+d, c+d]
            let high = _mm_movehl_ps(shuf, sums); // [c+d, c+d, ..]
            _mm_cvtss_f32(_mm_add_ss(sums, high))
        }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        let dst = &mut dst[..VECTOR_LANES];
        // SAFETY: `dst` has room for four f32s; storeu has no alignment
        // requirement.
        unsafe { _mm_storeu_ps(dst.as_mut_ptr(), self.0) }
    }
}
