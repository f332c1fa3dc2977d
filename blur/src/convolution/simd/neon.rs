//! ARM NEON implementation of [`VectorLane`] (aarch64).
//!
//! NEON is always available on aarch64.

use std::arch::aarch64::*;

use super::VectorLane;
use crate::VECTOR_LANES;

#[derive(Clone, Copy)]
pub(crate) struct NeonLane(float32x4_t);

impl VectorLane for NeonLane {
    #[inline(always)]
    fn zero() -> Self {
        unsafe { Self(vdupq_n_f32(0.0)) }
    }

    #[inline(always)]
    fn splat(value: f32) -> Self {
        unsafe { Self(vdupq_n_f32(value)) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let src = &src[..VECTOR_LANES];
        // SAFETY: `src` holds four initialized f32s.
        unsafe { Self(vld1q_f32(src.as_ptr())) }
    }

    #[inline(always)]
    fn from_array(values: [f32; VECTOR_LANES]) -> Self {
        unsafe { Self(vld1q_f32(values.as_ptr())) }
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        unsafe { Self(vaddq_f32(self.0, other.0)) }
    }

    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        unsafe { Self(vmulq_f32(self.0, other.0)) }
    }

    #[inline(always)]
    fn hsum(self) -> f32 {
        unsafe {
            // Pairwise add gives [a+b, c+d, a+b, c+d]
            let pairs = vpaddq_f32(self.0, self.0);
            vgetq_lane_f32::<0>(pairs) + vgetq_lane_f32::<1>(pairs)
        }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        let dst = &mut dst[..VECTOR_LANES];
        // SAFETY: `dst` has room for four f32s.
        unsafe { vst1q_f32(dst.as_mut_ptr(), self.0) }
    }
}
