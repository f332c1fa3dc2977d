//! Plain-array lane, used on targets without a native implementation and as
//! the reference in SIMD tests.

use super::VectorLane;
use crate::VECTOR_LANES;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PortableLane([f32; VECTOR_LANES]);

impl VectorLane for PortableLane {
    #[inline(always)]
    fn zero() -> Self {
        Self([0.0; VECTOR_LANES])
    }

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self([value; VECTOR_LANES])
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0; VECTOR_LANES];
        lanes.copy_from_slice(&src[..VECTOR_LANES]);
        Self(lanes)
    }

    #[inline(always)]
    fn from_array(values: [f32; VECTOR_LANES]) -> Self {
        Self(values)
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + other.0[i]))
    }

    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] * other.0[i]))
    }

    #[inline(always)]
    fn hsum(self) -> f32 {
        let [a, b, c, d] = self.0;
        (a + b) + (c + d)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..VECTOR_LANES].copy_from_slice(&self.0);
    }
}
