//! Tests for the vectorized row kernels.

use super::portable::PortableLane;
use super::*;
use crate::kernel::{Kernel, REFERENCE_ROW};

fn gradient(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i % 37) as f32 * 0.5 + 1.0).collect()
}

fn assert_close(a: &[f32], b: &[f32], tol: f32) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!((x - y).abs() <= tol, "index {}: {} vs {}", i, x, y);
    }
}

// ============================================================================
// Lane operations
// ============================================================================

fn check_lane_ops<L: VectorLane>() {
    let a = L::from_array([1.0, 2.0, 3.0, 4.0]);
    let b = L::splat(2.0);
    assert_eq!(a.add(b).to_array(), [3.0, 4.0, 5.0, 6.0]);
    assert_eq!(a.mul(b).to_array(), [2.0, 4.0, 6.0, 8.0]);
    assert_eq!(L::zero().to_array(), [0.0; 4]);
    assert_eq!(a.hsum(), 10.0);

    let data = [9.0f32, 8.0, 7.0, 6.0, 5.0, 4.0];
    assert_eq!(L::load(&data[1..]).to_array(), [8.0, 7.0, 6.0, 5.0]);
}

#[test]
fn test_portable_lane_ops() {
    check_lane_ops::<PortableLane>();
}

#[test]
fn test_native_lane_ops() {
    check_lane_ops::<NativeLane>();
}

#[test]
fn test_native_hsum_matches_portable() {
    let values = [0.1f32, 1e6, -0.3, 7.25];
    assert_eq!(
        NativeLane::from_array(values).hsum(),
        PortableLane::from_array(values).hsum()
    );
}

#[test]
#[should_panic]
fn test_load_short_slice_panics() {
    let data = [1.0f32, 2.0, 3.0];
    let _ = PortableLane::load(&data);
}

// ============================================================================
// Row kernels
// ============================================================================

#[test]
fn test_row_taps_layout() {
    let taps = RowTaps::<PortableLane>::new(&REFERENCE_ROW);
    let [k0, k1, k2, k3, k4, k5, k6] = REFERENCE_ROW;
    // Lane 0 reads x-3..=x+3 across the lo and mid windows
    assert_eq!(taps.lo[0].to_array(), [0.0, k0, k1, k2]);
    assert_eq!(taps.mid[0].to_array(), [k3, k4, k5, k6]);
    assert_eq!(taps.hi[0].to_array(), [0.0; 4]);
    // Lane 3 only reads the mid and hi windows
    assert_eq!(taps.lo[3].to_array(), [0.0; 4]);
    assert_eq!(taps.mid[3].to_array(), [k0, k1, k2, k3]);
    assert_eq!(taps.hi[3].to_array(), [k4, k5, k6, 0.0]);
}

fn check_row_1d<L: VectorLane>(width: usize) {
    let src = gradient(width);
    let taps = REFERENCE_ROW;
    let start = 8;
    let end = width - 8;

    let mut expected = vec![-1.0f32; width];
    scalar::convolve_row_1d(&src, &mut expected, &taps, start, end);

    let mut actual = vec![-1.0f32; width];
    convolve_row_1d(&src, &mut actual, &RowTaps::<L>::new(&taps), start, end);

    assert_close(&actual, &expected, 1e-4);
    // Nothing outside the range is touched
    assert!(actual[..start].iter().all(|&v| v == -1.0));
    assert!(actual[end..].iter().all(|&v| v == -1.0));
}

#[test]
fn test_row_1d_matches_scalar() {
    for width in [20, 24, 64, 101] {
        check_row_1d::<PortableLane>(width);
        check_row_1d::<NativeLane>(width);
    }
}

#[test]
fn test_row_1d_native_matches_portable_exactly() {
    let src = gradient(80);
    let mut native = vec![0.0f32; 80];
    let mut portable = vec![0.0f32; 80];
    let native_taps = RowTaps::<NativeLane>::new(&REFERENCE_ROW);
    let portable_taps = RowTaps::<PortableLane>::new(&REFERENCE_ROW);
    convolve_row_1d(&src, &mut native, &native_taps, 8, 72);
    convolve_row_1d(&src, &mut portable, &portable_taps, 8, 72);
    assert_eq!(native, portable);
}

#[test]
fn test_row_1d_asymmetric_taps() {
    // Detects a reversed or shifted tap layout
    let taps = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    let src: Vec<f32> = (0..32).map(|i| i as f32).collect();
    let mut dst = vec![0.0f32; 32];
    convolve_row_1d(&src, &mut dst, &RowTaps::<NativeLane>::new(&taps), 8, 24);
    for x in 8..24 {
        assert_eq!(dst[x], scalar::convolve_pixel_1d(&src, x, &taps), "x = {}", x);
    }
}

fn matrix(kernel: &Kernel) -> [[f32; FILTER_SIZE]; FILTER_SIZE] {
    std::array::from_fn(|r| kernel.taps(r).unwrap())
}

fn check_row_2d<L: VectorLane>(width: usize) {
    let kernel = Kernel::gaussian(FILTER_SIZE, FILTER_SIZE, 3.0).unwrap();
    let weights = matrix(&kernel);
    let data: Vec<Vec<f32>> = (0..FILTER_SIZE)
        .map(|r| gradient(width + r).split_off(r))
        .collect();
    let rows: [&[f32]; FILTER_SIZE] = std::array::from_fn(|r| data[r].as_slice());

    let mut expected = vec![0.0f32; width];
    scalar::convolve_row_2d(&rows, &mut expected, &weights, 8, width - 8);

    let mut actual = vec![0.0f32; width];
    convolve_row_2d(&rows, &mut actual, &MatrixTaps::<L>::new(&weights), 8, width - 8);

    assert_close(&actual, &expected, 1e-4);
}

#[test]
fn test_row_2d_matches_scalar() {
    for width in [17, 32, 45] {
        check_row_2d::<PortableLane>(width);
        check_row_2d::<NativeLane>(width);
    }
}
