//! Tests for the convolution engine.

use std::str::FromStr;

use strum::IntoEnumIterator;

use super::*;
use crate::border::{BorderPolicy, extend};
use crate::error::Error;
use crate::grid::Grid;

fn gradient(cols: usize, rows: usize) -> Grid<u32> {
    Grid::try_from_fn(cols, rows, |x, y| ((x * 3 + y * 5) % 64) as u32).unwrap()
}

fn uniform(cols: usize, rows: usize, value: u32) -> Grid<u32> {
    Grid::try_from_fn(cols, rows, |_, _| value).unwrap()
}

fn row_kernel() -> Kernel {
    Kernel::gaussian_row(FILTER_SIZE, 3.0).unwrap()
}

fn matrix_kernel() -> Kernel {
    Kernel::gaussian(FILTER_SIZE, FILTER_SIZE, 3.0).unwrap()
}

fn kernel_for(strategy: Strategy) -> Kernel {
    if strategy.is_separable() {
        row_kernel()
    } else {
        matrix_kernel()
    }
}

fn blurred(source: &Grid<u32>, policy: BorderPolicy, strategy: Strategy) -> Canvas {
    let mut canvas = extend(source, policy).unwrap();
    convolve(&mut canvas, &kernel_for(strategy), strategy).unwrap();
    canvas
}

fn assert_interior_close(a: &Canvas, b: &Canvas, rel: f32) {
    assert_eq!((a.cols(), a.rows()), (b.cols(), b.rows()));
    for y in 0..a.rows() {
        for x in 0..a.cols() {
            let (va, vb) = (a.interior(x, y), b.interior(x, y));
            let tol = rel * va.abs().max(1.0);
            assert!(
                (va - vb).abs() <= tol,
                "({}, {}): {} vs {}",
                x,
                y,
                va,
                vb
            );
        }
    }
}

// ============================================================================
// Agreement between strategies
// ============================================================================

#[test]
fn test_vector_1d_matches_scalar_1d() {
    let source = gradient(64, 64);
    let mut scalar = extend(&source, BorderPolicy::Replicate).unwrap();
    let mut vector = extend(&source, BorderPolicy::Replicate).unwrap();
    convolve_1d(&mut scalar, &row_kernel(), false).unwrap();
    convolve_1d(&mut vector, &row_kernel(), true).unwrap();

    // Same pixels are computed, so the whole canvas must agree
    for (i, (s, v)) in scalar
        .grid()
        .as_slice()
        .iter()
        .zip(vector.grid().as_slice())
        .enumerate()
    {
        assert!((s - v).abs() <= 1e-4, "index {}: {} vs {}", i, s, v);
    }
}

#[test]
fn test_vector_2d_matches_scalar_2d() {
    let source = gradient(37, 22);
    let scalar = blurred(&source, BorderPolicy::Mirror, Strategy::Scalar2D);
    let vector = blurred(&source, BorderPolicy::Mirror, Strategy::Vector2D);
    assert_interior_close(&scalar, &vector, 1e-4);
}

#[test]
fn test_separable_matches_full_2d() {
    for (cols, rows) in [(16, 16), (21, 9), (5, 30)] {
        let source = gradient(cols, rows);
        for policy in BorderPolicy::iter() {
            let separable = blurred(&source, policy, Strategy::Scalar1D);
            let full = blurred(&source, policy, Strategy::Scalar2D);
            assert_interior_close(&separable, &full, 1e-3);
        }
    }
}

#[test]
fn test_all_strategies_agree() {
    let source = gradient(19, 27);
    let reference = blurred(&source, BorderPolicy::Replicate, Strategy::Scalar2D);
    for strategy in Strategy::iter() {
        let canvas = blurred(&source, BorderPolicy::Replicate, strategy);
        assert_interior_close(&reference, &canvas, 1e-3);
    }
}

// ============================================================================
// Filter behavior
// ============================================================================

#[test]
fn test_uniform_image_is_preserved_with_replicate() {
    let source = uniform(16, 16, 100);
    for strategy in Strategy::iter() {
        let canvas = blurred(&source, BorderPolicy::Replicate, strategy);
        for y in 0..16 {
            for x in 0..16 {
                let v = canvas.interior(x, y);
                assert!((v - 100.0).abs() < 0.1, "{} at ({}, {}): {}", strategy, x, y, v);
            }
        }
    }
}

#[test]
fn test_zero_border_darkens_edges_only() {
    let source = uniform(24, 24, 100);
    let canvas = blurred(&source, BorderPolicy::Zero, Strategy::Vector1D);
    // Far from the edge the kernel only sees the image
    assert!((canvas.interior(12, 12) - 100.0).abs() < 0.1);
    // Corner sees zeros on two sides
    assert!(canvas.interior(0, 0) < 60.0);
    assert!(canvas.interior(0, 12) < canvas.interior(3, 12));
}

#[test]
fn test_impulse_response_is_outer_product() {
    let mut source = uniform(15, 15, 0);
    source[(7, 7)] = 1000;
    let taps = row_kernel().taps(0).unwrap();

    let canvas = blurred(&source, BorderPolicy::Zero, Strategy::Vector1D);
    for dy in 0..FILTER_SIZE {
        for dx in 0..FILTER_SIZE {
            let expected = 1000.0 * taps[dy] * taps[dx];
            let actual = canvas.interior(4 + dx, 4 + dy);
            assert!((actual - expected).abs() < 1e-2, "({}, {})", dx, dy);
        }
    }
    // Outside the support nothing leaks
    assert_eq!(canvas.interior(0, 7), 0.0);
    assert_eq!(canvas.interior(7, 14), 0.0);
}

#[test]
fn test_identity_kernel_leaves_interior_unchanged() {
    let source = gradient(13, 11);
    let identity = Kernel::from_weights(1, FILTER_SIZE, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
        .unwrap();
    let expected = extend(&source, BorderPolicy::Mirror)
        .unwrap()
        .interior_grid()
        .unwrap();
    for vectorized in [false, true] {
        let mut canvas = extend(&source, BorderPolicy::Mirror).unwrap();
        convolve_separable(&mut canvas, &identity, vectorized).unwrap();
        assert_eq!(canvas.interior_grid().unwrap(), expected);
    }
}

#[test]
fn test_1d_pass_only_writes_interior_columns() {
    let source = gradient(10, 6);
    let original = extend(&source, BorderPolicy::Replicate).unwrap();
    for vectorized in [false, true] {
        let mut canvas = extend(&source, BorderPolicy::Replicate).unwrap();
        convolve_1d(&mut canvas, &row_kernel(), vectorized).unwrap();
        for y in 0..canvas.height() {
            for x in (0..EXTENSION_BORDER).chain(EXTENSION_BORDER + 10..canvas.width()) {
                assert_eq!(canvas.grid()[(x, y)], original.grid()[(x, y)]);
            }
        }
    }
}

#[test]
fn test_1d_pass_filters_border_rows() {
    // Canvas row 0 mirrors source row 8, which varies along x
    let source = gradient(10, 10);
    let original = extend(&source, BorderPolicy::Mirror).unwrap();
    let mut canvas = extend(&source, BorderPolicy::Mirror).unwrap();
    convolve_1d(&mut canvas, &row_kernel(), false).unwrap();
    let changed = (EXTENSION_BORDER..EXTENSION_BORDER + 10)
        .any(|x| canvas.grid()[(x, 0)] != original.grid()[(x, 0)]);
    assert!(changed);
}

#[test]
fn test_2d_pass_only_writes_interior() {
    let source = gradient(9, 7);
    let original = extend(&source, BorderPolicy::Replicate).unwrap();
    for vectorized in [false, true] {
        let mut canvas = extend(&source, BorderPolicy::Replicate).unwrap();
        convolve_2d(&mut canvas, &matrix_kernel(), vectorized).unwrap();
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let inside = (EXTENSION_BORDER..EXTENSION_BORDER + 9).contains(&x)
                    && (EXTENSION_BORDER..EXTENSION_BORDER + 7).contains(&y);
                if !inside {
                    assert_eq!(canvas.grid()[(x, y)], original.grid()[(x, y)]);
                }
            }
        }
    }
}

#[test]
fn test_single_pixel_image() {
    let source = uniform(1, 1, 42);
    for strategy in Strategy::iter() {
        let canvas = blurred(&source, BorderPolicy::Replicate, strategy);
        assert!((canvas.interior(0, 0) - 42.0).abs() < 1e-3);
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_wrong_kernel_shape_rejected() {
    let mut canvas = extend(&gradient(8, 8), BorderPolicy::Zero).unwrap();
    let before = extend(&gradient(8, 8), BorderPolicy::Zero).unwrap();

    assert!(matches!(
        convolve_1d(&mut canvas, &matrix_kernel(), false),
        Err(Error::KernelShape { expected: (1, 7), actual: (7, 7) })
    ));
    assert!(matches!(
        convolve_2d(&mut canvas, &row_kernel(), true),
        Err(Error::KernelShape { expected: (7, 7), actual: (1, 7) })
    ));
    let short = Kernel::gaussian_row(5, 1.0).unwrap();
    assert!(matches!(
        convolve(&mut canvas, &short, Strategy::Vector1D),
        Err(Error::KernelShape { .. })
    ));
    // Failed calls leave the canvas alone
    assert_eq!(canvas, before);
}

// ============================================================================
// Strategy
// ============================================================================

#[test]
fn test_strategy_names() {
    assert_eq!(Strategy::default(), Strategy::Vector1D);
    assert_eq!(Strategy::Scalar2D.to_string(), "scalar-2d");
    assert_eq!(Strategy::from_str("vector-1d").unwrap(), Strategy::Vector1D);
    assert_eq!(Strategy::from_str("SCALAR-1D").unwrap(), Strategy::Scalar1D);
    assert!(Strategy::from_str("vector").is_err());
}

#[test]
fn test_strategy_properties() {
    assert!(Strategy::Scalar1D.is_separable());
    assert!(!Strategy::Scalar1D.is_vectorized());
    assert!(Strategy::Vector2D.is_vectorized());
    assert_eq!(Strategy::Vector2D.kernel_rows(), FILTER_SIZE);
    assert_eq!(Strategy::Vector1D.kernel_rows(), 1);
}
