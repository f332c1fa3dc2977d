//! Error types for the blur pipeline.

use std::io;

use thiserror::Error;

/// Errors that can occur while building buffers, kernels or running a blur.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to allocate {width}x{height} grid ({bytes} bytes)")]
    Allocation {
        width: usize,
        height: usize,
        bytes: usize,
    },

    #[error("Invalid kernel parameters: {0}")]
    InvalidKernel(String),

    #[error("Kernel shape mismatch: expected {expected:?}, got {actual:?}")]
    KernelShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(
        "Canvas {width}x{height} is too small for a {cols}x{rows} image with a {border} pixel border"
    )]
    CanvasTooSmall {
        width: usize,
        height: usize,
        cols: usize,
        rows: usize,
        border: usize,
    },

    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Malformed PGM: {0}")]
    Pgm(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
