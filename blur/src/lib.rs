//! Blur - separable Gaussian blur for single-channel rasters.
//!
//! The pipeline extends the source into a bordered float canvas, convolves it
//! with a 7-tap Gaussian (scalar or 4-lane SIMD, separable or full 2D),
//! and quantizes the result back to integer pixels.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use blur::{BlurConfig, Strategy, blur, load_pgm, save_pgm};
//!
//! let image = load_pgm("input.pgm")?;
//! let config = BlurConfig {
//!     strategy: Strategy::Vector1D,
//!     ..BlurConfig::default()
//! };
//! let blurred = blur(&image.pixels, image.max_value, &config)?;
//! save_pgm("output.pgm", &blurred.pixels, image.max_value)?;
//! ```

pub mod border;
pub mod convolution;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod pipeline;
pub mod pnm;
pub mod quantize;
pub mod transpose;

/// Width of the border added around the source on every side.
pub const EXTENSION_BORDER: usize = 8;

/// Taps per kernel row (and rows of the 2D kernel).
pub const FILTER_SIZE: usize = 7;

/// Lanes per SIMD vector; canvas dimensions are multiples of this.
pub const VECTOR_LANES: usize = 4;

const _: () = assert!(EXTENSION_BORDER >= FILTER_SIZE / 2 + VECTOR_LANES);

pub use border::{BorderPolicy, Canvas, extend};
pub use convolution::{Strategy, convolve, convolve_1d, convolve_2d, convolve_separable};
pub use error::{Error, Result};
pub use grid::{Element, Grid};
pub use kernel::{Kernel, REFERENCE_ROW};
pub use pipeline::{BlurConfig, Blurred, OutputRegion, blur};
pub use pnm::{PgmImage, load_pgm, read_pgm, save_pgm, write_pgm};
pub use quantize::{Quantized, quantize};
pub use transpose::transpose;
