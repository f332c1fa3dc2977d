//! End-to-end blur: extend, convolve, quantize.


use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::FILTER_SIZE;
use crate::border::{BorderPolicy, extend};
use crate::convolution::{Strategy, convolve};
use crate::error::Result;
use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::quantize::{Quantized, quantize};

/// Which part of the blurred canvas is returned.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum OutputRegion {
    /// `cols x rows`, aligned with the source.
    #[default]
    Interior,
    /// The whole extended canvas, border included.
    Canvas,
}

/// Blur parameters. Every field has a default, so a YAML file only needs the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub sigma: f32,
    pub strategy: Strategy,
    pub border: BorderPolicy,
    pub region: OutputRegion,
    /// Use [`crate::REFERENCE_ROW`] instead of generating weights from
    /// `sigma`.
    pub reference_row: bool,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            sigma: 3.0,
            strategy: Strategy::default(),
            border: BorderPolicy::default(),
            region: OutputRegion::default(),
            reference_row: false,
        }
    }
}

impl BlurConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Kernel matching the configured strategy: 1x7 for separable
    /// strategies, 7x7 otherwise.
    pub fn kernel(&self) -> Result<Kernel> {
        let row = if self.reference_row {
            Kernel::reference_row()?
        } else {
            Kernel::gaussian_row(FILTER_SIZE, self.sigma)?
        };
        if self.strategy.is_separable() {
            Ok(row)
        } else if self.reference_row {
            row.outer_product()
        } else {
            Kernel::gaussian(FILTER_SIZE, FILTER_SIZE, self.sigma)
        }
    }
}

/// Blurred integer pixels.
#[derive(Debug, PartialEq)]
pub struct Blurred {
    pub pixels: Grid<u32>,
    /// Values clamped into `[0, max_value]` during quantization.
    pub clamped: usize,
}

/// Blur `source` (values in `0..=max_value`) according to `config`.
pub fn blur(source: &Grid<u32>, max_value: u32, config: &BlurConfig) -> Result<Blurred> {
    let start = Instant::now();
    let kernel = config.kernel()?;

    let mut canvas = extend(source, config.border)?;
    tracing::debug!(
        cols = canvas.cols(),
        rows = canvas.rows(),
        new_cols = canvas.width(),
        new_rows = canvas.height(),
        border = %config.border,
        "extended source"
    );

    convolve(&mut canvas, &kernel, config.strategy)?;

    let grid = match config.region {
        OutputRegion::Interior => canvas.interior_grid()?,
        OutputRegion::Canvas => canvas.into_grid(),
    };
    let Quantized { pixels, clamped } = quantize(&grid, max_value)?;

    tracing::info!(
        width = source.width(),
        height = source.height(),
        strategy = %config.strategy,
        region = %config.region,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "blur complete"
    );

    Ok(Blurred { pixels, clamped })
}
