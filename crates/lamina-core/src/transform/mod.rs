//! Operator library: color matrices, convolution, downscale and mosaic.
//!
//! Every operator is a configuration value implementing [`Operator`]. An
//! operator reads a frozen input grid and returns a new one; nothing is
//! updated in place, so output pixels never observe already-written
//! neighbors.

pub mod color_matrix;
pub mod convolution;
pub mod mosaic;
pub mod params;
pub mod resize;

use std::fmt;

use rayon::prelude::*;

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::pixel::Pixel;

pub use color_matrix::ColorMatrix;
pub use convolution::{Convolution, Kernel};
pub use mosaic::Mosaic;
pub use resize::Resize;

/// Tolerance added before truncating a summed channel, so sums that land a
/// hair under an integer (e.g. `199.99999`) keep their intended value.
const TRUNCATE_EPSILON: f64 = 1e-6;

/// A pure transformation from one grid to another.
pub trait Operator: Send + Sync + fmt::Debug {
    /// Short label for logs and messages.
    fn name(&self) -> &str;

    /// Produce a new grid from `grid`. Never mutates the input.
    fn apply(&self, grid: &PixelGrid) -> Result<PixelGrid, EditError>;
}

/// `max(0, min(255, round(value)))`.
pub(crate) fn clamp_round(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Clamp to `[0, 255]`, then drop the fraction.
pub(crate) fn clamp_truncate(value: f64) -> u8 {
    (value + TRUNCATE_EPSILON).clamp(0.0, 255.0) as u8
}

/// Compute every output row in parallel. `fill` receives the row index and
/// the destination slice for that row.
pub(crate) fn par_map_rows<F>(grid: &PixelGrid, fill: F) -> PixelGrid
where
    F: Fn(usize, &mut [Pixel]) + Sync + Send,
{
    let width = grid.width() as usize;
    let mut out = vec![Pixel::BLACK; grid.len()];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, dst)| fill(row, dst));
    grid.derive(out)
}
