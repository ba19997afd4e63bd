//! 3×3 color-matrix transform (grayscale, sepia, user-defined).
//!
//! Each output pixel is `clamp(M · [r, g, b])` with clamp defined as
//! `max(0, min(255, round(v)))`.

use glam::{DMat3, DVec3};

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::pixel::Pixel;
use crate::transform::{Operator, clamp_round, par_map_rows};

/// Rec. 709 luminance weights, one row per output channel.
pub const GRAYSCALE_ROWS: [[f64; 3]; 3] = [
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
];

/// Classic sepia tone.
pub const SEPIA_ROWS: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// A validated color matrix operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatrix {
    name: String,
    matrix: DMat3,
}

impl ColorMatrix {
    /// Build a user-defined matrix from its rows. Must be exactly 3×3 with
    /// finite entries.
    pub fn new(name: impl Into<String>, rows: &[Vec<f64>]) -> Result<Self, EditError> {
        if rows.len() != 3 {
            return Err(EditError::invalid_argument(format!(
                "color matrix must have 3 rows, got {}",
                rows.len()
            )));
        }
        let mut fixed = [[0.0_f64; 3]; 3];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != 3 {
                return Err(EditError::invalid_argument(format!(
                    "color matrix row {i} must have 3 entries, got {}",
                    row.len()
                )));
            }
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(EditError::invalid_argument(format!(
                        "color matrix entry ({i}, {j}) is not finite"
                    )));
                }
                fixed[i][j] = v;
            }
        }
        Ok(Self::from_rows(name, fixed))
    }

    /// Rec. 709 grayscale; output satisfies `r == g == b`.
    pub fn grayscale() -> Self {
        Self::from_rows("grayscale", GRAYSCALE_ROWS)
    }

    pub fn sepia() -> Self {
        Self::from_rows("sepia", SEPIA_ROWS)
    }

    pub fn identity() -> Self {
        Self {
            name: "identity".into(),
            matrix: DMat3::IDENTITY,
        }
    }

    /// Row-major entries.
    pub fn rows(&self) -> [[f64; 3]; 3] {
        // glam stores columns; transposing yields rows.
        self.matrix.transpose().to_cols_array_2d()
    }

    /// Transform a single pixel.
    pub fn transform_pixel(&self, px: Pixel) -> Pixel {
        let out: DVec3 = self.matrix * px.to_dvec3();
        Pixel::new(clamp_round(out.x), clamp_round(out.y), clamp_round(out.z))
    }

    fn from_rows(name: impl Into<String>, rows: [[f64; 3]; 3]) -> Self {
        // `from_cols_array_2d` reads columns, so feed rows and transpose.
        Self {
            name: name.into(),
            matrix: DMat3::from_cols_array_2d(&rows).transpose(),
        }
    }
}

impl Operator for ColorMatrix {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, grid: &PixelGrid) -> Result<PixelGrid, EditError> {
        tracing::debug!(
            "color matrix {} on {}x{}",
            self.name,
            grid.width(),
            grid.height()
        );
        let out = par_map_rows(grid, |row, dst| {
            let src = &grid.pixels()[row * dst.len()..(row + 1) * dst.len()];
            for (d, s) in dst.iter_mut().zip(src) {
                *d = self.transform_pixel(*s);
            }
        });
        Ok(out)
    }
}
