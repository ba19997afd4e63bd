//! Square-kernel convolution (blur, sharpen, user-defined kernels).
//!
//! For a kernel of side `k = 2n + 1` each output channel is
//!
//! ```text
//! out(row, col) = Σ kernel[n + dr][n + dc] · in(row + dr, col + dc)    dr, dc ∈ [-n, n]
//! ```
//!
//! Neighbor coordinates outside the grid are clamped to the nearest edge,
//! independently per axis. Sums are clamped to `[0, 255]` and truncated.

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::pixel::Pixel;
use crate::transform::{Operator, clamp_truncate, par_map_rows};

/// A square, odd-sided kernel of real weights (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel from rows of weights.
    ///
    /// A non-square (or ragged) kernel is zero-padded to an `L`×`L` square,
    /// where `L` is its larger dimension; the original weights stay centered
    /// (any odd leftover padding goes after them). `L` must be odd.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, EditError> {
        let row_count = rows.len();
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        if row_count == 0 || col_count == 0 {
            return Err(EditError::invalid_argument("kernel must not be empty"));
        }
        if let Some((i, j)) = rows.iter().enumerate().find_map(|(i, row)| {
            row.iter().position(|v| !v.is_finite()).map(|j| (i, j))
        }) {
            return Err(EditError::invalid_argument(format!(
                "kernel weight ({i}, {j}) is not finite"
            )));
        }

        let size = row_count.max(col_count);
        if size % 2 == 0 {
            return Err(EditError::invalid_argument(format!(
                "cannot derive an odd square from this kernel ({row_count}x{col_count})"
            )));
        }

        let row_pad = (size - row_count) / 2;
        let col_pad = (size - col_count) / 2;
        let mut weights = vec![0.0; size * size];
        for (i, row) in rows.iter().enumerate() {
            for (j, &w) in row.iter().enumerate() {
                weights[(i + row_pad) * size + (j + col_pad)] = w;
            }
        }
        if row_count != col_count || rows.iter().any(|r| r.len() != col_count) {
            tracing::debug!("kernel {row_count}x{col_count} padded to {size}x{size}");
        }

        Ok(Self { size, weights })
    }

    /// `1/16 · [[1,2,1],[2,4,2],[1,2,1]]`.
    pub fn blur() -> Self {
        let rows = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
        Self {
            size: 3,
            weights: rows.iter().flatten().map(|w| w / 16.0).collect(),
        }
    }

    /// 5×5 sharpen: center `1`, inner ring `0.25`, outer ring `-0.125`.
    pub fn sharpen() -> Self {
        let size = 5;
        let mut weights = Vec::with_capacity(size * size);
        for i in 0..size as isize {
            for j in 0..size as isize {
                let ring = (i - 2).abs().max((j - 2).abs());
                weights.push(match ring {
                    0 => 1.0,
                    1 => 0.25,
                    _ => -0.125,
                });
            }
        }
        Self { size, weights }
    }

    /// A `(2·radius + 1)`-sided kernel with a single `1` at the center.
    pub fn identity(radius: usize) -> Self {
        let size = 2 * radius + 1;
        let mut weights = vec![0.0; size * size];
        weights[radius * size + radius] = 1.0;
        Self { size, weights }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `n` for a kernel of side `2n + 1`.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.size + col]
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Convolution operator over a [`Kernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Convolution {
    name: String,
    kernel: Kernel,
}

impl Convolution {
    pub fn new(name: impl Into<String>, kernel: Kernel) -> Self {
        Self {
            name: name.into(),
            kernel,
        }
    }

    pub fn blur() -> Self {
        Self::new("blur", Kernel::blur())
    }

    pub fn sharpen() -> Self {
        Self::new("sharpen", Kernel::sharpen())
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    fn convolve_at(&self, grid: &PixelGrid, row: usize, col: usize) -> Pixel {
        let n = self.kernel.radius() as isize;
        let mut acc = [0.0_f64; 3];
        for dr in -n..=n {
            for dc in -n..=n {
                let w = self.kernel.weight((n + dr) as usize, (n + dc) as usize);
                if w == 0.0 {
                    continue;
                }
                let px = grid.clamped(row as isize + dr, col as isize + dc);
                acc[0] += w * f64::from(px.r);
                acc[1] += w * f64::from(px.g);
                acc[2] += w * f64::from(px.b);
            }
        }
        Pixel::new(
            clamp_truncate(acc[0]),
            clamp_truncate(acc[1]),
            clamp_truncate(acc[2]),
        )
    }
}

impl Operator for Convolution {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, grid: &PixelGrid) -> Result<PixelGrid, EditError> {
        tracing::debug!(
            "convolution {} ({}x{} kernel) on {}x{}",
            self.name,
            self.kernel.size,
            self.kernel.size,
            grid.width(),
            grid.height()
        );
        Ok(par_map_rows(grid, |row, dst| {
            for (col, d) in dst.iter_mut().enumerate() {
                *d = self.convolve_at(grid, row, col);
            }
        }))
    }
}
