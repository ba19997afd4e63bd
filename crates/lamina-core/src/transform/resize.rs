//! Bilinear downscale.
//!
//! Output coordinate `o` maps to source coordinate `o · src / dst` on each
//! axis. The floor and ceil neighbors (ceil clamped to the last valid index)
//! are blended by the fractional distance:
//!
//! ```text
//! top    = lerp(p[y0][x0], p[y0][x1], fx)
//! bottom = lerp(p[y1][x0], p[y1][x1], fx)
//! out    = clamp(round(lerp(top, bottom, fy)))
//! ```

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::pixel::Pixel;
use crate::transform::{Operator, clamp_round};

/// Downscale-only resize to a fixed target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    width: u32,
    height: u32,
}

impl Resize {
    /// Target dimensions must both be positive.
    pub fn new(width: i64, height: i64) -> Result<Self, EditError> {
        let width = positive("width", width)?;
        let height = positive("height", height)?;
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check the target against a source size.
    pub fn check_source(&self, src_width: u32, src_height: u32) -> Result<(), EditError> {
        if self.width > src_width {
            return Err(EditError::invalid_argument(format!(
                "target width {} exceeds source width {src_width}",
                self.width
            )));
        }
        if self.height > src_height {
            return Err(EditError::invalid_argument(format!(
                "target height {} exceeds source height {src_height}",
                self.height
            )));
        }
        Ok(())
    }
}

impl Operator for Resize {
    fn name(&self) -> &str {
        "downscale"
    }

    fn apply(&self, grid: &PixelGrid) -> Result<PixelGrid, EditError> {
        self.check_source(grid.width(), grid.height())?;
        tracing::debug!(
            "downscale {}x{} -> {}x{}",
            grid.width(),
            grid.height(),
            self.width,
            self.height
        );

        let x_taps: Vec<Tap> = (0..self.width)
            .map(|x| Tap::new(x, grid.width(), self.width))
            .collect();
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);

        for y in 0..self.height {
            let ty = Tap::new(y, grid.height(), self.height);
            for tx in &x_taps {
                let p00 = grid.clamped(ty.lo as isize, tx.lo as isize);
                let p01 = grid.clamped(ty.lo as isize, tx.hi as isize);
                let p10 = grid.clamped(ty.hi as isize, tx.lo as isize);
                let p11 = grid.clamped(ty.hi as isize, tx.hi as isize);
                pixels.push(blend(p00, p01, p10, p11, tx.frac, ty.frac));
            }
        }

        Ok(grid.derive_sized(self.width, self.height, pixels))
    }
}

/// Source neighbors and blend weight for one output coordinate.
struct Tap {
    lo: usize,
    hi: usize,
    frac: f64,
}

impl Tap {
    fn new(out: u32, src: u32, dst: u32) -> Self {
        let pos = f64::from(out) * f64::from(src) / f64::from(dst);
        let last = src as usize - 1;
        let lo = (pos.floor() as usize).min(last);
        let hi = (pos.ceil() as usize).min(last);
        Self {
            lo,
            hi,
            frac: pos - pos.floor(),
        }
    }
}

fn blend(p00: Pixel, p01: Pixel, p10: Pixel, p11: Pixel, fx: f64, fy: f64) -> Pixel {
    let mix = |a: u8, b: u8, c: u8, d: u8| {
        let top = lerp(f64::from(a), f64::from(b), fx);
        let bottom = lerp(f64::from(c), f64::from(d), fx);
        clamp_round(lerp(top, bottom, fy))
    };
    Pixel::new(
        mix(p00.r, p01.r, p10.r, p11.r),
        mix(p00.g, p01.g, p10.g, p11.g),
        mix(p00.b, p01.b, p10.b, p11.b),
    )
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn positive(what: &str, value: i64) -> Result<u32, EditError> {
    if value <= 0 {
        return Err(EditError::invalid_argument(format!(
            "target {what} must be positive, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| EditError::invalid_argument(format!("target {what} {value} is too large")))
}
