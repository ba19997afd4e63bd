//! Serializable operator configuration.
//!
//! `OperatorSpec` is the single description of "which operator, with which
//! settings" that dispatchers and config files produce. [`OperatorSpec::build`]
//! validates it and yields a ready-to-run [`Operator`].

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::transform::{ColorMatrix, Convolution, Kernel, Mosaic, Operator, Resize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum OperatorSpec {
    /// 3×3 weighted blur.
    Blur,
    /// 5×5 ring sharpen.
    Sharpen,
    /// Rec. 709 grayscale matrix.
    Grayscale,
    /// Sepia matrix.
    Sepia,
    /// User kernel, reshaped to an odd square when needed.
    Kernel { rows: Vec<Vec<f64>> },
    /// User 3×3 color matrix.
    Matrix { rows: Vec<Vec<f64>> },
    /// Seed-clustering mosaic.
    Mosaic {
        seeds: i64,
        #[serde(default)]
        rng_seed: Option<u64>,
    },
    /// Bilinear downscale.
    Downscale { width: i64, height: i64 },
}

impl OperatorSpec {
    /// Human-readable label for logs and status text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Kernel { .. } => "kernel",
            Self::Matrix { .. } => "matrix",
            Self::Mosaic { .. } => "mosaic",
            Self::Downscale { .. } => "downscale",
        }
    }

    /// Whether the operator keeps the input's width and height.
    pub const fn preserves_dimensions(&self) -> bool {
        !matches!(self, Self::Downscale { .. })
    }

    /// Validate and build the operator.
    pub fn build(&self) -> Result<Box<dyn Operator>, EditError> {
        let op: Box<dyn Operator> = match self {
            Self::Blur => Box::new(Convolution::blur()),
            Self::Sharpen => Box::new(Convolution::sharpen()),
            Self::Grayscale => Box::new(ColorMatrix::grayscale()),
            Self::Sepia => Box::new(ColorMatrix::sepia()),
            Self::Kernel { rows } => Box::new(Convolution::new("kernel", Kernel::new(rows.clone())?)),
            Self::Matrix { rows } => Box::new(ColorMatrix::new("matrix", rows)?),
            Self::Mosaic { seeds, rng_seed } => Box::new(Mosaic::new(*seeds, *rng_seed)?),
            Self::Downscale { width, height } => Box::new(Resize::new(*width, *height)?),
        };
        Ok(op)
    }
}
