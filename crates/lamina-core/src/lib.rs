//! Lamina Core: domain layer for layered raster editing.
//!
//! This crate contains the pixel data model, the operator library
//! (color matrices, convolution, downscale, mosaic) and the layer stack
//! that routes operators onto the current layer. No file I/O.

pub mod error;
pub mod grid;
pub mod layer;
pub mod pixel;
pub mod transform;

// Re-exports for convenience.
pub use error::{EditError, ErrorKind};
pub use grid::PixelGrid;
pub use layer::{Layer, LayerStack, SharedLayerStack};
pub use pixel::Pixel;
pub use transform::params::OperatorSpec;
pub use transform::{ColorMatrix, Convolution, Kernel, Mosaic, Operator, Resize};
