//! Image codecs and layer manifests for Lamina.
//!
//! Turns bytes into [`PixelGrid`]s and back for plain-text PPM, PNG and
//! JPEG, and reads/writes the newline-delimited layer manifest that
//! describes a whole [`LayerStack`](lamina_core::LayerStack).

mod error;
mod format;
pub mod io;
pub mod manifest;
mod ppm;
mod raster;

use lamina_core::PixelGrid;

pub use error::{CodecError, ManifestError};
pub use format::ImageFormat;
pub use io::{load_image, save_image};
pub use manifest::{DEFAULT_PLACEHOLDER, LayerManifest, ManifestEntry, load_stack, save_stack};
pub use ppm::PlainPpmCodec;
pub use raster::RasterCodec;

/// Bytes ⇄ pixel grid for one on-disk format.
pub trait ImageCodec: Send + Sync {
    fn format(&self) -> ImageFormat;

    /// Decode `bytes`; the resulting grid is called `name`.
    fn decode(&self, bytes: &[u8], name: &str) -> Result<PixelGrid, CodecError>;

    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, CodecError>;
}

/// The codec that handles `format`.
pub fn codec_for(format: ImageFormat) -> Box<dyn ImageCodec> {
    match format {
        ImageFormat::Ppm => Box::new(PlainPpmCodec),
        ImageFormat::Png | ImageFormat::Jpeg => Box::new(RasterCodec::new(format)),
    }
}

/// Decode `bytes` using the codec for `hint`.
pub fn decode(bytes: &[u8], hint: ImageFormat, name: &str) -> Result<PixelGrid, CodecError> {
    codec_for(hint).decode(bytes, name)
}

/// Encode `grid` as `format`.
pub fn encode(grid: &PixelGrid, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
    codec_for(format).encode(grid)
}
