//! Compressed raster formats (PNG, JPEG) via the `image` crate.
//!
//! Any color type the decoder produces is converted to 8-bit RGB; alpha is
//! dropped.

use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use lamina_core::{Pixel, PixelGrid};

use crate::ImageCodec;
use crate::error::CodecError;
use crate::format::ImageFormat;

#[derive(Debug, Clone, Copy)]
pub struct RasterCodec {
    format: ImageFormat,
}

impl RasterCodec {
    /// Codec for a compressed format. `Ppm` is handled by
    /// [`PlainPpmCodec`](crate::PlainPpmCodec) instead.
    pub fn new(format: ImageFormat) -> Self {
        debug_assert!(format.as_image_format().is_some());
        Self { format }
    }

    fn image_format(&self) -> Result<image::ImageFormat, CodecError> {
        self.format
            .as_image_format()
            .ok_or_else(|| CodecError::UnsupportedFormat(self.format.to_string()))
    }
}

impl ImageCodec for RasterCodec {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn decode(&self, bytes: &[u8], name: &str) -> Result<PixelGrid, CodecError> {
        let img = image::load_from_memory_with_format(bytes, self.image_format()?)
            .map_err(|e| CodecError::decode(self.format, e))?;
        if img.color().has_alpha() {
            tracing::debug!("{name}: dropping alpha channel");
        }
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels: Vec<Pixel> = rgb.pixels().map(|p| Pixel::from_channels(p.0)).collect();
        Ok(PixelGrid::from_raw(name, width, height, pixels)?)
    }

    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, CodecError> {
        let raw: Vec<u8> = grid.pixels().iter().flat_map(|p| p.channels()).collect();
        let buffer = RgbImage::from_raw(grid.width(), grid.height(), raw)
            .ok_or_else(|| CodecError::encode(self.format, "pixel buffer size mismatch"))?;

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut out, self.image_format()?)
            .map_err(|e| CodecError::encode(self.format, e))?;
        Ok(out.into_inner())
    }
}
