//! Plain-text PPM (`P3`) codec.
//!
//! ```text
//! P3
//! # comment
//! <width> <height>
//! <maxval>
//! r g b  r g b  ...
//! ```
//!
//! Tokens are whitespace separated; `#` starts a comment running to the end
//! of the line. Samples are rescaled to 0..=255 when `maxval` differs.

use std::fmt::Write as _;

use lamina_core::{Pixel, PixelGrid};

use crate::ImageCodec;
use crate::error::CodecError;
use crate::format::ImageFormat;

const MAGIC: &str = "P3";
const MAX_MAXVAL: u32 = 65_535;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPpmCodec;

impl ImageCodec for PlainPpmCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Ppm
    }

    fn decode(&self, bytes: &[u8], name: &str) -> Result<PixelGrid, CodecError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::decode(ImageFormat::Ppm, e))?;
        let mut tokens = Tokens::new(text);

        let magic = tokens.next_token("magic number")?;
        if magic != MAGIC {
            return Err(CodecError::decode(
                ImageFormat::Ppm,
                format!("expected magic {MAGIC}, found {magic:?}"),
            ));
        }
        let width = tokens.next_number("width")?;
        let height = tokens.next_number("height")?;
        let maxval = tokens.next_number("maxval")?;
        if maxval == 0 || maxval > MAX_MAXVAL {
            return Err(CodecError::decode(
                ImageFormat::Ppm,
                format!("maxval {maxval} outside 1..={MAX_MAXVAL}"),
            ));
        }
        if maxval != 255 {
            tracing::warn!("{name}: rescaling PPM samples from maxval {maxval} to 255");
        }

        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count.min(1 << 20));
        for i in 0..count {
            let mut rgb = [0_u8; 3];
            for (c, slot) in rgb.iter_mut().enumerate() {
                let what = ["red", "green", "blue"][c];
                let v = tokens.next_number(what)?;
                if v > maxval {
                    return Err(CodecError::decode(
                        ImageFormat::Ppm,
                        format!("pixel {i} {what} sample {v} exceeds maxval {maxval}"),
                    ));
                }
                *slot = rescale(v, maxval);
            }
            pixels.push(Pixel::from_channels(rgb));
        }
        if let Some(extra) = tokens.next() {
            tracing::warn!("{name}: ignoring trailing PPM data starting at {extra:?}");
        }

        Ok(PixelGrid::from_raw(name, width, height, pixels)?)
    }

    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, CodecError> {
        let mut out = String::with_capacity(grid.len() * 12 + 32);
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{MAGIC}\n{} {}\n255", grid.width(), grid.height());
        for row in grid.rows() {
            let line: Vec<String> = row
                .iter()
                .map(|p| format!("{} {} {}", p.r, p.g, p.b))
                .collect();
            out.push_str(&line.join("  "));
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

fn rescale(value: u32, maxval: u32) -> u8 {
    if maxval == 255 {
        return value as u8;
    }
    ((value * 255 + maxval / 2) / maxval) as u8
}

/// Whitespace tokenizer that skips `#` comments.
struct Tokens<'a> {
    items: std::vec::IntoIter<&'a str>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let items: Vec<&'a str> = text
            .lines()
            .flat_map(|line| line.split('#').next().unwrap_or("").split_whitespace())
            .collect();
        Self {
            items: items.into_iter(),
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&'a str, CodecError> {
        self.items.next().ok_or_else(|| {
            CodecError::decode(ImageFormat::Ppm, format!("unexpected end of data reading {what}"))
        })
    }

    fn next_number(&mut self, what: &str) -> Result<u32, CodecError> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_| {
            CodecError::decode(ImageFormat::Ppm, format!("{what} {token:?} is not a number"))
        })
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_comments() {
        let text = "P3\n# made by hand\n2 1 # size\n255\n255 0 0   0 0 255\n";
        let grid = PlainPpmCodec.decode(text.as_bytes(), "hand").unwrap();
        assert_eq!(grid.dimensions(), (2, 1));
        assert_eq!(grid.name(), "hand");
        assert_eq!(grid.get(0, 0).unwrap(), Pixel::new(255, 0, 0));
        assert_eq!(grid.get(0, 1).unwrap(), Pixel::new(0, 0, 255));
    }

    #[test]
    fn test_decode_rescales_maxval() {
        let text = "P3 1 1 15 15 0 7";
        let grid = PlainPpmCodec.decode(text.as_bytes(), "x").unwrap();
        // 7 * 255 / 15 = 119
        assert_eq!(grid.get(0, 0).unwrap(), Pixel::new(255, 0, 119));
    }

    #[test]
    fn test_decode_rejects_sample_above_maxval() {
        let err = PlainPpmCodec
            .decode(b"P3 1 1 255 256 0 0", "x")
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let err = PlainPpmCodec.decode(b"P3 2 2 255 1 2 3", "x").unwrap_err();
        assert!(err.to_string().contains("unexpected end of data"));
    }

    #[test]
    fn test_decode_rejects_binary_magic() {
        let err = PlainPpmCodec.decode(b"P6 1 1 255 0 0 0", "x").unwrap_err();
        assert!(err.to_string().contains("expected magic P3"));
    }

    #[test]
    fn test_decode_zero_size_is_shape_error() {
        let err = PlainPpmCodec.decode(b"P3 0 1 255", "x").unwrap_err();
        assert!(matches!(err, CodecError::Edit(_)));
    }

    #[test]
    fn test_encode_layout() {
        let grid = PixelGrid::from_rows(
            "e",
            vec![
                vec![Pixel::new(1, 2, 3), Pixel::new(4, 5, 6)],
                vec![Pixel::new(7, 8, 9), Pixel::new(10, 11, 12)],
            ],
        )
        .unwrap();
        let text = String::from_utf8(PlainPpmCodec.encode(&grid).unwrap()).unwrap();
        assert_eq!(text, "P3\n2 2\n255\n1 2 3  4 5 6\n7 8 9  10 11 12\n");
        let back = PlainPpmCodec.decode(text.as_bytes(), "e").unwrap();
        assert_eq!(back, grid);
    }
}
