//! 8-bit RGB pixel value.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Largest value a channel can hold.
pub const CHANNEL_MAX: i32 = 255;

/// A single RGB sample. Plain value type; copies never share state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a pixel from wide integer channels, rejecting anything outside `[0, 255]`.
    pub fn try_new(r: i32, g: i32, b: i32) -> Result<Self, EditError> {
        Ok(Self {
            r: channel("red", r)?,
            g: channel("green", g)?,
            b: channel("blue", b)?,
        })
    }

    /// Channels as `[r, g, b]`.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn from_channels(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }

    pub(crate) fn to_dvec3(self) -> DVec3 {
        DVec3::new(f64::from(self.r), f64::from(self.g), f64::from(self.b))
    }
}

impl From<[u8; 3]> for Pixel {
    fn from(rgb: [u8; 3]) -> Self {
        Self::from_channels(rgb)
    }
}

fn channel(what: &'static str, value: i32) -> Result<u8, EditError> {
    u8::try_from(value).map_err(|_| EditError::OutOfRange {
        what,
        value: i64::from(value),
        expected: format!("0..={CHANNEL_MAX}"),
    })
}
