//! Application configuration for the dispatcher.
//!
//! Resolution order, later wins: built-in defaults, the JSON file given with
//! `--config`, `LAMINA_*` environment variables, command-line flags.

use std::fs;
use std::path::Path;

use lamina_codec::{DEFAULT_PLACEHOLDER, ImageFormat};
use lamina_core::Pixel;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default checkerboard tile edge in pixels.
const DEFAULT_TILE: u32 = 8;
/// Default seed count for `mosaic` without an argument.
const DEFAULT_MOSAIC_SEEDS: i64 = 64;
/// Default tracing filter when neither `RUST_LOG` nor `-v` is set.
const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_EXPORT_FORMAT: &str = "LAMINA_EXPORT_FORMAT";
pub const ENV_RNG_SEED: &str = "LAMINA_RNG_SEED";
pub const ENV_LOG: &str = "LAMINA_LOG";

/// Runtime configuration for a Lamina session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Format for `export` without an explicit path and for `save-layers` images.
    pub export_format: ImageFormat,
    /// Tile edge for `checkerboard` without an explicit tile argument.
    pub checkerboard_tile: u32,
    /// Checkerboard colors; the first fills the top-left tile.
    pub checkerboard_colors: [Pixel; 2],
    /// Seed count for `mosaic` without an argument.
    pub mosaic_seeds: i64,
    /// Fixed RNG seed for `mosaic`; `None` draws from entropy.
    pub rng_seed: Option<u64>,
    /// Tracing filter directive.
    pub log_level: String,
    /// Manifest token for a layer without an image.
    pub placeholder: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_format: ImageFormat::Png,
            checkerboard_tile: DEFAULT_TILE,
            checkerboard_colors: [Pixel::new(255, 0, 0), Pixel::BLACK],
            mosaic_seeds: DEFAULT_MOSAIC_SEEDS,
            rng_seed: None,
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env(|var| std::env::var(var).ok())
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `LAMINA_*` overrides read through `lookup`.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_EXPORT_FORMAT) {
            self.export_format = value.parse().map_err(|e: lamina_codec::CodecError| {
                ConfigError::Env {
                    var: ENV_EXPORT_FORMAT,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup(ENV_RNG_SEED) {
            let seed = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    var: ENV_RNG_SEED,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
            self.rng_seed = Some(seed);
        }
        if let Some(value) = lookup(ENV_LOG) {
            if !value.trim().is_empty() {
                self.log_level = value;
            }
        }
        Ok(self)
    }
}
