//! File helpers: pick the codec from the extension, read or write the bytes.
//!
//! - `load_image`: decode a file; the grid is named after the file stem.
//! - `save_image`: encode a grid, creating parent directories as needed.

use std::fs;
use std::path::Path;

use lamina_core::PixelGrid;

use crate::codec_for;
use crate::error::CodecError;
use crate::format::ImageFormat;

/// Load an image from disk, choosing the codec by extension.
pub fn load_image(path: &Path) -> Result<PixelGrid, CodecError> {
    let format = ImageFormat::from_path(path)?;
    let bytes = fs::read(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let grid = codec_for(format).decode(&bytes, &name)?;
    tracing::info!(
        "decoded {} ({format}, {}x{})",
        path.display(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}

/// Save an image to disk, choosing the codec by extension.
pub fn save_image(grid: &PixelGrid, path: &Path) -> Result<(), CodecError> {
    let format = ImageFormat::from_path(path)?;
    let bytes = codec_for(format).encode(grid)?;
    ensure_parent_dir(path)?;
    fs::write(path, bytes)?;
    tracing::info!("wrote {} ({format})", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
