//! Layer manifest: a text description of a whole layer stack.
//!
//! One record per line, bottom layer first:
//!
//! ```text
//! # name, image, visible
//! background, background.png, true
//! sketch, empty, false
//! ```
//!
//! The image field is a path (relative paths resolve against the manifest's
//! directory) or the placeholder token for a layer with no image. Blank lines
//! and `#` comments are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use lamina_core::LayerStack;

use crate::error::ManifestError;
use crate::format::ImageFormat;
use crate::io::{load_image, save_image};

/// Token written in place of an image path for empty layers.
pub const DEFAULT_PLACEHOLDER: &str = "empty";

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    /// `None` for a placeholder layer.
    pub image: Option<PathBuf>,
    pub visible: bool,
}

/// Ordered manifest records, bottom layer first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerManifest {
    pub entries: Vec<ManifestEntry>,
}

impl LayerManifest {
    /// Parse manifest text.
    pub fn parse(text: &str, placeholder: &str) -> Result<Self, ManifestError> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            entries.push(parse_record(line, idx + 1, placeholder)?);
        }
        Ok(Self { entries })
    }

    /// Render as manifest text.
    pub fn to_text(&self, placeholder: &str) -> String {
        let mut out = String::from("# name, image, visible\n");
        for entry in &self.entries {
            let image = entry
                .image
                .as_ref()
                .map_or_else(|| placeholder.to_owned(), |p| p.display().to_string());
            out.push_str(&format!("{}, {}, {}\n", entry.name, image, entry.visible));
        }
        out
    }

    pub fn read(path: &Path, placeholder: &str) -> Result<Self, ManifestError> {
        Self::parse(&fs::read_to_string(path)?, placeholder)
    }
}

/// Build a stack from a manifest file. The topmost layer ends up current.
pub fn load_stack(path: &Path, placeholder: &str) -> Result<LayerStack, ManifestError> {
    let manifest = LayerManifest::read(path, placeholder)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let mut stack = LayerStack::new();
    for entry in &manifest.entries {
        match &entry.image {
            Some(image) => {
                let resolved = base.join(image);
                let grid = load_image(&resolved).map_err(|source| ManifestError::Codec {
                    layer: entry.name.clone(),
                    source,
                })?;
                stack.add_layer(&entry.name, grid)?;
            }
            None => stack.create_layer(&entry.name)?,
        }
        if !entry.visible {
            stack.set_visibility(&entry.name, false)?;
        }
    }

    tracing::info!(
        "loaded {} layers from {}",
        manifest.entries.len(),
        path.display()
    );
    Ok(stack)
}

/// Write every image in `stack` as `format` next to `path`, then the
/// manifest itself. Returns the manifest that was written.
pub fn save_stack(
    stack: &LayerStack,
    path: &Path,
    format: ImageFormat,
    placeholder: &str,
) -> Result<LayerManifest, ManifestError> {
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    if !base.as_os_str().is_empty() {
        fs::create_dir_all(base)?;
    }
    let mut entries = Vec::with_capacity(stack.len());

    for (index, layer) in stack.layers().iter().enumerate() {
        let image = match layer.image() {
            Some(grid) => {
                let file = PathBuf::from(format!(
                    "{index:02}_{}.{}",
                    file_safe(layer.name()),
                    format.extension()
                ));
                save_image(grid, &base.join(&file)).map_err(|source| ManifestError::Codec {
                    layer: layer.name().to_owned(),
                    source,
                })?;
                Some(file)
            }
            None => None,
        };
        entries.push(ManifestEntry {
            name: layer.name().to_owned(),
            image,
            visible: layer.is_visible(),
        });
    }

    let manifest = LayerManifest { entries };
    fs::write(path, manifest.to_text(placeholder))?;
    tracing::info!("saved {} layers to {}", stack.len(), path.display());
    Ok(manifest)
}

fn parse_record(line: &str, line_no: usize, placeholder: &str) -> Result<ManifestEntry, ManifestError> {
    let syntax = |reason: String| ManifestError::Syntax {
        line: line_no,
        reason,
    };

    // Name has no commas and visibility is last; the path may contain commas.
    let (name, rest) = line
        .split_once(',')
        .ok_or_else(|| syntax("expected `name, image, visible`".into()))?;
    let (image, visible) = rest
        .rsplit_once(',')
        .ok_or_else(|| syntax("expected `name, image, visible`".into()))?;

    let name = name.trim();
    let image = image.trim();
    if name.is_empty() {
        return Err(syntax("layer name is empty".into()));
    }
    if image.is_empty() {
        return Err(syntax(format!(
            "image path is empty (use {placeholder:?} for no image)"
        )));
    }
    let visible = match visible.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => return Err(syntax(format!("visible must be true or false, got {other:?}"))),
    };

    Ok(ManifestEntry {
        name: name.to_owned(),
        image: (image != placeholder).then(|| PathBuf::from(image)),
        visible,
    })
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
