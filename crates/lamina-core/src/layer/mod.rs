//! Layers and the layer stack.

pub mod shared;
pub mod stack;

pub use shared::SharedLayerStack;
pub use stack::LayerStack;

use crate::grid::PixelGrid;

/// A named slot holding an optional image and a visibility flag.
///
/// The name is fixed at creation. A layer without an image is a placeholder
/// awaiting content.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    image: Option<PixelGrid>,
    visible: bool,
}

impl Layer {
    /// A visible placeholder layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            visible: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> Option<&PixelGrid> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_image(&mut self, image: PixelGrid) {
        self.image = Some(image);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
