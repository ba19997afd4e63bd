//! Ordered layer container with a current selection and a fixed canvas size.
//!
//! # Invariants
//! - Layer names are unique.
//! - Every image in the stack has the canvas size, which the first loaded
//!   image fixes for the lifetime of the stack.
//! - `current` is `None` only when the stack has no layers.
//!
//! Index 0 is the bottom; appending places a layer on top. Every mutating
//! call validates fully before touching state, so a failed call leaves the
//! stack exactly as it was. Accessors hand out copies, never references into
//! the stack.

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::layer::Layer;
use crate::transform::params::OperatorSpec;
use crate::transform::{Operator, Resize};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStack {
    layers: Vec<Layer>,
    current: Option<usize>,
    canvas: Option<(u32, u32)>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// `(width, height)` fixed by the first loaded image.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        self.canvas
    }

    /// Index of the current layer (0 = bottom).
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_name(&self) -> Option<String> {
        self.current.map(|i| self.layers[i].name().to_owned())
    }

    /// Copy of the current layer.
    pub fn current_layer(&self) -> Option<Layer> {
        self.current.map(|i| self.layers[i].clone())
    }

    /// Copy of the named layer.
    pub fn layer(&self, name: &str) -> Result<Layer, EditError> {
        self.find(name)
            .map(|i| self.layers[i].clone())
            .ok_or_else(|| EditError::NotFound(name.to_owned()))
    }

    /// Copies of all layers, bottom to top.
    pub fn layers(&self) -> Vec<Layer> {
        self.layers.clone()
    }

    /// Layer names, bottom to top.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name().to_owned()).collect()
    }

    /// Append an empty layer on top and make it current.
    pub fn create_layer(&mut self, name: &str) -> Result<(), EditError> {
        self.check_new_name(name)?;
        self.push(Layer::new(name));
        Ok(())
    }

    /// Append a layer holding `image` on top and make it current.
    pub fn add_layer(&mut self, name: &str, image: PixelGrid) -> Result<(), EditError> {
        self.check_new_name(name)?;
        self.check_canvas(&image)?;
        let mut layer = Layer::new(name);
        self.claim_canvas(&image);
        layer.set_image(image);
        self.push(layer);
        Ok(())
    }

    /// Remove a layer. Removing the current layer selects the topmost
    /// remaining one.
    pub fn remove_layer(&mut self, name: &str) -> Result<(), EditError> {
        let index = self
            .find(name)
            .ok_or_else(|| EditError::NotFound(name.to_owned()))?;
        self.layers.remove(index);

        self.current = match self.current {
            _ if self.layers.is_empty() => None,
            Some(cur) if cur == index => Some(self.layers.len() - 1),
            Some(cur) if cur > index => Some(cur - 1),
            other => other,
        };
        tracing::info!("removed layer {name:?}");
        Ok(())
    }

    /// Select the named layer. Missing or hidden layers are refused with
    /// `InvalidState` and the selection is left unchanged.
    pub fn set_current(&mut self, name: &str) -> Result<(), EditError> {
        let index = self.find(name).ok_or_else(|| {
            EditError::invalid_state(format!("cannot select {name:?}: no such layer"))
        })?;
        if !self.layers[index].is_visible() {
            return Err(EditError::invalid_state(format!(
                "cannot select {name:?}: layer is hidden"
            )));
        }
        self.current = Some(index);
        tracing::debug!("current layer is now {name:?}");
        Ok(())
    }

    /// Show or hide a layer.
    pub fn set_visibility(&mut self, name: &str, visible: bool) -> Result<(), EditError> {
        let index = self
            .find(name)
            .ok_or_else(|| EditError::NotFound(name.to_owned()))?;
        self.layers[index].set_visible(visible);
        tracing::debug!("layer {name:?} visible={visible}");
        Ok(())
    }

    /// Load `image` into the current layer, replacing whatever it held.
    ///
    /// The first image loaded into the stack fixes the canvas size; later
    /// images must match it.
    pub fn load_image(&mut self, image: PixelGrid) -> Result<(), EditError> {
        let index = self
            .current
            .ok_or_else(|| EditError::invalid_state("no current layer to load into"))?;
        self.check_canvas(&image)?;
        self.claim_canvas(&image);
        tracing::info!(
            "loaded {:?} ({}x{}) into layer {:?}",
            image.name(),
            image.width(),
            image.height(),
            self.layers[index].name()
        );
        self.layers[index].set_image(image);
        Ok(())
    }

    /// Run `op` on the current layer's image and store the result there.
    ///
    /// Fails with `InvalidState` when there is no current layer, it holds no
    /// image, or it is hidden; with `DimensionMismatch` when the operator
    /// would change the canvas size.
    pub fn apply(&mut self, op: &dyn Operator) -> Result<(), EditError> {
        let index = self.editable_current()?;
        let source = self.layers[index]
            .image()
            .ok_or_else(|| EditError::invalid_state("current layer has no image"))?;

        let result = op.apply(source)?;
        self.check_canvas(&result)?;

        tracing::info!(
            "applied {} to layer {:?}",
            op.name(),
            self.layers[index].name()
        );
        self.layers[index].set_image(result);
        Ok(())
    }

    /// Build `spec` and apply it to the current layer.
    pub fn apply_spec(&mut self, spec: &OperatorSpec) -> Result<(), EditError> {
        let op = spec.build()?;
        self.apply(op.as_ref())
    }

    /// Image of the topmost visible layer that has one.
    pub fn render(&self) -> Option<PixelGrid> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.is_visible())
            .find_map(|l| l.image().cloned())
    }

    /// A new stack with every image downscaled to `width`×`height`.
    ///
    /// Names, visibility, order and selection carry over; the new stack's
    /// canvas is the target size.
    pub fn resized(&self, width: i64, height: i64) -> Result<LayerStack, EditError> {
        let resize = Resize::new(width, height)?;
        let (canvas_w, canvas_h) = self
            .canvas
            .ok_or_else(|| EditError::invalid_state("no image loaded; canvas size is unset"))?;
        resize.check_source(canvas_w, canvas_h)?;

        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut copy = Layer::new(layer.name());
            copy.set_visible(layer.is_visible());
            if let Some(image) = layer.image() {
                copy.set_image(resize.apply(image)?);
            }
            layers.push(copy);
        }

        tracing::info!(
            "resized stack {canvas_w}x{canvas_h} -> {}x{}",
            resize.width(),
            resize.height()
        );
        Ok(LayerStack {
            layers,
            current: self.current,
            canvas: Some((resize.width(), resize.height())),
        })
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name() == name)
    }

    fn push(&mut self, layer: Layer) {
        tracing::info!("created layer {:?}", layer.name());
        self.layers.push(layer);
        self.current = Some(self.layers.len() - 1);
    }

    fn check_new_name(&self, name: &str) -> Result<(), EditError> {
        if name.trim().is_empty() {
            return Err(EditError::invalid_argument("layer name must not be blank"));
        }
        if name.contains([',', '\n', '\r']) {
            return Err(EditError::invalid_argument(format!(
                "layer name {name:?} must not contain commas or line breaks"
            )));
        }
        if name.trim() != name {
            return Err(EditError::invalid_argument(format!(
                "layer name {name:?} must not start or end with whitespace"
            )));
        }
        // A leading `#` would read back as a manifest comment.
        if name.starts_with('#') {
            return Err(EditError::invalid_argument(format!(
                "layer name {name:?} must not start with '#'"
            )));
        }
        if self.find(name).is_some() {
            return Err(EditError::DuplicateLayer(name.to_owned()));
        }
        Ok(())
    }

    fn check_canvas(&self, image: &PixelGrid) -> Result<(), EditError> {
        match self.canvas {
            Some((w, h)) if (w, h) != image.dimensions() => Err(EditError::DimensionMismatch {
                canvas_width: w,
                canvas_height: h,
                found_width: image.width(),
                found_height: image.height(),
            }),
            _ => Ok(()),
        }
    }

    fn claim_canvas(&mut self, image: &PixelGrid) {
        if self.canvas.is_none() {
            self.canvas = Some(image.dimensions());
            tracing::debug!("canvas fixed at {}x{}", image.width(), image.height());
        }
    }

    fn editable_current(&self) -> Result<usize, EditError> {
        let index = self
            .current
            .ok_or_else(|| EditError::invalid_state("no current layer"))?;
        let layer = &self.layers[index];
        if !layer.is_visible() {
            return Err(EditError::invalid_state(format!(
                "current layer {:?} is hidden",
                layer.name()
            )));
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pixel::Pixel;
    use crate::transform::{ColorMatrix, Convolution};

    fn solid(w: u32, h: u32, v: u8) -> PixelGrid {
        PixelGrid::filled(format!("solid{v}"), w, h, Pixel::new(v, v, v)).unwrap()
    }

    #[test]
    fn test_first_layer_becomes_current() {
        let mut stack = LayerStack::new();
        assert_eq!(stack.current_index(), None);
        stack.create_layer("a").unwrap();
        assert_eq!(stack.current_name().as_deref(), Some("a"));
    }

    #[test]
    fn test_new_layer_is_selected() {
        let mut stack = LayerStack::new();
        stack.create_layer("a").unwrap();
        stack.create_layer("b").unwrap();
        assert_eq!(stack.current_index(), Some(1));
        assert_eq!(stack.layer_names(), ["a", "b"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut stack = LayerStack::new();
        stack.create_layer("a").unwrap();
        let err = stack.create_layer("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateLayer);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_bad_names_rejected() {
        let mut stack = LayerStack::new();
        for name in ["", "  ", "a,b", "a\nb", " a", "a\t", "#top"] {
            let err = stack.create_layer(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{name:?}");
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut stack = LayerStack::new();
        let err = stack.remove_layer("ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_current_selects_topmost() {
        let mut stack = LayerStack::new();
        for name in ["a", "b", "c"] {
            stack.create_layer(name).unwrap();
        }
        stack.set_current("b").unwrap();
        stack.remove_layer("b").unwrap();
        assert_eq!(stack.current_name().as_deref(), Some("c"));
        stack.remove_layer("c").unwrap();
        assert_eq!(stack.current_name().as_deref(), Some("a"));
        stack.remove_layer("a").unwrap();
        assert_eq!(stack.current_index(), None);
    }

    #[test]
    fn test_remove_below_current_keeps_selection() {
        let mut stack = LayerStack::new();
        for name in ["a", "b", "c"] {
            stack.create_layer(name).unwrap();
        }
        stack.remove_layer("a").unwrap();
        assert_eq!(stack.current_name().as_deref(), Some("c"));
        assert_eq!(stack.current_index(), Some(1));
    }

    #[test]
    fn test_set_current_refuses_missing_and_hidden() {
        let mut stack = LayerStack::new();
        stack.create_layer("a").unwrap();
        stack.create_layer("b").unwrap();
        stack.set_visibility("a", false).unwrap();

        let err = stack.set_current("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = stack.set_current("zzz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(stack.current_name().as_deref(), Some("b"));
    }

    #[test]
    fn test_set_visibility_missing_is_not_found() {
        let mut stack = LayerStack::new();
        let err = stack.set_visibility("x", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_load_without_layer_is_invalid_state() {
        let mut stack = LayerStack::new();
        let err = stack.load_image(solid(2, 2, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(stack.canvas_size(), None);
    }

    #[test]
    fn test_canvas_fixed_by_first_image() {
        let mut stack = LayerStack::new();
        stack.create_layer("a").unwrap();
        stack.load_image(solid(3, 2, 1)).unwrap();
        stack.create_layer("b").unwrap();
        let err = stack.load_image(solid(2, 3, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert!(!stack.layer("b").unwrap().has_image());
        stack.load_image(solid(3, 2, 9)).unwrap();
        assert_eq!(stack.canvas_size(), Some((3, 2)));
    }

    #[test]
    fn test_canvas_survives_removing_every_layer() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", solid(4, 4, 0)).unwrap();
        stack.remove_layer("a").unwrap();
        let err = stack.add_layer("b", solid(2, 2, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_add_layer_rejects_mismatch_atomically() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", solid(4, 4, 0)).unwrap();
        let before = stack.clone();
        let err = stack.add_layer("b", solid(5, 4, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(stack, before);
    }

    #[test]
    fn test_apply_requires_current_image_and_visibility() {
        let mut stack = LayerStack::new();
        let blur = Convolution::blur();

        let err = stack.apply(&blur).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        stack.create_layer("a").unwrap();
        let err = stack.apply(&blur).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        stack.load_image(solid(2, 2, 10)).unwrap();
        stack.set_visibility("a", false).unwrap();
        let before = stack.clone();
        let err = stack.apply(&blur).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(stack, before);
    }

    #[test]
    fn test_apply_replaces_current_image_only() {
        let mut stack = LayerStack::new();
        let color = PixelGrid::filled("c", 2, 2, Pixel::new(200, 100, 50)).unwrap();
        stack.add_layer("a", color.clone()).unwrap();
        stack.add_layer("b", color.clone()).unwrap();
        stack.apply(&ColorMatrix::grayscale()).unwrap();

        let b = stack.layer("b").unwrap();
        let px = b.image().unwrap().get(0, 0).unwrap();
        assert_eq!(px.r, px.g);
        assert_eq!(stack.layer("a").unwrap().image(), Some(&color));
    }

    #[test]
    fn test_apply_refuses_canvas_change() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", solid(4, 4, 1)).unwrap();
        let before = stack.clone();
        let err = stack
            .apply_spec(&OperatorSpec::Downscale { width: 2, height: 2 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(stack, before);
    }

    #[test]
    fn test_render_picks_topmost_visible_with_image() {
        let mut stack = LayerStack::new();
        assert_eq!(stack.render(), None);
        stack.add_layer("a", solid(2, 2, 1)).unwrap();
        stack.add_layer("b", solid(2, 2, 2)).unwrap();
        stack.create_layer("empty").unwrap();
        assert_eq!(stack.render(), Some(solid(2, 2, 2)));
        stack.set_visibility("b", false).unwrap();
        assert_eq!(stack.render(), Some(solid(2, 2, 1)));
        stack.set_visibility("a", false).unwrap();
        assert_eq!(stack.render(), None);
    }

    #[test]
    fn test_accessors_return_copies() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", solid(2, 2, 1)).unwrap();
        let mut copies = stack.layers();
        copies[0].set_image(solid(9, 9, 9));
        assert_eq!(stack.layer("a").unwrap().image(), Some(&solid(2, 2, 1)));
    }

    #[test]
    fn test_resized_builds_new_canvas() {
        let mut stack = LayerStack::new();
        stack.add_layer("a", solid(4, 4, 1)).unwrap();
        stack.create_layer("placeholder").unwrap();
        stack.add_layer("b", solid(4, 4, 2)).unwrap();
        stack.set_visibility("a", false).unwrap();
        stack.set_current("placeholder").unwrap();

        let small = stack.resized(2, 3).unwrap();
        assert_eq!(small.canvas_size(), Some((2, 3)));
        assert_eq!(small.layer_names(), stack.layer_names());
        assert_eq!(small.current_name().as_deref(), Some("placeholder"));
        assert!(!small.layer("a").unwrap().is_visible());
        assert!(!small.layer("placeholder").unwrap().has_image());
        assert_eq!(small.render(), Some(solid(2, 3, 2)));
        // The original stack is untouched.
        assert_eq!(stack.canvas_size(), Some((4, 4)));
    }

    #[test]
    fn test_resized_validates_target() {
        let mut stack = LayerStack::new();
        stack.create_layer("a").unwrap();
        assert_eq!(
            stack.resized(1, 1).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        stack.load_image(solid(3, 3, 0)).unwrap();
        assert_eq!(
            stack.resized(4, 1).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            stack.resized(0, 1).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
