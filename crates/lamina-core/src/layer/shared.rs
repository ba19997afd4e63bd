//! Lock-guarded layer stack for multi-threaded hosts.
//!
//! Each call takes the single exclusive lock once, so the multi-step checks
//! inside a [`LayerStack`] mutation (name uniqueness, canvas size, current
//! index) never interleave with another caller.

use parking_lot::Mutex;

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::layer::LayerStack;
use crate::transform::Operator;
use crate::transform::params::OperatorSpec;

#[derive(Debug, Default)]
pub struct SharedLayerStack {
    inner: Mutex<LayerStack>,
}

impl SharedLayerStack {
    pub fn new(stack: LayerStack) -> Self {
        Self {
            inner: Mutex::new(stack),
        }
    }

    pub fn create_layer(&self, name: &str) -> Result<(), EditError> {
        self.inner.lock().create_layer(name)
    }

    pub fn add_layer(&self, name: &str, image: PixelGrid) -> Result<(), EditError> {
        self.inner.lock().add_layer(name, image)
    }

    pub fn remove_layer(&self, name: &str) -> Result<(), EditError> {
        self.inner.lock().remove_layer(name)
    }

    pub fn set_current(&self, name: &str) -> Result<(), EditError> {
        self.inner.lock().set_current(name)
    }

    pub fn set_visibility(&self, name: &str, visible: bool) -> Result<(), EditError> {
        self.inner.lock().set_visibility(name, visible)
    }

    pub fn load_image(&self, image: PixelGrid) -> Result<(), EditError> {
        self.inner.lock().load_image(image)
    }

    /// The lock is held for the whole operator run.
    pub fn apply(&self, op: &dyn Operator) -> Result<(), EditError> {
        self.inner.lock().apply(op)
    }

    pub fn apply_spec(&self, spec: &OperatorSpec) -> Result<(), EditError> {
        let op = spec.build()?;
        self.apply(op.as_ref())
    }

    pub fn render(&self) -> Option<PixelGrid> {
        self.inner.lock().render()
    }

    /// Structural copy of the whole stack.
    pub fn snapshot(&self) -> LayerStack {
        self.inner.lock().clone()
    }

    /// Run several steps under one lock. Steps that succeeded before a
    /// failing one stay applied.
    pub fn with<R>(&self, f: impl FnOnce(&mut LayerStack) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn into_inner(self) -> LayerStack {
        self.inner.into_inner()
    }
}

impl From<LayerStack> for SharedLayerStack {
    fn from(stack: LayerStack) -> Self {
        Self::new(stack)
    }
}
