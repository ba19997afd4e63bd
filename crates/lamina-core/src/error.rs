//! Error taxonomy shared by grids, operators and the layer stack.

use std::fmt;

/// Every failure the core can report.
///
/// Messages name the offending argument and the violated constraint so a
/// dispatcher can show them verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{what} = {value} is out of range (expected {expected})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        expected: String,
    },

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("index ({row}, {col}) is out of bounds for a {width}x{height} grid")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        width: u32,
        height: u32,
    },

    #[error(
        "image is {found_width}x{found_height} but the canvas is {canvas_width}x{canvas_height}"
    )]
    DimensionMismatch {
        canvas_width: u32,
        canvas_height: u32,
        found_width: u32,
        found_height: u32,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("layer not found: {0}")]
    NotFound(String),

    #[error("a layer named {0:?} already exists")]
    DuplicateLayer(String),
}

/// Discriminant of [`EditError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    OutOfRange,
    InvalidShape,
    IndexOutOfBounds,
    DimensionMismatch,
    InvalidState,
    NotFound,
    DuplicateLayer,
}

impl EditError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::InvalidShape(_) => ErrorKind::InvalidShape,
            Self::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateLayer(_) => ErrorKind::DuplicateLayer,
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid argument",
            Self::OutOfRange => "out of range",
            Self::InvalidShape => "invalid shape",
            Self::IndexOutOfBounds => "index out of bounds",
            Self::DimensionMismatch => "dimension mismatch",
            Self::InvalidState => "invalid state",
            Self::NotFound => "not found",
            Self::DuplicateLayer => "duplicate layer",
        };
        f.write_str(label)
    }
}
