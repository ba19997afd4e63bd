use lamina_core::EditError;

use crate::format::ImageFormat;

/// Failures at the codec boundary. Surfaced, never retried.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to decode {format} image: {reason}")]
    Decode { format: ImageFormat, reason: String },
    #[error("failed to encode {format} image: {reason}")]
    Encode { format: ImageFormat, reason: String },
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decoded pixels are invalid: {0}")]
    Edit(#[from] EditError),
}

impl CodecError {
    pub(crate) fn decode(format: ImageFormat, reason: impl ToString) -> Self {
        Self::Decode {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(format: ImageFormat, reason: impl ToString) -> Self {
        Self::Encode {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Failures while reading or writing a layer manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest line {line}: {reason}")]
    Syntax { line: usize, reason: String },
    #[error("layer {layer:?}: {source}")]
    Codec {
        layer: String,
        #[source]
        source: CodecError,
    },
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
