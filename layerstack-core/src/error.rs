//! Error types for layer stack operations.

use thiserror::Error;

use crate::LayerId;

/// Result type for composition operations.
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Errors that can occur when addressing layers in a composition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    /// Layer is not part of the stack.
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),
}

/// Errors raised when building pixel data with impossible dimensions.
///
/// Interactive size and scale requests are clamped instead and never
/// produce this error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// Width or height is zero.
    #[error("Image has zero width or height ({width}x{height})")]
    ZeroSized {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Raw buffer length does not match `width * height * 4`.
    #[error("Pixel buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
}
