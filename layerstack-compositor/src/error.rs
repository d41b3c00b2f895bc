//! Import and export error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for a single-file import.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Failure to turn one file into a layer.
///
/// Import errors are per file: the remaining files of a batch are still
/// imported.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Failed to import {}: {kind}", .path.display())]
pub struct ImportError {
    /// The file that failed.
    pub path: PathBuf,
    /// Why it failed.
    pub kind: ImportErrorKind,
}

impl ImportError {
    /// Create an import error for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ImportErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Why an import failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// The file could not be read.
    #[error("unreadable path ({0})")]
    UnreadablePath(String),

    /// The file is not a PNG or JPEG image.
    #[error("unsupported format ({0})")]
    UnsupportedFormat(String),

    /// The image has no pixels.
    #[error("zero-sized image")]
    ZeroSized,

    /// The file claims a supported format but could not be decoded.
    #[error("decode failed ({0})")]
    Decode(String),
}

/// Failure to write a flattened composition.
///
/// Exports never modify the composition.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No visible layer to export.
    #[error("Nothing to export: the composition has no visible layers")]
    EmptyComposition,

    /// Output format is not supported.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Encoding the bitmap failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// The output path could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
