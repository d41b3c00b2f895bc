//! Decoding image files into layers.
//!
//! PNG and JPEG files are accepted. Each file becomes one layer at native
//! size; a failing file never affects the others in a batch.

use std::path::Path;

use image::ImageFormat;
use layerstack_core::{GeometryError, Layer, LayerId, PixelBuffer};

use crate::error::{ImportError, ImportErrorKind, ImportResult};

/// File extensions accepted for import.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Outcome of importing a batch of files.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Layers created, in input order.
    pub imported: Vec<LayerId>,
    /// Files that failed, in input order.
    pub failed: Vec<ImportError>,
}

impl ImportReport {
    /// Whether every file was imported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read and decode `path` into a new layer named after the file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a supported format,
/// cannot be decoded, or has no pixels.
pub fn load_layer(path: &Path) -> ImportResult<Layer> {
    let bytes = std::fs::read(path)
        .map_err(|e| ImportError::new(path, ImportErrorKind::UnreadablePath(e.to_string())))?;

    let format = detect_format(path, &bytes).map_err(|kind| ImportError::new(path, kind))?;
    let pixels = decode_pixels(&bytes, format).map_err(|kind| ImportError::new(path, kind))?;

    tracing::debug!(
        "Decoded {} ({:?}, {}x{})",
        path.display(),
        format,
        pixels.width(),
        pixels.height()
    );
    Ok(Layer::new(layer_name(path), pixels))
}

/// Work out the format from the file contents, falling back to the extension
/// to tell "unsupported" apart from "corrupt".
fn detect_format(path: &Path, bytes: &[u8]) -> Result<ImageFormat, ImportErrorKind> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format),
        Ok(other) => Err(ImportErrorKind::UnsupportedFormat(format!("{other:?}"))),
        Err(_) => {
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
                Err(ImportErrorKind::Decode(
                    "file contents are not a recognizable image".to_string(),
                ))
            } else if extension.is_empty() {
                Err(ImportErrorKind::UnsupportedFormat(
                    "no extension".to_string(),
                ))
            } else {
                Err(ImportErrorKind::UnsupportedFormat(extension))
            }
        }
    }
}

/// Decode encoded image bytes into RGBA8 pixels.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded or the image is empty.
pub fn decode_pixels(bytes: &[u8], format: ImageFormat) -> Result<PixelBuffer, ImportErrorKind> {
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImportErrorKind::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    PixelBuffer::from_rgba(width, height, rgba.into_raw()).map_err(|e| match e {
        GeometryError::ZeroSized { .. } => ImportErrorKind::ZeroSized,
        GeometryError::BufferLength { .. } => ImportErrorKind::Decode(e.to_string()),
    })
}

/// Display name for a layer imported from `path`: its file name.
#[must_use]
pub fn layer_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
