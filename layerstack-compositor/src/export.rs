//! Writing a flattened composition to disk.
//!
//! The bitmap is sized to the bounding box of the visible layers, never to
//! the preview window, and has a transparent background where the format
//! allows one.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageEncoder;
use layerstack_core::{Layer, Point};
use serde::Serialize;

use crate::compositor::{Bitmap, Compositor};
use crate::error::{ExportError, ExportResult};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image with alpha.
    Png,
    /// JPEG image; transparency is matted onto the configured background.
    Jpeg,
}

impl ExportFormat {
    /// Pick a format from the path's extension. A missing extension means PNG.
    ///
    /// # Errors
    ///
    /// Returns an error for any extension other than png, jpg or jpeg.
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let Some(ext) = path.extension() else {
            return Ok(Self::Png);
        };
        match ext.to_string_lossy().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Configuration for export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output format (default: inferred from the path).
    pub format: Option<ExportFormat>,
    /// Matte colour for formats without alpha (RGBA).
    pub background: [u8; 4],
    /// JPEG quality 1-100 (default: 90).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: None,
            background: [255, 255, 255, 255],
            jpeg_quality: 90,
        }
    }
}

/// What an export wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Output path.
    pub path: PathBuf,
    /// Encoded format.
    pub format: ExportFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Composition-space point of the top-left pixel.
    pub origin: Point,
}

/// Flattens layers and writes them as an image file.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Get the export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Flatten the visible `layers` and write them to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is visible, the format is unsupported,
    /// encoding fails, or the file cannot be written.
    pub fn export(
        &self,
        compositor: &Compositor,
        layers: &[Layer],
        path: &Path,
    ) -> ExportResult<ExportSummary> {
        let format = match self.config.format {
            Some(format) => format,
            None => ExportFormat::from_path(path)?,
        };
        let flattened = compositor
            .flatten(layers)
            .ok_or(ExportError::EmptyComposition)?;

        let bytes = self.encode(&flattened.bitmap, format)?;
        std::fs::write(path, bytes).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = flattened.bitmap.dimensions();
        tracing::info!("Exported {width}x{height} {format:?} to {}", path.display());
        Ok(ExportSummary {
            path: path.to_path_buf(),
            format,
            width,
            height,
            origin: flattened.origin,
        })
    }

    /// Encode a bitmap in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self, bitmap: &Bitmap, format: ExportFormat) -> ExportResult<Vec<u8>> {
        match format {
            ExportFormat::Png => encode_png(bitmap),
            ExportFormat::Jpeg => self.encode_jpeg(bitmap),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, bitmap: &Bitmap) -> ExportResult<Vec<u8>> {
        let (width, height) = bitmap.dimensions();
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in bitmap.pixels() {
            let alpha = f32::from(pixel[3]) / 255.0;
            let inv = 1.0 - alpha;
            for (&src, &matte) in pixel.0[..3].iter().zip(&bg[..3]) {
                let value = f32::from(src).mul_add(alpha, f32::from(matte) * inv);
                rgb_data.push(value.round() as u8);
            }
        }

        let mut buf = Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| ExportError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}

fn encode_png(bitmap: &Bitmap) -> ExportResult<Vec<u8>> {
    let (width, height) = bitmap.dimensions();
    let mut buf = Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(bitmap.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
