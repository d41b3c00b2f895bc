//! Layers - the building blocks of a composition.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GeometryError;
use crate::geometry::{Point, Rect};

/// Smallest display width or height a layer can be given.
pub const MIN_LAYER_SIZE: f64 = 1.0;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Create a new unique layer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded RGBA8 pixels at the image's native size.
///
/// The buffer is shared and never mutated after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 data (4 bytes per pixel, row-major).
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the data length does
    /// not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::ZeroSized { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(GeometryError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: data.into(),
        })
    }

    /// A buffer filled with one colour.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, GeometryError> {
        let data = rgba.repeat(width as usize * height as usize);
        Self::from_rgba(width, height, data)
    }

    /// Native width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Native height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Alpha channel at `(x, y)`; zero outside the buffer.
    #[must_use]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y).map_or(0, |px| px[3])
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// One independently positioned and scaled raster image.
///
/// Scale is never stored: it is derived from the display size over the
/// native size of the pixel buffer.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    pixels: PixelBuffer,
    display_width: f64,
    display_height: f64,
    position: Point,
    opacity: f64,
    visible: bool,
    selected: bool,
}

impl Layer {
    /// Create a layer at the origin, at native size, fully opaque, visible
    /// and unselected.
    #[must_use]
    pub fn new(name: impl Into<String>, pixels: PixelBuffer) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            display_width: f64::from(pixels.width()),
            display_height: f64::from(pixels.height()),
            pixels,
            position: Point::ORIGIN,
            opacity: 1.0,
            visible: true,
            selected: false,
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.set_position(x, y);
        self
    }

    /// Set the display size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.set_size(width, height);
        self
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded pixels at native size.
    #[must_use]
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Top-left corner in composition space.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Rendered width.
    #[must_use]
    pub fn display_width(&self) -> f64 {
        self.display_width
    }

    /// Rendered height.
    #[must_use]
    pub fn display_height(&self) -> f64 {
        self.display_height
    }

    /// Scale factors `(display / native)` per axis.
    #[must_use]
    pub fn scale(&self) -> (f64, f64) {
        (
            self.display_width / f64::from(self.pixels.width()),
            self.display_height / f64::from(self.pixels.height()),
        )
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Whether the layer takes part in rendering and hit-testing.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the layer is in the selection.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The layer's axis-aligned rectangle in composition space.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.display_width,
            self.display_height,
        )
    }

    /// Show or hide the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flip visibility, returning the new state.
    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Set opacity, clamped to `[0, 1]`. NaN is treated as fully transparent.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Move the top-left corner. Non-finite coordinates are ignored.
    pub fn set_position(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.position = Point::new(x, y);
        }
    }

    /// Set the display size, clamped to [`MIN_LAYER_SIZE`].
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.display_width = clamp_extent(width);
        self.display_height = clamp_extent(height);
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Whether `point` falls on a non-transparent pixel of this layer.
    ///
    /// The point is mapped back into native pixel coordinates through the
    /// inverse of the current scale before the alpha channel is read.
    #[must_use]
    pub fn contains_opaque_point(&self, point: Point) -> bool {
        if !self.rect().contains(point) {
            return false;
        }
        let (scale_x, scale_y) = self.scale();
        let native_x = (point.x - self.position.x) / scale_x;
        let native_y = (point.y - self.position.y) / scale_y;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (px, py) = (
            (native_x.floor().max(0.0) as u32).min(self.pixels.width() - 1),
            (native_y.floor().max(0.0) as u32).min(self.pixels.height() - 1),
        );
        self.pixels.alpha(px, py) > 0
    }
}

fn clamp_extent(value: f64) -> f64 {
    if value.is_nan() {
        MIN_LAYER_SIZE
    } else {
        value.max(MIN_LAYER_SIZE)
    }
}
