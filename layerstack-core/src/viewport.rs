//! Mapping between composition space and the preview surface.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point, Rect};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.05;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 64.0;

/// Zoom step applied by [`Viewport::zoom_in`].
pub const ZOOM_IN_FACTOR: f64 = 1.25;

/// Zoom step applied by [`Viewport::zoom_out`].
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

/// The preview surface and its view onto the composition.
///
/// `screen = composition * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Pan offset X in screen pixels.
    pub pan_x: f64,
    /// Pan offset Y in screen pixels.
    pub pan_y: f64,
}

impl Viewport {
    /// Create an unzoomed viewport of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    /// Map a screen point into composition space.
    #[must_use]
    pub fn screen_to_composition(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    /// Map a composition point onto the screen.
    #[must_use]
    pub fn composition_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.zoom + self.pan_x,
            point.y * self.zoom + self.pan_y,
        )
    }

    /// The composition-space rectangle covered by the surface.
    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        let top_left = self.screen_to_composition(Point::ORIGIN);
        Rect::new(
            top_left.x,
            top_left.y,
            f64::from(self.width) / self.zoom,
            f64::from(self.height) / self.zoom,
        )
    }

    /// Resize the surface, keeping zoom and pan.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Multiply the zoom by `factor`, keeping the surface centre fixed.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let center = Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0);
        let focus = self.screen_to_composition(center);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = center.x - focus.x * self.zoom;
        self.pan_y = center.y - focus.y * self.zoom;
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_IN_FACTOR);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.zoom_by(ZOOM_OUT_FACTOR);
    }

    /// Back to 100% with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Fit `bounds` into the surface, preserving aspect ratio and centring it.
    ///
    /// Empty bounds leave the viewport untouched.
    pub fn fit(&mut self, bounds: Bounds) {
        let Some(rect) = bounds.rect() else {
            return;
        };
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        self.zoom = (width / rect.width)
            .min(height / rect.height)
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = rect.center();
        self.pan_x = width / 2.0 - center.x * self.zoom;
        self.pan_y = height / 2.0 - center.y * self.zoom;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
