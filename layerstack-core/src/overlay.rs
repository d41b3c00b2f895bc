//! Selection outlines and transform handles drawn over the preview.
//!
//! The overlay is derived from the selection and zoom on every render and
//! is never stored alongside the layers.

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::geometry::{Bounds, Point, Rect};
use crate::transform::Handle;

/// Everything drawn on top of the composited layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// One outline per visible selected layer, in composition space.
    pub outlines: Vec<Rect>,
    /// Handle squares around the selection bounds, in composition space.
    pub handles: Vec<(Handle, Rect)>,
    /// Bounding box of the visible selection.
    pub bounds: Bounds,
}

impl Overlay {
    /// Build the overlay for the current selection.
    ///
    /// `handle_size_px` is the on-screen edge length of a handle square; it is
    /// divided by `zoom` so handles keep a constant screen size.
    #[must_use]
    pub fn build(composition: &Composition, zoom: f64, handle_size_px: f64) -> Self {
        let outlines: Vec<Rect> = composition
            .selected_layers()
            .filter(|layer| layer.is_visible())
            .map(|layer| layer.rect())
            .collect();
        let bounds = Bounds::from_rects(outlines.iter().copied());

        let handles = match bounds.rect() {
            Some(rect) => {
                let side = handle_size_px / zoom;
                Handle::ALL
                    .iter()
                    .map(|&handle| {
                        let at = handle.position(&rect);
                        let half = Point::new(side / 2.0, side / 2.0);
                        (handle, Rect::from_corners(at - half, at + half))
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        Self {
            outlines,
            handles,
            bounds,
        }
    }

    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }
}
