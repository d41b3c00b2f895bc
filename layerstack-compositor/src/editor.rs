//! The editor facade.
//!
//! [`Editor`] owns the composition and is the only thing that mutates it.
//! Hosts forward pointer input and commands; every mutation re-renders the
//! preview and, where collaborators care, emits a [`Notification`].

use std::fmt;
use std::path::Path;

use layerstack_core::{
    Bounds, Composition, CompositionError, CompositionResult, DragState, EventSink, GestureKind,
    InputEvent, Layer, LayerId, LayerSummary, Notification, Overlay, PixelBuffer, Point, Snapshot,
    TransformConfig, TransformController, Viewport,
};

use crate::compositor::{Bitmap, Compositor, CompositorConfig};
use crate::error::ExportResult;
use crate::export::{ExportConfig, ExportSummary, Exporter};
use crate::import::{load_layer, ImportReport};

/// Configuration for an [`Editor`].
#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    /// Initial preview size and view transform.
    pub viewport: Viewport,
    /// Handle reach and minimum scale for gestures.
    pub transform: TransformConfig,
    /// Preview background and overlay styling.
    pub compositor: CompositorConfig,
    /// Export format and JPEG settings.
    pub export: ExportConfig,
}

/// Owns a composition and wires hit-testing, selection and transforms
/// together.
///
/// Pointer coordinates passed to the editor are in preview (screen) pixels.
pub struct Editor {
    composition: Composition,
    controller: TransformController,
    compositor: Compositor,
    exporter: Exporter,
    viewport: Viewport,
    preview: Bitmap,
    scene_rect: Bounds,
    sinks: Vec<Box<dyn EventSink>>,
    queue: Vec<Notification>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("layers", &self.composition.layer_count())
            .field("selected", &self.composition.selection().len())
            .field("state", &self.controller.state())
            .field("viewport", &self.viewport)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Editor {
    /// Create an editor with an empty composition.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let mut editor = Self {
            composition: Composition::new(),
            controller: TransformController::new(config.transform),
            compositor: Compositor::new(config.compositor),
            exporter: Exporter::new(config.export),
            viewport: config.viewport,
            preview: Bitmap::new(1, 1),
            scene_rect: Bounds::Empty,
            sinks: Vec::new(),
            queue: Vec::new(),
        };
        editor.refresh();
        editor
    }

    /// Create an editor with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EditorConfig::default())
    }

    /// Register a receiver for notifications.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Drain notifications emitted since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    /// The composition being edited.
    #[must_use]
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// The current view transform.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The last rendered preview, overlay included.
    #[must_use]
    pub fn preview(&self) -> &Bitmap {
        &self.preview
    }

    /// Bounding box of the visible layers as of the last render.
    #[must_use]
    pub fn scene_rect(&self) -> Bounds {
        self.scene_rect
    }

    /// Gesture state.
    #[must_use]
    pub fn state(&self) -> DragState {
        self.controller.state()
    }

    /// Rows for a layers panel, topmost layer first.
    #[must_use]
    pub fn panel_rows(&self) -> Vec<LayerSummary> {
        self.composition
            .layers()
            .iter()
            .rev()
            .map(LayerSummary::from)
            .collect()
    }

    /// Import image files as new layers on top of the stack, in order.
    ///
    /// A file that fails is reported and skipped; the rest are still
    /// imported.
    pub fn import_images<P: AsRef<Path>>(
        &mut self,
        paths: impl IntoIterator<Item = P>,
    ) -> ImportReport {
        let mut report = ImportReport::default();
        for path in paths {
            let path = path.as_ref();
            match load_layer(path) {
                Ok(layer) => {
                    tracing::info!(
                        "Imported {} as layer {} ({}x{})",
                        path.display(),
                        layer.id(),
                        layer.pixels().width(),
                        layer.pixels().height()
                    );
                    report.imported.push(self.composition.add_layer(layer));
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    report.failed.push(e);
                }
            }
        }

        if !report.imported.is_empty() {
            self.refresh();
            self.emit(Notification::LayersChanged);
        }
        report
    }

    /// Add an already-decoded image as a new top layer.
    pub fn import_pixels(&mut self, name: impl Into<String>, pixels: PixelBuffer) -> LayerId {
        let id = self.composition.add_layer(Layer::new(name, pixels));
        self.refresh();
        self.emit(Notification::LayersChanged);
        id
    }

    /// Flatten the visible layers and write them to `path`.
    ///
    /// The composition is never modified, even on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is visible or the file cannot be encoded
    /// or written.
    pub fn export_image(&self, path: impl AsRef<Path>) -> ExportResult<ExportSummary> {
        self.exporter
            .export(&self.compositor, self.composition.layers(), path.as_ref())
    }

    /// Flip a layer's visibility, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn toggle_visibility(&mut self, id: LayerId) -> CompositionResult<bool> {
        let visible = self.composition.toggle_visibility(id)?;
        tracing::debug!("Layer {id} visible: {visible}");
        self.refresh();
        self.emit(Notification::LayersChanged);
        Ok(visible)
    }

    /// Set a layer's opacity, clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> CompositionResult<()> {
        self.composition
            .get_layer_mut(id)
            .ok_or(CompositionError::LayerNotFound(id))?
            .set_opacity(opacity);
        self.refresh();
        self.emit(Notification::LayersChanged);
        Ok(())
    }

    /// Remove a layer from the stack and the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found.
    pub fn remove_layer(&mut self, id: LayerId) -> CompositionResult<Layer> {
        let was_selected = self.composition.selection().contains(id);
        let layer = self.composition.remove_layer(id)?;
        tracing::info!("Removed layer {id} ({})", layer.name());
        self.refresh();
        self.emit(Notification::LayersChanged);
        if was_selected {
            self.emit(Notification::SelectionChanged);
        }
        Ok(layer)
    }

    /// Selection click at a screen point. Returns whether the selection
    /// changed.
    pub fn click(&mut self, screen: Point, additive: bool) -> bool {
        let point = self.viewport.screen_to_composition(screen);
        self.select_at(point, additive)
    }

    /// Primary button pressed at a screen point.
    ///
    /// Starts a move or scale gesture when the press strikes a handle or a
    /// selected layer; otherwise the press is a selection click. Returns the
    /// gesture started, if any.
    pub fn pointer_down(&mut self, screen: Point, additive: bool) -> Option<GestureKind> {
        let point = self.viewport.screen_to_composition(screen);
        if self.controller.is_dragging() {
            self.finish_gesture(point);
        }
        if additive {
            self.select_at(point, true);
            return None;
        }

        match self
            .controller
            .begin(&self.composition, point, self.viewport.zoom)
        {
            Some(kind) => Some(kind),
            None => {
                self.select_at(point, false);
                None
            }
        }
    }

    /// Pointer moved to a screen point. Ignored outside a gesture.
    ///
    /// Returns whether the layers were transformed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let point = self.viewport.screen_to_composition(screen);
        if !self.controller.update(&mut self.composition, point) {
            return false;
        }
        self.refresh();
        true
    }

    /// Primary button released at a screen point, committing any gesture.
    ///
    /// Releases outside the preview still commit. Returns the gesture that
    /// finished, or `None` when idle.
    pub fn pointer_up(&mut self, screen: Point) -> Option<GestureKind> {
        let point = self.viewport.screen_to_composition(screen);
        self.finish_gesture(point)
    }

    /// Zoom in one step around the preview centre.
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.refresh();
    }

    /// Zoom out one step around the preview centre.
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.refresh();
    }

    /// Back to 100% with no pan.
    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        self.refresh();
    }

    /// Fit the visible layers into the preview.
    pub fn fit_to_window(&mut self) {
        self.viewport.fit(self.scene_rect);
        self.refresh();
    }

    /// Resize the preview surface.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.refresh();
    }

    /// Dispatch a host input event. Returns `false` when the event had no
    /// effect.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::PointerDown { x, y, additive } => {
                let before = self.composition.selection().ids().to_vec();
                self.pointer_down(Point::new(x, y), additive).is_some()
                    || before != self.composition.selection().ids()
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(x, y)).is_some(),
            InputEvent::Click { x, y, additive } => self.click(Point::new(x, y), additive),
            InputEvent::ToggleVisibility { index } => {
                let Some(id) = self.composition.layers().get(index).map(Layer::id) else {
                    tracing::warn!("No layer at index {index}");
                    return false;
                };
                self.toggle_visibility(id).is_ok()
            }
            InputEvent::ZoomIn => {
                self.zoom_in();
                true
            }
            InputEvent::ZoomOut => {
                self.zoom_out();
                true
            }
            InputEvent::ResetZoom => {
                self.reset_zoom();
                true
            }
            InputEvent::FitToWindow => {
                self.fit_to_window();
                true
            }
        }
    }

    fn select_at(&mut self, point: Point, additive: bool) -> bool {
        let target = self.composition.layer_at(point);
        let changed = self.composition.click(target, additive);
        if changed {
            tracing::debug!(
                "Selection now {} layer(s)",
                self.composition.selection().len()
            );
            self.refresh();
            self.emit(Notification::SelectionChanged);
        }
        changed
    }

    fn finish_gesture(&mut self, point: Point) -> Option<GestureKind> {
        let kind = self.controller.end(&mut self.composition, point)?;
        self.refresh();
        self.emit(Notification::GestureCommitted);
        Some(kind)
    }

    fn refresh(&mut self) {
        let overlay = Overlay::build(
            &self.composition,
            self.viewport.zoom,
            self.compositor.config().handle_size_px,
        );
        self.preview =
            self.compositor
                .render_with_overlay(self.composition.layers(), &self.viewport, &overlay);
        self.scene_rect = self.composition.visible_bounds();
    }

    fn emit(&mut self, make: fn(Snapshot) -> Notification) {
        let notification = make(self.composition.snapshot());
        for sink in &mut self.sinks {
            sink.notify(&notification);
        }
        self.queue.push(notification);
    }
}
