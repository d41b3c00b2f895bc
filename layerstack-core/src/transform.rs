//! Move and scale gestures.
//!
//! [`TransformController`] is a three-state machine:
//!
//! ```text
//!            press on handle            press on selected body
//!   ┌──────────────────────┐ Idle ┌─────────────────────────┐
//!   ▼                      └──┬───┘                         ▼
//! DraggingScale ── release ──►│◄── release ──────── DraggingMove
//! ```
//!
//! Every update is computed from the snapshot taken when the gesture began,
//! never from the previous tick, so a long drag does not accumulate error.

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::geometry::{Point, Rect};
use crate::hit_test::hit_test;
use crate::layer::LayerId;

/// Tuning for gesture recognition and scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Handle hit radius in screen pixels, independent of zoom.
    pub handle_radius_px: f64,
    /// Smallest scale factor a scale gesture can reach.
    pub min_scale: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            handle_radius_px: 6.0,
            min_scale: 0.1,
        }
    }
}

/// A corner of the selection bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom-left corner.
    BottomLeft,
}

/// The midpoint of an edge of the selection bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

/// One of the eight transform handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Handle {
    /// Scales both axes.
    Corner(Corner),
    /// Scales the axis perpendicular to the edge.
    Edge(Edge),
}

impl Handle {
    /// All handles, corners first.
    pub const ALL: [Handle; 8] = [
        Handle::Corner(Corner::TopLeft),
        Handle::Corner(Corner::TopRight),
        Handle::Corner(Corner::BottomRight),
        Handle::Corner(Corner::BottomLeft),
        Handle::Edge(Edge::Top),
        Handle::Edge(Edge::Right),
        Handle::Edge(Edge::Bottom),
        Handle::Edge(Edge::Left),
    ];

    /// Fractional location of the handle on a rectangle, `(0,0)` top-left.
    fn fraction(self) -> (f64, f64) {
        match self {
            Handle::Corner(Corner::TopLeft) => (0.0, 0.0),
            Handle::Corner(Corner::TopRight) => (1.0, 0.0),
            Handle::Corner(Corner::BottomRight) => (1.0, 1.0),
            Handle::Corner(Corner::BottomLeft) => (0.0, 1.0),
            Handle::Edge(Edge::Top) => (0.5, 0.0),
            Handle::Edge(Edge::Right) => (1.0, 0.5),
            Handle::Edge(Edge::Bottom) => (0.5, 1.0),
            Handle::Edge(Edge::Left) => (0.0, 0.5),
        }
    }

    /// Where the handle sits on `rect`.
    #[must_use]
    pub fn position(self, rect: &Rect) -> Point {
        let (fx, fy) = self.fraction();
        Point::new(rect.x + fx * rect.width, rect.y + fy * rect.height)
    }

    /// The point of `rect` held fixed while dragging this handle.
    #[must_use]
    pub fn anchor(self, rect: &Rect) -> Point {
        let (fx, fy) = self.fraction();
        Point::new(
            rect.x + (1.0 - fx) * rect.width,
            rect.y + (1.0 - fy) * rect.height,
        )
    }

    /// Growth direction per axis: `-1`, `1`, or `0` when the axis is not scaled.
    #[must_use]
    pub fn direction(self) -> (f64, f64) {
        let (fx, fy) = self.fraction();
        (fx * 2.0 - 1.0, fy * 2.0 - 1.0)
    }
}

/// What an active gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "handle", rename_all = "snake_case")]
pub enum GestureKind {
    /// Rigid translation of the selection.
    Move,
    /// Scaling around the handle's anchor.
    Scale(Handle),
}

/// Observable state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    /// No gesture in progress.
    Idle,
    /// Translating the selection.
    DraggingMove,
    /// Scaling the selection.
    DraggingScale,
}

/// Position and size of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    /// Layer identity.
    pub id: LayerId,
    /// Top-left corner.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
}

/// An in-progress gesture and the snapshot it is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformGesture {
    /// What the gesture does.
    pub kind: GestureKind,
    /// Point held fixed while scaling. Unused for moves.
    pub anchor: Point,
    /// Pointer position at press.
    pub start_pointer: Point,
    /// Selection bounding box at press.
    pub start_bounds: Rect,
    /// Every selected layer at press.
    pub start_states: Vec<LayerState>,
}

impl TransformGesture {
    /// Layer states for the pointer at `pointer`, relative to the snapshot.
    #[must_use]
    pub fn states_at(&self, pointer: Point, min_scale: f64) -> Vec<LayerState> {
        let delta = pointer - self.start_pointer;
        match self.kind {
            GestureKind::Move => self
                .start_states
                .iter()
                .map(|state| LayerState {
                    position: state.position + delta,
                    ..*state
                })
                .collect(),
            GestureKind::Scale(handle) => {
                let (sx, sy) = self.scale_factors(handle, delta, min_scale);
                self.start_states
                    .iter()
                    .map(|state| LayerState {
                        id: state.id,
                        position: self.anchor + (state.position - self.anchor).scale(sx, sy),
                        width: state.width * sx,
                        height: state.height * sy,
                    })
                    .collect()
            }
        }
    }

    fn scale_factors(&self, handle: Handle, delta: Point, min_scale: f64) -> (f64, f64) {
        let (dir_x, dir_y) = handle.direction();
        let axis = |dir: f64, moved: f64, extent: f64| {
            if dir == 0.0 || extent <= 0.0 {
                1.0
            } else {
                ((extent + dir * moved) / extent).max(min_scale)
            }
        };
        (
            axis(dir_x, delta.x, self.start_bounds.width),
            axis(dir_y, delta.y, self.start_bounds.height),
        )
    }
}

/// Turns pointer presses, drags and releases into layer transforms.
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    config: TransformConfig,
    gesture: Option<TransformGesture>,
}

impl TransformController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(config: TransformConfig) -> Self {
        Self {
            config,
            gesture: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DragState {
        match self.gesture.as_ref().map(|g| g.kind) {
            None => DragState::Idle,
            Some(GestureKind::Move) => DragState::DraggingMove,
            Some(GestureKind::Scale(_)) => DragState::DraggingScale,
        }
    }

    /// The active gesture, if any.
    #[must_use]
    pub fn gesture(&self) -> Option<&TransformGesture> {
        self.gesture.as_ref()
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// The handle within reach of `point`, nearest first.
    ///
    /// The reach is a square of `handle_radius_px` screen pixels, converted
    /// into composition space through `zoom`.
    #[must_use]
    pub fn handle_at(&self, composition: &Composition, point: Point, zoom: f64) -> Option<Handle> {
        let rect = composition.selection_bounds().rect()?;
        let reach = self.config.handle_radius_px / zoom;
        Handle::ALL
            .iter()
            .map(|&handle| {
                let at = handle.position(&rect);
                (handle, (at.x - point.x).abs().max((at.y - point.y).abs()))
            })
            .filter(|&(_, distance)| distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    /// Handle a press at `point`.
    ///
    /// Starts a scale gesture when a handle is struck, otherwise a move
    /// gesture when the opaque body of a selected layer is struck. Returns
    /// `None` when the press is not a gesture and should be treated as a
    /// selection click.
    pub fn begin(
        &mut self,
        composition: &Composition,
        point: Point,
        zoom: f64,
    ) -> Option<GestureKind> {
        if let Some(stale) = self.gesture.take() {
            tracing::warn!("Press during {:?} without release, committing it", stale.kind);
        }

        let kind = if let Some(handle) = self.handle_at(composition, point, zoom) {
            GestureKind::Scale(handle)
        } else {
            let hit = hit_test(composition.layers(), point)?;
            if !composition.selection().contains(hit.id()) {
                return None;
            }
            GestureKind::Move
        };

        let start_bounds = composition.selection_bounds().rect()?;
        let anchor = match kind {
            GestureKind::Scale(handle) => handle.anchor(&start_bounds),
            GestureKind::Move => start_bounds.origin(),
        };
        let start_states = composition
            .selected_layers()
            .map(|layer| LayerState {
                id: layer.id(),
                position: layer.position(),
                width: layer.display_width(),
                height: layer.display_height(),
            })
            .collect();

        tracing::debug!("Gesture {kind:?} started at ({}, {})", point.x, point.y);
        self.gesture = Some(TransformGesture {
            kind,
            anchor,
            start_pointer: point,
            start_bounds,
            start_states,
        });
        Some(kind)
    }

    /// Apply the active gesture for the pointer at `point`.
    ///
    /// Returns `false` (and changes nothing) when idle.
    pub fn update(&mut self, composition: &mut Composition, point: Point) -> bool {
        let Some(gesture) = &self.gesture else {
            return false;
        };
        for state in gesture.states_at(point, self.config.min_scale) {
            composition.apply_layer_state(&state);
        }
        true
    }

    /// Handle a release at `point`, committing the gesture.
    ///
    /// Returns the finished gesture kind, or `None` when idle.
    pub fn end(&mut self, composition: &mut Composition, point: Point) -> Option<GestureKind> {
        self.update(composition, point);
        let gesture = self.gesture.take()?;
        tracing::debug!("Gesture {:?} committed", gesture.kind);
        Some(gesture.kind)
    }
}
