//! Input events accepted from the host and notifications sent back to it.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::{Layer, LayerId};

/// Input the host forwards to the editor.
///
/// Pointer coordinates are in screen pixels of the preview surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Whether the additive-selection modifier is held.
        #[serde(default)]
        additive: bool,
    },

    /// Pointer moved.
    PointerMove {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// Primary button released.
    PointerUp {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// Selection click without gesture recognition.
    Click {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Whether the additive-selection modifier is held.
        #[serde(default)]
        additive: bool,
    },

    /// Flip visibility of the layer at a stack index (0 = bottom).
    ToggleVisibility {
        /// Stack index.
        index: usize,
    },

    /// Zoom in one step.
    ZoomIn,

    /// Zoom out one step.
    ZoomOut,

    /// Back to 100%.
    ResetZoom,

    /// Fit all visible layers into the preview.
    FitToWindow,
}

/// One row of the layers panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    /// Layer identity.
    pub id: LayerId,
    /// Display name.
    pub name: String,
    /// Visibility flag.
    pub visible: bool,
    /// Selection flag.
    pub selected: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Current rectangle in composition space.
    pub rect: Rect,
}

impl From<&Layer> for LayerSummary {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id(),
            name: layer.name().to_string(),
            visible: layer.is_visible(),
            selected: layer.is_selected(),
            opacity: layer.opacity(),
            rect: layer.rect(),
        }
    }
}

/// The layer list (bottom first) and selection at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Layers in stack order.
    pub layers: Vec<LayerSummary>,
    /// Selected layer ids in stack order.
    pub selection: Vec<LayerId>,
}

/// Change notifications for external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "snapshot", rename_all = "snake_case")]
pub enum Notification {
    /// The selection set changed.
    SelectionChanged(Snapshot),
    /// Layers were added, removed, shown or hidden.
    LayersChanged(Snapshot),
    /// A move or scale gesture finished.
    GestureCommitted(Snapshot),
}

impl Notification {
    /// The snapshot carried by the notification.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Self::SelectionChanged(snapshot)
            | Self::LayersChanged(snapshot)
            | Self::GestureCommitted(snapshot) => snapshot,
        }
    }
}

/// Receiver for [`Notification`]s.
pub trait EventSink {
    /// Called once per notification, in emission order.
    fn notify(&mut self, notification: &Notification);
}

impl<F> EventSink for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_json() {
        let events: Vec<InputEvent> = serde_json::from_str(
            r#"[
                {"type": "pointer_down", "x": 1.5, "y": 2.0},
                {"type": "pointer_move", "x": 3.0, "y": 4.0},
                {"type": "pointer_up", "x": 3.0, "y": 4.0},
                {"type": "click", "x": 0.0, "y": 0.0, "additive": true},
                {"type": "toggle_visibility", "index": 1},
                {"type": "fit_to_window"}
            ]"#,
        )
        .expect("parse events");

        assert_eq!(
            events[0],
            InputEvent::PointerDown {
                x: 1.5,
                y: 2.0,
                additive: false
            }
        );
        assert_eq!(
            events[3],
            InputEvent::Click {
                x: 0.0,
                y: 0.0,
                additive: true
            }
        );
        assert_eq!(events[4], InputEvent::ToggleVisibility { index: 1 });
        assert_eq!(events[5], InputEvent::FitToWindow);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |n: &Notification| seen.push(n.clone());
            sink.notify(&Notification::LayersChanged(Snapshot::default()));
        }
        assert_eq!(seen.len(), 1);
        assert!(seen[0].snapshot().layers.is_empty());
    }
}
