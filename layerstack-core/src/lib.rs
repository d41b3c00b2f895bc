//! # Layerstack Core
//!
//! Data model and interaction logic for a layer-based raster compositor.
//! Nothing in this crate decodes, encodes or rasterizes images; it owns the
//! layer stack and decides what every pointer event does to it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              layerstack-core                │
//! ├─────────────────────────────────────────────┤
//! │  Composition     │  Interaction             │
//! │  - Layers        │  - Hit testing           │
//! │  - Selection     │  - Move / scale gestures │
//! │  - Bounds        │  - Handle overlay        │
//! ├─────────────────────────────────────────────┤
//! │  Geometry        │  Notifications           │
//! │  - Points, rects │  - Snapshots for panels  │
//! │  - Viewport/zoom │  - Event sinks           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod composition;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layer;
pub mod overlay;
pub mod selection;
pub mod transform;
pub mod viewport;

pub use composition::Composition;
pub use error::{CompositionError, CompositionResult, GeometryError};
pub use event::{EventSink, InputEvent, LayerSummary, Notification, Snapshot};
pub use geometry::{Bounds, Point, Rect};
pub use hit_test::hit_test;
pub use layer::{Layer, LayerId, PixelBuffer, MIN_LAYER_SIZE};
pub use overlay::Overlay;
pub use selection::Selection;
pub use transform::{
    Corner, DragState, Edge, GestureKind, Handle, LayerState, TransformConfig,
    TransformController, TransformGesture,
};
pub use viewport::Viewport;

/// Layerstack core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
