//! # Layerstack Compositor
//!
//! CPU rasterization for Layerstack compositions, plus file import/export
//! and the [`Editor`] facade that hosts drive.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ import   │──▶│ Composition │──▶│ Compositor   │──▶│ preview  │
//! │ png/jpeg │   │ (core)      │   │ resample +   │   │ + overlay│
//! └──────────┘   └─────────────┘   │ alpha-over   │   └──────────┘
//!                                  │              │   ┌──────────┐
//!                                  │ flatten      │──▶│ export   │
//!                                  └──────────────┘   └──────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod editor;
pub mod error;
pub mod export;
pub mod import;

pub use compositor::{blend_over, Bitmap, Compositor, CompositorConfig, Flattened};
pub use editor::{Editor, EditorConfig};
pub use error::{ExportError, ExportResult, ImportError, ImportErrorKind, ImportResult};
pub use export::{ExportConfig, ExportFormat, ExportSummary, Exporter};
pub use import::{load_layer, ImportReport, SUPPORTED_EXTENSIONS};

/// Compositor crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
