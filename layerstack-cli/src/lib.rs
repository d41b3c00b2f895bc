//! # Layerstack CLI
//!
//! Headless host for the Layerstack editor.
//!
//! Imports images as layers, replays a recorded pointer-event script against
//! the editor, and writes the flattened result (and optionally the preview).
//!
//! ## Usage
//!
//! ```bash
//! layerstack a.png b.jpg --output out.png
//! layerstack a.png b.png --events drag.json --preview preview.png --output out.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Resolved configuration for one run
//! - `script` - JSON event scripts
//! - `session` - Drives an `Editor` through one run

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod script;
mod session;

pub use script::{load_script, ScriptError};
pub use session::{run, RunReport};

use std::path::PathBuf;

use clap::Parser;
use layerstack_compositor::{EditorConfig, ExportConfig};
use layerstack_core::Viewport;

/// Command-line arguments for layerstack.
#[derive(Debug, Clone, Parser)]
#[command(name = "layerstack")]
#[command(about = "Composite raster images as layers and export the result")]
#[command(version)]
pub struct CliArgs {
    /// Images to import, bottom layer first
    pub images: Vec<PathBuf>,

    /// Output path for the flattened image (.png, .jpg or .jpeg)
    #[arg(short, long, env = "LAYERSTACK_OUTPUT")]
    pub output: PathBuf,

    /// Also write the preview (with selection overlay) as PNG
    #[arg(long, env = "LAYERSTACK_PREVIEW")]
    pub preview: Option<PathBuf>,

    /// JSON file with input events to replay after import
    #[arg(long, env = "LAYERSTACK_EVENTS")]
    pub events: Option<PathBuf>,

    /// Hide the layer at this stack index (0 = bottom); repeatable
    #[arg(long = "hide", value_name = "INDEX")]
    pub hide: Vec<usize>,

    /// Preview width in pixels
    #[arg(long, env = "LAYERSTACK_VIEWPORT_WIDTH", default_value = "800")]
    pub width: u32,

    /// Preview height in pixels
    #[arg(long, env = "LAYERSTACK_VIEWPORT_HEIGHT", default_value = "600")]
    pub height: u32,

    /// JPEG quality for .jpg output
    #[arg(
        long,
        env = "LAYERSTACK_JPEG_QUALITY",
        default_value = "90",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub jpeg_quality: u8,

    /// Emit logs as JSON lines
    #[arg(long, env = "LAYERSTACK_LOG_JSON")]
    pub log_json: bool,
}

/// Configuration for one headless run.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Images to import, in stack order.
    pub images: Vec<PathBuf>,
    /// Flattened output path.
    pub output: PathBuf,
    /// Optional preview output path.
    pub preview: Option<PathBuf>,
    /// Optional event script.
    pub events: Option<PathBuf>,
    /// Stack indices to hide before replaying events.
    pub hide: Vec<usize>,
    /// Editor configuration.
    pub editor: EditorConfig,
}

impl HostConfig {
    /// Create a configuration that imports `images` and exports to `output`.
    #[must_use]
    pub fn new(images: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            images,
            output,
            preview: None,
            events: None,
            hide: Vec::new(),
            editor: EditorConfig::default(),
        }
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            images: args.images,
            output: args.output,
            preview: args.preview,
            events: args.events,
            hide: args.hide,
            editor: EditorConfig {
                viewport: Viewport::new(args.width, args.height),
                export: ExportConfig {
                    jpeg_quality: args.jpeg_quality,
                    ..ExportConfig::default()
                },
                ..EditorConfig::default()
            },
        }
    }
}
