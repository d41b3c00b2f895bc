//! One headless editing session.

use std::path::PathBuf;

use anyhow::Context;
use layerstack_compositor::{Editor, ExportFormat, ExportSummary, Exporter};
use layerstack_core::{InputEvent, Notification};
use serde::Serialize;

use crate::script::load_script;
use crate::HostConfig;

/// What a run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Number of layers imported.
    pub imported: usize,
    /// One message per file that failed to import.
    pub failed: Vec<String>,
    /// Script events that changed something.
    pub events_applied: usize,
    /// Notifications emitted during the run.
    pub notifications: usize,
    /// Preview file written, if requested.
    pub preview: Option<PathBuf>,
    /// The flattened export.
    pub export: ExportSummary,
}

/// Import, hide, replay, and export according to `config`.
///
/// # Errors
///
/// Returns an error if the event script is invalid, the preview cannot be
/// written, or the export fails.
pub fn run(config: &HostConfig) -> anyhow::Result<RunReport> {
    let events = match &config.events {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let mut editor = Editor::new(config.editor.clone());
    editor.subscribe(log_notification);

    let import = editor.import_images(&config.images);
    let failed: Vec<String> = import.failed.iter().map(ToString::to_string).collect();

    for &index in &config.hide {
        editor.handle_event(&InputEvent::ToggleVisibility { index });
    }

    let events_applied = events
        .iter()
        .filter(|event| editor.handle_event(event))
        .count();
    tracing::info!("Replayed {events_applied}/{} event(s)", events.len());

    let preview = match &config.preview {
        Some(path) => {
            let bytes = Exporter::with_defaults().encode(editor.preview(), ExportFormat::Png)?;
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write preview {}", path.display()))?;
            tracing::info!("Wrote preview to {}", path.display());
            Some(path.clone())
        }
        None => None,
    };

    let export = editor.export_image(&config.output)?;
    let notifications = editor.take_notifications().len();

    Ok(RunReport {
        imported: import.imported.len(),
        failed,
        events_applied,
        notifications,
        preview,
        export,
    })
}

fn log_notification(notification: &Notification) {
    let snapshot = notification.snapshot();
    match notification {
        Notification::SelectionChanged(_) => {
            tracing::info!("Selection: {} layer(s)", snapshot.selection.len());
        }
        Notification::LayersChanged(_) => {
            tracing::info!("Layers: {}", snapshot.layers.len());
        }
        Notification::GestureCommitted(_) => {
            for layer in snapshot
                .layers
                .iter()
                .filter(|layer| snapshot.selection.contains(&layer.id))
            {
                tracing::info!(
                    "Committed {} at ({}, {}) size {}x{}",
                    layer.name,
                    layer.rect.x,
                    layer.rect.y,
                    layer.rect.width,
                    layer.rect.height
                );
            }
        }
    }
}
