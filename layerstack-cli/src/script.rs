//! Recorded input-event scripts.
//!
//! A script is a JSON array of [`InputEvent`]s, for example
//! `[{"type": "click", "x": 10, "y": 10}, {"type": "pointer_down", "x": 10, "y": 10}]`.

use std::path::{Path, PathBuf};

use layerstack_core::InputEvent;
use thiserror::Error;

/// Errors loading an event script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("Failed to read event script {}: {source}", .path.display())]
    Read {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The script is not a valid event list.
    #[error("Invalid event script {}: {source}", .path.display())]
    Parse {
        /// Script path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Read an event script from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<Vec<InputEvent>, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
