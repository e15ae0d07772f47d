//! Error types for the plugin runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading plugin units or running the launcher child.
///
/// Discovery catches these per unit and logs them; the launcher converts
/// them into the failure line of the child protocol. They never cross the
/// public execution boundary.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Unit manifest could not be read.
    #[error("failed to read unit manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unit manifest is not valid JSON of the expected shape.
    #[error("failed to parse unit manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest names an entry point the catalog does not know.
    #[error("unknown catalog entry '{entry}' in unit {unit}")]
    UnknownEntry { entry: String, unit: String },

    /// The launcher was asked for a handler no module in the unit carries.
    #[error("handler '{handler}' not found in unit {unit}")]
    HandlerNotFound { handler: String, unit: String },

    /// Payload file could not be read by the launcher child.
    #[error("failed to read payload {path}: {source}")]
    PayloadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload file is not valid JSON of the expected shape.
    #[error("failed to parse payload: {0}")]
    PayloadParse(#[source] serde_json::Error),

    /// The handler panicked inside the launcher child.
    #[error("handler panicked: {message}")]
    HandlerPanicked { message: String },
}
