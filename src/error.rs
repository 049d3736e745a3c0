//! Error types shared by the loader, the drawers and the renderer.

use thiserror::Error;

/// Everything that can go wrong between reading a warehouse document and
/// putting it on screen.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("malformed warehouse document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expected a FeatureCollection at the top level, found a {0}")]
    NotAFeatureCollection(&'static str),

    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("invalid shelf '{id}': {reason}")]
    InvalidShelf { id: String, reason: String },

    #[error("invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("GPU initialisation failed: {0}")]
    Gpu(String),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, WarehouseError>;

/// Reads a whole file, tagging the error with the path.
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| WarehouseError::Io {
        path: path.display().to_string(),
        source,
    })
}
