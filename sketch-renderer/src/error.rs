//! Renderer error types.

use sketch_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Snapshot markup could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Pixmap allocation or drawing failed.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Image encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for CanvasError {
    fn from(err: RenderError) -> Self {
        Self::Export(err.to_string())
    }
}
