//! Error types for whiteboard operations.

use thiserror::Error;

/// Result type for whiteboard operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in whiteboard operations.
///
/// Only precondition violations and external failures are errors. Empty-state
/// requests (undo with nothing to undo, saving an empty drawing) are no-ops.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// No rendering surface is attached yet.
    #[error("No surface attached")]
    NoSurface,

    /// A stroke gesture is already open.
    #[error("A stroke gesture is already in progress")]
    GestureInProgress,

    /// No stroke gesture is open.
    #[error("No stroke gesture in progress")]
    NoActiveGesture,

    /// History index outside the accepted range.
    #[error("History index {index} out of range for {len} records")]
    IndexOutOfRange {
        /// Requested index.
        index: isize,
        /// Number of records in the history.
        len: usize,
    },

    /// Restore target already holds records.
    #[error("Cannot restore into a history holding {len} records")]
    RestoreIntoNonEmpty {
        /// Number of records already present.
        len: usize,
    },

    /// Surface node not found.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Record serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Raster export failed.
    #[error("Export failed: {0}")]
    Export(String),
}
