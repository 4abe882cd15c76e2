//! History records - one per completed stroke.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stroke::PathData;
use crate::style::BrushSnapshot;

/// Opaque, stable identifier of a stroke.
///
/// Freshly drawn strokes get a UUID; restored strokes keep whatever id they
/// were saved with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeId(String);

impl StrokeId {
    /// Create a new unique stroke ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of mark a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    /// A freehand line.
    #[default]
    Line,
}

/// One completed stroke.
///
/// Geometry and style are fixed when the stroke completes. The live surface
/// node is owned by [`SceneSync`](crate::SceneSync) and looked up by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeRecord {
    /// Unique identifier.
    pub id: StrokeId,
    /// Mark kind.
    pub kind: StrokeKind,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Final path geometry.
    pub geometry: PathData,
    /// Resolved brush at creation time.
    pub style: BrushSnapshot,
}

impl StrokeRecord {
    /// Create a line record stamped with the current time.
    #[must_use]
    pub fn line(geometry: PathData, style: BrushSnapshot) -> Self {
        Self {
            id: StrokeId::new(),
            kind: StrokeKind::Line,
            created_at: now_ms(),
            geometry,
            style,
        }
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
#[must_use]
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch.
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}
