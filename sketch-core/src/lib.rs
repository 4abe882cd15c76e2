//! # Sketch Core
//!
//! Core whiteboard logic: freehand strokes, a navigable stroke history and
//! raster export. Compiles to WASM for browser hosts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Whiteboard                  │
//! ├─────────────────────────────────────────────┤
//! │  Style Resolver  │  Stroke Builder          │
//! │  - Defaults      │  - Sample points         │
//! │  - Live brush    │  - Basis smoothing       │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Scene Sync              │
//! │  - Cursor        │  - Stroke → node map     │
//! │  - Truncation    │  - Attach / detach       │
//! ├─────────────────────────────────────────────┤
//! │  Codec           │  Snapshot                │
//! │  - JSON records  │  - SVG markup → PNG      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod record;
pub mod scene;
pub mod snapshot;
pub mod stroke;
pub mod style;
pub mod sync;
pub mod whiteboard;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use codec::SerializableRecord;
pub use config::{OptionsDocument, WhiteboardOptions};
pub use error::{CanvasError, CanvasResult};
pub use history::{History, HistoryEntry};
pub use record::{StrokeId, StrokeKind, StrokeRecord};
pub use scene::{NodeId, PathNode, Scene, Surface};
pub use snapshot::{Rasterizer, SceneSnapshot, SnapshotPath};
pub use stroke::{basis_path, PathData, Point, StrokeBuilder};
pub use style::{
    BrushSnapshot, BrushValue, ConcreteStyle, LineCap, LineJoin, LineStyles, StyleDefaults,
    StyleResolver,
};
pub use sync::SceneSync;
pub use whiteboard::{ExportFuture, HistoryState, Whiteboard};

/// Sketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
