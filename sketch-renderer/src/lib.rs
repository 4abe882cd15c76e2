//! # Sketch Renderer
//!
//! Raster export for sketch whiteboards.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────────┐   ┌──────────┐   ┌────────────────┐   ┌─────┐
//! │ SceneSnapshot │ → │ SVG text │ → │ usvg / resvg   │ → │ PNG │
//! └───────────────┘   └──────────┘   │ tiny-skia      │   └─────┘
//!                                    └────────────────┘
//! ```
//!
//! [`SnapshotExporter`] implements [`sketch_core::Rasterizer`], so it plugs
//! straight into [`sketch_core::Whiteboard::with_rasterizer`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;

pub use error::{RenderError, RenderResult};
pub use export::{ExportFormat, SnapshotExporter};
