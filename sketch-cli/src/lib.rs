//! # Sketch Export
//!
//! Headless export of saved whiteboard drawings.
//!
//! Reads a JSON array of serialized stroke records, replays it into an
//! in-memory whiteboard and writes the result as PNG, SVG or a PNG data URL.
//!
//! ## Usage
//!
//! ```bash
//! sketch-export --input drawing.json --output drawing.png
//! ```
//!
//! ## With options:
//!
//! ```bash
//! sketch-export --input drawing.json --output drawing.txt --format data-url \
//!     --width 1024 --height 768 --scale 2 --background '#fafafa'
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sketch_core::snapshot::effective_scale;
use sketch_core::{
    LineCap, LineJoin, OptionsDocument, Scene, SerializableRecord, Whiteboard, WhiteboardOptions,
};
use sketch_renderer::{ExportFormat, SnapshotExporter};

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// PNG image bytes.
    Png,
    /// Standalone SVG markup.
    Svg,
    /// `data:image/png;base64,...` text.
    DataUrl,
}

/// Command-line arguments for sketch-export.
#[derive(Debug, Clone, Parser)]
#[command(name = "sketch-export")]
#[command(about = "Render a saved sketch whiteboard to an image")]
#[command(version)]
pub struct CliArgs {
    /// JSON file holding serialized stroke records
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output file path
    #[arg(long, short)]
    pub output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "png")]
    pub format: OutputFormat,

    /// Surface width in CSS pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Surface height in CSS pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Raster export scale (never below 1)
    #[arg(long, env = "SKETCH_EXPORT_SCALE")]
    pub scale: Option<f32>,

    /// Background color
    #[arg(long, env = "SKETCH_BACKGROUND")]
    pub background: Option<String>,

    /// Stroke end shape (butt, round, square)
    #[arg(long)]
    pub linecap: Option<LineCap>,

    /// Stroke corner shape (arcs, bevel, miter, miter-clip, round)
    #[arg(long)]
    pub linejoin: Option<LineJoin>,

    /// JSON options document applied before the flags above
    #[arg(long)]
    pub options: Option<PathBuf>,
}

/// Export configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Records file.
    pub input: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Output encoding.
    pub format: OutputFormat,
    /// Surface width in CSS pixels.
    pub width: u32,
    /// Surface height in CSS pixels.
    pub height: u32,
    /// Export scale override.
    pub scale: Option<f32>,
    /// Background color override.
    pub background: Option<String>,
    /// Stroke end shape override.
    pub linecap: Option<LineCap>,
    /// Stroke corner shape override.
    pub linejoin: Option<LineJoin>,
    /// Options document path.
    pub options: Option<PathBuf>,
}

impl From<CliArgs> for ExportConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            input: args.input,
            output: args.output,
            format: args.format,
            width: args.width,
            height: args.height,
            scale: args.scale,
            background: args.background,
            linecap: args.linecap,
            linejoin: args.linejoin,
            options: args.options,
        }
    }
}

impl ExportConfig {
    /// Merge the flags over an optional options document.
    #[must_use]
    pub fn whiteboard_options(&self, document: Option<OptionsDocument>) -> WhiteboardOptions {
        let mut options = document
            .map(OptionsDocument::into_options)
            .unwrap_or_default();
        if let Some(scale) = self.scale {
            options.export_scale = Some(scale);
        }
        if let Some(background) = &self.background {
            options.background_color = Some(background.clone());
        }
        if let Some(linecap) = self.linecap {
            options.linecap = Some(linecap);
        }
        if let Some(linejoin) = self.linejoin {
            options.linejoin = Some(linejoin);
        }
        options
    }
}

/// Replay `records` into a headless whiteboard and encode the drawing.
///
/// The records replace any `initialState` carried by `options`.
///
/// # Errors
///
/// Returns an error if the records cannot be restored, if they hold no
/// strokes, or if rendering fails.
#[allow(clippy::cast_precision_loss)]
pub async fn render(
    config: &ExportConfig,
    mut options: WhiteboardOptions,
    records: Vec<SerializableRecord>,
) -> anyhow::Result<Vec<u8>> {
    let ignored = std::mem::take(&mut options.initial_state);
    if !ignored.is_empty() {
        tracing::warn!(
            "Ignoring {} initialState records from options; strokes come from the input",
            ignored.len()
        );
    }
    let exporter = SnapshotExporter::new();
    let scale = effective_scale(options.export_scale, 1.0);
    let mut board = Whiteboard::new(options).with_rasterizer(Arc::new(exporter));
    board
        .attach(Scene::new(config.width as f32, config.height as f32))
        .context("Failed to attach surface")?;
    board
        .restore(records)
        .context("Failed to restore records")?;
    tracing::info!("Restored {} strokes", board.history().len());

    match config.format {
        OutputFormat::DataUrl => {
            let pending = board
                .save()
                .ok_or_else(|| anyhow::anyhow!("Input holds no strokes"))?;
            Ok(pending.await?.into_bytes())
        }
        OutputFormat::Png | OutputFormat::Svg => {
            anyhow::ensure!(!board.history().is_empty(), "Input holds no strokes");
            let snapshot = board
                .snapshot()
                .ok_or_else(|| anyhow::anyhow!("No surface attached"))?;
            let format = if config.format == OutputFormat::Png {
                ExportFormat::Png
            } else {
                ExportFormat::Svg
            };
            Ok(exporter.export(&snapshot, format, scale)?)
        }
    }
}
