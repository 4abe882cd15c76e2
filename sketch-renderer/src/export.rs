//! Snapshot export to PNG and SVG.
//!
//! Renders a [`SceneSnapshot`] through its SVG markup and the
//! resvg/tiny-skia rasterization pipeline.

use sketch_core::{CanvasResult, Rasterizer, SceneSnapshot};

use crate::error::{RenderError, RenderResult};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// SVG vector graphics (the markup as UTF-8 bytes).
    Svg,
}

/// Exports snapshots to PNG and SVG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotExporter;

impl SnapshotExporter {
    /// Create an exporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Export a snapshot to the specified format.
    ///
    /// `scale` applies to raster formats only.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be rendered or encoded.
    pub fn export(
        &self,
        snapshot: &SceneSnapshot,
        format: ExportFormat,
        scale: f32,
    ) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => self.render_to_png(snapshot, scale),
            ExportFormat::Svg => Ok(snapshot.to_svg().into_bytes()),
        }
    }

    /// Export the snapshot to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, snapshot: &SceneSnapshot, scale: f32) -> RenderResult<Vec<u8>> {
        let pixmap = self.render_to_pixmap(snapshot, scale)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Rasterize the snapshot at `scale` output pixels per CSS pixel.
    ///
    /// The pixmap is `round(width * scale)` by `round(height * scale)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed or the pixmap cannot
    /// be allocated.
    #[allow(clippy::cast_precision_loss, clippy::unused_self)]
    pub fn render_to_pixmap(
        &self,
        snapshot: &SceneSnapshot,
        scale: f32,
    ) -> RenderResult<tiny_skia::Pixmap> {
        let svg = snapshot.to_svg();
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let (px_w, px_h) = snapshot.output_size(scale);
        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h).ok_or_else(|| {
            RenderError::Rasterize(format!("cannot allocate {px_w}x{px_h} pixmap"))
        })?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            px_w as f32 / size.width(),
            px_h as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        tracing::debug!(
            "Rasterized {} strokes to {px_w}x{px_h}",
            snapshot.paths.len()
        );
        Ok(pixmap)
    }
}

impl Rasterizer for SnapshotExporter {
    fn rasterize(&self, snapshot: &SceneSnapshot, scale: f32) -> CanvasResult<Vec<u8>> {
        Ok(self.render_to_png(snapshot, scale)?)
    }
}
