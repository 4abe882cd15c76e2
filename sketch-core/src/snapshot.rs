//! Export snapshots.
//!
//! A [`SceneSnapshot`] is an owned copy of everything visible at the moment
//! an export starts. Drawing may continue while the snapshot is rasterized.

use std::fmt::Write;

use base64::Engine;

use crate::style::{ConcreteStyle, LineCap, LineJoin};
use crate::stroke::PathData;
use crate::CanvasResult;

/// One visible stroke in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPath {
    /// Geometry.
    pub data: PathData,
    /// Style the stroke was drawn with.
    pub style: ConcreteStyle,
}

/// Owned copy of the visible drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Surface width in CSS pixels.
    pub width: f32,
    /// Surface height in CSS pixels.
    pub height: f32,
    /// Background color.
    pub background: String,
    /// Stroke end shape applied to every path on export.
    pub linecap: LineCap,
    /// Stroke corner shape applied to every path on export.
    pub linejoin: LineJoin,
    /// Visible strokes in paint order.
    pub paths: Vec<SnapshotPath>,
}

impl SceneSnapshot {
    /// Standalone SVG markup of the snapshot at its natural size.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut svg = String::with_capacity(256 + self.paths.len() * 128);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" shape-rendering=\"geometricPrecision\">",
        );
        if !self.background.is_empty() {
            let _ = write!(
                svg,
                "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
                escape_xml(&self.background),
            );
        }
        for path in &self.paths {
            let _ = write!(
                svg,
                "<path class=\"line\" d=\"{}\" style=\"{}\" stroke-linejoin=\"{}\" stroke-linecap=\"{}\"/>",
                escape_xml(path.data.as_str()),
                escape_xml(&path.style.css()),
                self.linejoin,
                self.linecap,
            );
        }
        svg.push_str("</svg>");
        svg
    }

    /// The SVG markup as a base64 `data:` URL.
    #[must_use]
    pub fn svg_data_url(&self) -> String {
        format!("data:image/svg+xml;base64,{}", to_base64(&self.to_svg()))
    }

    /// Raster size at `scale`, at least 1x1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_size(&self, scale: f32) -> (u32, u32) {
        let w = (self.width * scale).round().max(1.0) as u32;
        let h = (self.height * scale).round().max(1.0) as u32;
        (w, h)
    }
}

/// Turns a snapshot into PNG bytes.
pub trait Rasterizer: Send + Sync {
    /// Rasterize `snapshot` at `scale` (output pixels per CSS pixel).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Export`](crate::CanvasError::Export) if the
    /// markup cannot be decoded or the image cannot be encoded.
    fn rasterize(&self, snapshot: &SceneSnapshot, scale: f32) -> CanvasResult<Vec<u8>>;
}

/// Export scale: the configured one, else the device pixel ratio, never below 1.
#[must_use]
pub fn effective_scale(export_scale: Option<f32>, device_pixel_ratio: f32) -> f32 {
    let scale = export_scale
        .filter(|s| s.is_finite())
        .unwrap_or(device_pixel_ratio);
    if scale.is_finite() {
        scale.max(1.0)
    } else {
        1.0
    }
}

/// Base64 of the UTF-8 bytes of `text`.
#[must_use]
pub fn to_base64(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}

/// PNG bytes as a base64 `data:` URL.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StyleResolver, WhiteboardOptions};

    fn snapshot(paths: usize) -> SceneSnapshot {
        let style = StyleResolver::default().resolve(&WhiteboardOptions::default(), None);
        SceneSnapshot {
            width: 200.0,
            height: 100.0,
            background: "#ffffff".to_string(),
            linecap: LineCap::Butt,
            linejoin: LineJoin::Bevel,
            paths: (0..paths)
                .map(|i| SnapshotPath {
                    data: PathData::new(format!("M{i},0L{i},10")),
                    style: style.clone(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_svg_markup() {
        let svg = snapshot(2).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.contains("shape-rendering=\"geometricPrecision\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("stroke-linecap=\"butt\""));
        assert!(svg.contains("stroke-linejoin=\"bevel\""));
        assert!(svg.contains("d=\"M1,0L1,10\""));
    }

    #[test]
    fn test_svg_escapes_style() {
        let mut snap = snapshot(1);
        snap.paths[0].style.extra.insert(
            "font-family".to_string(),
            "\"Comic Sans\"".to_string(),
        );
        let svg = snap.to_svg();
        assert!(svg.contains("&quot;Comic Sans&quot;"));
    }

    #[test]
    fn test_to_base64() {
        assert_eq!(to_base64("Hello World"), "SGVsbG8gV29ybGQ=");
        assert!(!to_base64("Whiteboard 🖌️").is_empty());
    }

    #[test]
    fn test_data_urls() {
        assert!(snapshot(0)
            .svg_data_url()
            .starts_with("data:image/svg+xml;base64,PHN2Zy"));
        assert_eq!(png_data_url(&[137, 80, 78, 71]), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_effective_scale() {
        assert!((effective_scale(None, 2.0) - 2.0).abs() < f32::EPSILON);
        assert!((effective_scale(Some(3.0), 2.0) - 3.0).abs() < f32::EPSILON);
        assert!((effective_scale(Some(0.5), 2.0) - 1.0).abs() < f32::EPSILON);
        assert!((effective_scale(None, 0.0) - 1.0).abs() < f32::EPSILON);
        assert!((effective_scale(Some(f32::NAN), f32::NAN) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_output_size_rounds() {
        let snap = snapshot(0);
        assert_eq!(snap.output_size(1.5), (300, 150));
        assert_eq!(snap.output_size(0.001), (1, 1));
    }
}
