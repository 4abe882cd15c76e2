//! Whiteboard configuration.

use serde::{Deserialize, Serialize};

use crate::codec::SerializableRecord;
use crate::error::CanvasResult;
use crate::style::{BrushValue, LineCap, LineJoin, LineStyles};

/// Options for a [`Whiteboard`](crate::Whiteboard) session.
///
/// Every field is optional; unset values fall back to
/// [`StyleDefaults::STANDARD`](crate::StyleDefaults::STANDARD).
#[derive(Debug, Clone, Default)]
pub struct WhiteboardOptions {
    /// Brush color, fixed or live.
    pub color: Option<BrushValue<String>>,
    /// Surface background color.
    pub background_color: Option<String>,
    /// Stroke end shape.
    pub linecap: Option<LineCap>,
    /// Stroke corner shape.
    pub linejoin: Option<LineJoin>,
    /// Extra CSS declarations applied to every stroke.
    pub line_styles: LineStyles,
    /// Brush width, fixed or live.
    pub size: Option<BrushValue<String>>,
    /// Raster export scale. Defaults to the surface's device pixel ratio.
    pub export_scale: Option<f32>,
    /// Records restored when the surface attaches.
    pub initial_state: Vec<SerializableRecord>,
}

impl WhiteboardOptions {
    /// Options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed brush color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(BrushValue::Static(color.into()));
        self
    }

    /// Bind the brush color to a live accessor.
    #[must_use]
    pub fn with_live_color(mut self, accessor: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.color = Some(BrushValue::live(accessor));
        self
    }

    /// Set a fixed brush width.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(BrushValue::Static(size.into()));
        self
    }

    /// Bind the brush width to a live accessor.
    #[must_use]
    pub fn with_live_size(mut self, accessor: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.size = Some(BrushValue::live(accessor));
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Set the stroke end shape.
    #[must_use]
    pub fn with_linecap(mut self, linecap: LineCap) -> Self {
        self.linecap = Some(linecap);
        self
    }

    /// Set the stroke corner shape.
    #[must_use]
    pub fn with_linejoin(mut self, linejoin: LineJoin) -> Self {
        self.linejoin = Some(linejoin);
        self
    }

    /// Add an extra CSS declaration for strokes.
    #[must_use]
    pub fn with_line_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.line_styles.insert(key.into(), value.into());
        self
    }

    /// Set the raster export scale.
    #[must_use]
    pub fn with_export_scale(mut self, scale: f32) -> Self {
        self.export_scale = Some(scale);
        self
    }

    /// Set the records restored on attach.
    #[must_use]
    pub fn with_initial_state(mut self, records: Vec<SerializableRecord>) -> Self {
        self.initial_state = records;
        self
    }
}

/// JSON form of the static subset of [`WhiteboardOptions`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsDocument {
    /// Brush color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Background color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Stroke end shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linecap: Option<LineCap>,
    /// Stroke corner shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linejoin: Option<LineJoin>,
    /// Extra CSS declarations.
    #[serde(default, skip_serializing_if = "LineStyles::is_empty")]
    pub line_styles: LineStyles,
    /// Brush width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Raster export scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_scale: Option<f32>,
    /// Records restored on attach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_state: Vec<SerializableRecord>,
}

impl OptionsDocument {
    /// Parse an options document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into runtime options.
    #[must_use]
    pub fn into_options(self) -> WhiteboardOptions {
        WhiteboardOptions {
            color: self.color.map(BrushValue::Static),
            background_color: self.background_color,
            linecap: self.linecap,
            linejoin: self.linejoin,
            line_styles: self.line_styles,
            size: self.size.map(BrushValue::Static),
            export_scale: self.export_scale,
            initial_state: self.initial_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_document_from_json() {
        let json = r##"{
            "color": "#ff0000",
            "backgroundColor": "#000000",
            "linecap": "square",
            "linejoin": "miter-clip",
            "lineStyles": {"mix-blend-mode": "multiply"},
            "size": "3px",
            "exportScale": 2.0
        }"##;
        let options = OptionsDocument::from_json(json).expect("parse").into_options();

        assert_eq!(options.color.map(|c| c.current()).as_deref(), Some("#ff0000"));
        assert_eq!(options.background_color.as_deref(), Some("#000000"));
        assert_eq!(options.linecap, Some(LineCap::Square));
        assert_eq!(options.linejoin, Some(LineJoin::MiterClip));
        assert_eq!(
            options.line_styles.get("mix-blend-mode"),
            Some("multiply")
        );
        assert_eq!(options.export_scale, Some(2.0));
        assert!(options.initial_state.is_empty());
    }

    #[test]
    fn test_options_document_rejects_unknown_linecap() {
        assert!(OptionsDocument::from_json(r#"{"linecap": "pointy"}"#).is_err());
    }

    #[test]
    fn test_empty_document_is_default() {
        let options = OptionsDocument::from_json("{}").expect("parse").into_options();
        assert!(options.color.is_none());
        assert!(options.size.is_none());
        assert!(options.line_styles.is_empty());
    }
}
