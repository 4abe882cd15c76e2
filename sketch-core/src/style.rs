//! Brush styles and their resolution into concrete values.
//!
//! Brush color and size may be bound to a live source that changes while the
//! user draws. [`StyleResolver::resolve`] reads such sources once, at the moment
//! a stroke starts or is replayed, and produces a [`ConcreteStyle`] that never
//! changes afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::WhiteboardOptions;

/// Shape of the end of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Flat end exactly at the last point.
    Butt,
    /// Flat end extended by half the stroke width.
    Square,
    /// Rounded end.
    Round,
}

impl LineCap {
    /// SVG attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Square => "square",
            Self::Round => "round",
        }
    }
}

impl fmt::Display for LineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineCap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(Self::Butt),
            "square" => Ok(Self::Square),
            "round" => Ok(Self::Round),
            other => Err(format!("unknown line cap: {other}")),
        }
    }
}

/// Shape of the corners where two stroke segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineJoin {
    /// Sharp corner.
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
    /// Sharp corner clipped at the miter limit.
    MiterClip,
    /// Arc-extended corner.
    Arcs,
}

impl LineJoin {
    /// SVG attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
            Self::MiterClip => "miter-clip",
            Self::Arcs => "arcs",
        }
    }
}

impl fmt::Display for LineJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineJoin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(Self::Miter),
            "round" => Ok(Self::Round),
            "bevel" => Ok(Self::Bevel),
            "miter-clip" => Ok(Self::MiterClip),
            "arcs" => Ok(Self::Arcs),
            other => Err(format!("unknown line join: {other}")),
        }
    }
}

/// A brush attribute that is either fixed or read from a live source.
#[derive(Clone)]
pub enum BrushValue<T> {
    /// A fixed value.
    Static(T),
    /// An accessor returning the current value of a live setting.
    Live(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> BrushValue<T> {
    /// Wrap an accessor for a live setting.
    #[must_use]
    pub fn live(accessor: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::Live(Arc::new(accessor))
    }

    /// Read the current value.
    #[must_use]
    pub fn current(&self) -> T {
        match self {
            Self::Static(value) => value.clone(),
            Self::Live(accessor) => accessor(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BrushValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Live(_) => f.write_str("Live(..)"),
        }
    }
}

impl From<&str> for BrushValue<String> {
    fn from(value: &str) -> Self {
        Self::Static(value.to_string())
    }
}

impl From<String> for BrushValue<String> {
    fn from(value: String) -> Self {
        Self::Static(value)
    }
}

/// Documented fallback values for every style attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDefaults {
    /// Surface background color.
    pub background_color: &'static str,
    /// Stroke color.
    pub color: &'static str,
    /// Stroke width.
    pub size: &'static str,
    /// Stroke end shape.
    pub linecap: LineCap,
    /// Stroke corner shape.
    pub linejoin: LineJoin,
}

impl StyleDefaults {
    /// White background, charcoal 5px round strokes.
    pub const STANDARD: Self = Self {
        background_color: "#ffffff",
        color: "#333333",
        size: "5px",
        linecap: LineCap::Round,
        linejoin: LineJoin::Round,
    };
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Extra CSS declarations, kept in insertion order.
///
/// Setting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStyles(Vec<(String, String)>);

impl LineStyles {
    /// An empty set of declarations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a declaration, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Value of a declaration.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Declarations in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LineStyles {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut styles = Self::new();
        for (key, value) in iter {
            styles.insert(key, value);
        }
        styles
    }
}

impl Serialize for LineStyles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LineStyles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LineStylesVisitor)
    }
}

struct LineStylesVisitor;

impl<'de> Visitor<'de> for LineStylesVisitor {
    type Value = LineStyles;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of CSS declarations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LineStyles, A::Error> {
        let mut styles = LineStyles::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            styles.insert(key, value);
        }
        Ok(styles)
    }
}

/// The color and width a stroke was drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushSnapshot {
    /// Stroke color.
    pub color: String,
    /// Stroke width (CSS length, e.g. `5px`).
    pub size: String,
}

/// A fully resolved stroke style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteStyle {
    /// Stroke color.
    pub color: String,
    /// Stroke width.
    pub width: String,
    /// Stroke end shape.
    pub linecap: LineCap,
    /// Stroke corner shape.
    pub linejoin: LineJoin,
    /// Caller-supplied declarations, applied after the computed ones.
    pub extra: LineStyles,
}

impl ConcreteStyle {
    /// The color/width pair recorded in history.
    #[must_use]
    pub fn brush(&self) -> BrushSnapshot {
        BrushSnapshot {
            color: self.color.clone(),
            size: self.width.clone(),
        }
    }

    /// CSS declarations in application order.
    ///
    /// An `extra` key that matches a computed key replaces it in place; other
    /// extra keys are appended.
    #[must_use]
    pub fn declarations(&self) -> Vec<(String, String)> {
        let mut declarations: Vec<(String, String)> = [
            ("fill", "none"),
            ("stroke", self.color.as_str()),
            ("stroke-width", self.width.as_str()),
            ("stroke-linejoin", self.linejoin.as_str()),
            ("stroke-linecap", self.linecap.as_str()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        for (key, value) in self.extra.entries() {
            match declarations.iter_mut().find(|(existing, _)| existing == key) {
                Some(slot) => value.clone_into(&mut slot.1),
                None => declarations.push((key.to_string(), value.to_string())),
            }
        }
        declarations
    }

    /// Inline `style` attribute text, e.g. `fill: none; stroke: #333333; ...`.
    #[must_use]
    pub fn css(&self) -> String {
        self.declarations()
            .iter()
            .map(|(key, value)| format!("{key}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolves brush options into concrete styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleResolver {
    defaults: StyleDefaults,
}

impl StyleResolver {
    /// Create a resolver over the given defaults.
    #[must_use]
    pub const fn new(defaults: StyleDefaults) -> Self {
        Self { defaults }
    }

    /// The defaults this resolver falls back to.
    #[must_use]
    pub const fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    /// Resolve the style for a stroke.
    ///
    /// With `override_style`, color and width come from it (a replayed record)
    /// instead of the options; cap, join and extra declarations always come
    /// from the options.
    #[must_use]
    pub fn resolve(
        &self,
        options: &WhiteboardOptions,
        override_style: Option<&BrushSnapshot>,
    ) -> ConcreteStyle {
        let (color, width) = match override_style {
            Some(brush) => (
                non_blank(Some(brush.color.clone())),
                non_blank(Some(brush.size.clone())),
            ),
            None => (
                non_blank(options.color.as_ref().map(BrushValue::current)),
                non_blank(options.size.as_ref().map(BrushValue::current)),
            ),
        };

        ConcreteStyle {
            color: color.unwrap_or_else(|| self.defaults.color.to_string()),
            width: width.unwrap_or_else(|| self.defaults.size.to_string()),
            linecap: options.linecap.unwrap_or(self.defaults.linecap),
            linejoin: options.linejoin.unwrap_or(self.defaults.linejoin),
            extra: options.line_styles.clone(),
        }
    }

    /// Resolve the surface background color.
    #[must_use]
    pub fn background(&self, options: &WhiteboardOptions) -> String {
        non_blank(options.background_color.clone())
            .unwrap_or_else(|| self.defaults.background_color.to_string())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
