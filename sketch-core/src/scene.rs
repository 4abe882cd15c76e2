//! Rendering surfaces.
//!
//! [`Surface`] is the seam to whatever actually displays strokes (an SVG
//! element in a browser, a retained scene in tests or headless export).
//! [`Scene`] is the in-memory implementation.

use std::collections::HashMap;

use crate::stroke::PathData;
use crate::style::ConcreteStyle;
use crate::{CanvasError, CanvasResult};

/// Handle to a path node owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a surface-specific raw handle.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The surface-specific raw handle.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// A path node as read back from a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    /// Node handle.
    pub id: NodeId,
    /// Current geometry.
    pub data: PathData,
    /// Style the node was created with.
    pub style: ConcreteStyle,
}

/// A live rendering surface holding path nodes.
///
/// A node is either attached (visible, in paint order) or detached (kept
/// alive for a later [`reattach`](Self::reattach)) until it is released.
pub trait Surface {
    /// Create a path node and attach it on top of the paint order.
    fn append_path(&mut self, style: &ConcreteStyle, data: &PathData) -> NodeId;

    /// Replace a node's geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NodeNotFound`] for an unknown or released node.
    fn set_path_data(&mut self, node: NodeId, data: &PathData) -> CanvasResult<()>;

    /// Read a node back, attached or not.
    fn node(&self, node: NodeId) -> Option<PathNode>;

    /// Attach a detached node on top of the paint order.
    ///
    /// Attaching an already attached node leaves it in place.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NodeNotFound`] for an unknown or released node.
    fn reattach(&mut self, node: NodeId) -> CanvasResult<()>;

    /// Remove a node from view, keeping it for reattachment.
    ///
    /// Detaching a detached or unknown node is a no-op.
    fn detach(&mut self, node: NodeId);

    /// Drop a node entirely. Releasing an unknown node is a no-op.
    fn release(&mut self, node: NodeId);

    /// Whether a node is currently visible.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Set the surface background color.
    fn set_background(&mut self, color: &str);

    /// Rendered size in CSS pixels (width, height).
    fn client_size(&self) -> (f32, f32);

    /// Physical pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }
}

/// In-memory surface.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Every live node, attached or detached.
    nodes: HashMap<NodeId, PathNode>,
    /// Attached node IDs in paint order.
    attached: Vec<NodeId>,
    next_id: u64,
    /// Background color.
    pub background: String,
    /// Viewport width in pixels.
    pub viewport_width: f32,
    /// Viewport height in pixels.
    pub viewport_height: f32,
    /// Physical pixels per CSS pixel.
    pub pixel_ratio: f32,
}

impl Scene {
    /// Create an empty scene with the given viewport size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            nodes: HashMap::new(),
            attached: Vec::new(),
            next_id: 0,
            background: String::new(),
            viewport_width: width,
            viewport_height: height,
            pixel_ratio: 1.0,
        }
    }

    /// Set the device pixel ratio.
    #[must_use]
    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Attached nodes in paint order.
    pub fn attached_nodes(&self) -> impl Iterator<Item = &PathNode> {
        self.attached.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Number of attached nodes.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Number of live nodes, attached or detached.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Set the viewport dimensions.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Surface for Scene {
    fn append_path(&mut self, style: &ConcreteStyle, data: &PathData) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            PathNode {
                id,
                data: data.clone(),
                style: style.clone(),
            },
        );
        self.attached.push(id);
        id
    }

    fn set_path_data(&mut self, node: NodeId, data: &PathData) -> CanvasResult<()> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| CanvasError::NodeNotFound(node.to_string()))?;
        entry.data = data.clone();
        Ok(())
    }

    fn node(&self, node: NodeId) -> Option<PathNode> {
        self.nodes.get(&node).cloned()
    }

    fn reattach(&mut self, node: NodeId) -> CanvasResult<()> {
        if !self.nodes.contains_key(&node) {
            return Err(CanvasError::NodeNotFound(node.to_string()));
        }
        if !self.attached.contains(&node) {
            self.attached.push(node);
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        self.attached.retain(|&id| id != node);
    }

    fn release(&mut self, node: NodeId) {
        self.detach(node);
        self.nodes.remove(&node);
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.attached.contains(&node)
    }

    fn set_background(&mut self, color: &str) {
        self.background = color.to_string();
    }

    fn client_size(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}
