//! Scene synchronization: which surface node belongs to which stroke.

use std::collections::HashMap;

use crate::record::{StrokeId, StrokeRecord};
use crate::scene::{NodeId, PathNode, Surface};
use crate::stroke::PathData;
use crate::style::ConcreteStyle;

/// Owns a surface and the mapping from strokes to the nodes drawing them.
///
/// History records never hold surface handles; every node lookup goes
/// through here.
#[derive(Debug)]
pub struct SceneSync<S> {
    surface: S,
    nodes: HashMap<StrokeId, NodeId>,
}

impl<S: Surface> SceneSync<S> {
    /// Take ownership of a surface.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            nodes: HashMap::new(),
        }
    }

    /// The underlying surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the underlying surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give the surface back, releasing nothing.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Take over the live node drawn for a just-finished stroke.
    ///
    /// The node ends up attached on top of the paint order, since the stroke
    /// becomes the last visible record.
    pub fn adopt(&mut self, id: StrokeId, node: NodeId) {
        if let Some(previous) = self.nodes.insert(id, node) {
            if previous != node {
                self.surface.release(previous);
            }
        }
        self.surface.detach(node);
        self.reattach_node(node);
    }

    /// Make a record's node visible again.
    pub fn attach(&mut self, record: &StrokeRecord) {
        match self.nodes.get(&record.id) {
            Some(&node) => self.reattach_node(node),
            None => tracing::warn!("No node mapped for stroke {}", record.id),
        }
    }

    /// Hide a record's node, keeping it for redo. Idempotent.
    pub fn detach(&mut self, record: &StrokeRecord) {
        if let Some(&node) = self.nodes.get(&record.id) {
            self.surface.detach(node);
        }
    }

    /// Hide every mapped node.
    pub fn detach_all(&mut self) {
        for &node in self.nodes.values() {
            self.surface.detach(node);
        }
    }

    /// Create an attached node for a record from its stored geometry.
    ///
    /// Any node previously mapped to the record is released.
    pub fn materialize(&mut self, record: &StrokeRecord, style: &ConcreteStyle) -> NodeId {
        let node = self.surface.append_path(style, &record.geometry);
        if let Some(previous) = self.nodes.insert(record.id.clone(), node) {
            self.surface.release(previous);
        }
        node
    }

    /// Drop a record's node for good. Idempotent.
    pub fn release(&mut self, id: &StrokeId) {
        if let Some(node) = self.nodes.remove(id) {
            self.surface.release(node);
        }
    }

    /// Drop every mapped node.
    pub fn release_all(&mut self) {
        for (_, node) in self.nodes.drain() {
            self.surface.release(node);
        }
    }

    /// Node currently drawing a stroke.
    #[must_use]
    pub fn node_of(&self, id: &StrokeId) -> Option<NodeId> {
        self.nodes.get(id).copied()
    }

    /// Read a stroke's node back from the surface.
    #[must_use]
    pub fn path_node(&self, id: &StrokeId) -> Option<PathNode> {
        self.node_of(id).and_then(|node| self.surface.node(node))
    }

    /// Live geometry of a stroke's node.
    #[must_use]
    pub fn path_data(&self, id: &StrokeId) -> Option<PathData> {
        self.path_node(id).map(|node| node.data)
    }

    /// Whether a stroke is currently visible.
    #[must_use]
    pub fn is_attached(&self, id: &StrokeId) -> bool {
        self.node_of(id)
            .is_some_and(|node| self.surface.is_attached(node))
    }

    /// Strokes whose nodes are visible, in no particular order.
    pub fn attached_ids(&self) -> impl Iterator<Item = &StrokeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| self.surface.is_attached(**node))
            .map(|(id, _)| id)
    }

    /// Number of strokes with a live node.
    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.nodes.len()
    }

    fn reattach_node(&mut self, node: NodeId) {
        if let Err(e) = self.surface.reattach(node) {
            tracing::warn!("Failed to reattach {node}: {e}");
        }
    }
}
