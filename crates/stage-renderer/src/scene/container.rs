//! 2D draw container holding the layer's display nodes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

/// Handle to a display node in a [`DrawContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// A 2D display node owned by an instance renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawNode {
    pub id: NodeId,
    /// Top-left position in scene coordinates.
    pub position: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    pub size: Vec2,
    /// Paint order key; unset sorts as zero.
    pub z_order: Option<i32>,
    pub visible: bool,
    /// Whether the node receives pointer events.
    pub interactive: bool,
}

impl DrawNode {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            angle: 0.0,
            size: Vec2::ZERO,
            z_order: None,
            visible: true,
            interactive: true,
        }
    }

    fn z_order_or_default(&self) -> i32 {
        self.z_order.unwrap_or(0)
    }
}

/// Display container of a layer.
///
/// Children keep insertion order until [`DrawContainer::sort_by_z_order`]
/// is called; the paint order is the children order.
pub struct DrawContainer {
    nodes: HashMap<NodeId, DrawNode>,
    children: Vec<NodeId>,
    visible: bool,
    next_node: AtomicU64,
}

impl DrawContainer {
    /// Creates a new empty, visible container.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            children: Vec::new(),
            visible: true,
            next_node: AtomicU64::new(1),
        }
    }

    /// Appends a new node as the last child and returns its handle.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node.fetch_add(1, Ordering::Relaxed));
        self.nodes.insert(id, DrawNode::new(id));
        self.children.push(id);
        id
    }

    /// Removes a node. Returns the removed node if it was a child.
    pub fn remove_node(&mut self, id: NodeId) -> Option<DrawNode> {
        let node = self.nodes.remove(&id)?;
        self.children.retain(|child| *child != id);
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&DrawNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DrawNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Child handles in paint order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Nodes in paint order.
    pub fn nodes(&self) -> impl Iterator<Item = &DrawNode> {
        self.children.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Stable sort of the children by ascending z-order.
    pub fn sort_by_z_order(&mut self) {
        let nodes = &self.nodes;
        self.children.sort_by_key(|id| {
            nodes
                .get(id)
                .map_or(0, DrawNode::z_order_or_default)
        });
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
    }
}

impl Default for DrawContainer {
    fn default() -> Self {
        Self::new()
    }
}
