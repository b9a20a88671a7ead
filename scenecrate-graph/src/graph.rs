//! # Scene Graph
//!
//! A labelled tree of nodes stored in an arena. Each node owns an ordered list
//! of children, the primitives drawn at that node and exactly one
//! [`Transform`]. Parents are referenced by key, never by pointer, so the tree
//! can be walked in both directions without reference-counted cycles.
//!
//! A node's composed matrix is `node.transform * parent.composed`, with the
//! root's parent contributing the identity.

use scenecrate_core::{Matrix4d, Primitive, Transform};
use slotmap::SlotMap;
use tracing::debug;

use crate::error::GraphError;

slotmap::new_key_type! {
    /// Identifies a node within its [`SceneGraph`]
    pub struct NodeId;
}

/// A single node of the scene graph
#[derive(Debug)]
pub struct Node {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    primitives: Vec<Box<dyn Primitive>>,
    transform: Transform,
}

impl Node {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            parent: None,
            children: Vec::new(),
            primitives: Vec::new(),
            transform: Transform::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn primitives(&self) -> &[Box<dyn Primitive>] {
        &self.primitives
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }
}

/// Visits nodes during [`SceneGraph::accept`]
pub trait NodeVisitor {
    fn visit(&mut self, id: NodeId, node: &Node);
}

impl<F: FnMut(NodeId, &Node)> NodeVisitor for F {
    fn visit(&mut self, id: NodeId, node: &Node) {
        self(id, node)
    }
}

/// Case-insensitive label comparison
fn labels_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// The arena holding every node, rooted at a single node
#[derive(Debug)]
pub struct SceneGraph {
    root: NodeId,
    nodes: SlotMap<NodeId, Node>,
}

impl SceneGraph {
    /// Create a graph consisting only of a root node
    pub fn new(root_label: &str) -> Result<Self, GraphError> {
        if root_label.is_empty() {
            return Err(GraphError::EmptyLabel);
        }
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(root_label));
        Ok(Self { root, nodes })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn get(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id).ok_or(GraphError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))
    }

    /// Number of nodes in the arena, including detached ones
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(Node::label)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// The children of `id` in insertion order, empty for unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// The primitives of `id` in insertion order, empty for unknown ids
    pub fn primitives(&self, id: NodeId) -> &[Box<dyn Primitive>] {
        self.nodes.get(id).map_or(&[], |node| node.primitives.as_slice())
    }

    /// Create a node that is not yet attached anywhere
    pub fn create_node(&mut self, label: &str) -> Result<NodeId, GraphError> {
        if label.is_empty() {
            return Err(GraphError::EmptyLabel);
        }
        Ok(self.nodes.insert(Node::new(label)))
    }

    /// Create a node and append it to `parent`
    pub fn create_child(&mut self, parent: NodeId, label: &str) -> Result<NodeId, GraphError> {
        self.get(parent)?;
        let child = self.create_node(label)?;
        if let Err(err) = self.add_child(parent, child) {
            self.nodes.remove(child);
            return Err(err);
        }
        Ok(child)
    }

    /// Check whether `ancestor` lies on the parent chain of `node` (or is `node`)
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        // a leaf is only its own ancestor
        if ancestor != node && self.children(ancestor).is_empty() {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Append `child` (and its subtree) to the children of `parent`.
    ///
    /// A child that already has a parent is moved. Fails without touching the
    /// graph if either node is unknown, if `child` is the root, if `child` is
    /// `parent` or one of its ancestors, or if `parent` already has a different
    /// child with the same label.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
        let parent_node = self.get(parent)?;
        let child_label = &self.get(child)?.label;

        if self.is_ancestor(child, parent) {
            return Err(GraphError::Cycle { parent, child });
        }
        if child == self.root {
            return Err(GraphError::RootHasNoParent);
        }
        let duplicate = parent_node
            .children
            .iter()
            .any(|&sibling| sibling != child && labels_match(&self.nodes[sibling].label, child_label));
        if duplicate {
            return Err(GraphError::DuplicateLabel {
                label: child_label.clone(),
            });
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.nodes[old_parent].children.retain(|&id| id != child);
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// The first node below `start` whose label matches. Each node's children
    /// are all compared before any of them is descended into.
    fn find_descendant(&self, start: NodeId, label: &str) -> Option<NodeId> {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            if let Some(found) = children
                .iter()
                .copied()
                .find(|&child| labels_match(&self.nodes[child].label, label))
            {
                return Some(found);
            }
            stack.extend(children.iter().rev().copied());
        }
        None
    }

    /// Find a node by label (case-insensitive), starting with the root itself
    pub fn find_node(&self, label: &str) -> Option<NodeId> {
        if labels_match(&self.nodes[self.root].label, label) {
            return Some(self.root);
        }
        self.find_descendant(self.root, label)
    }

    /// Remove the first descendant of the root with a matching label, together
    /// with its subtree. Returns whether anything was removed.
    pub fn remove_node(&mut self, label: &str) -> bool {
        let Some(target) = self.find_descendant(self.root, label) else {
            return false;
        };

        // collect the subtree first, then delete
        let mut doomed = Vec::new();
        let mut stack = vec![target];
        while let Some(id) = stack.pop() {
            doomed.push(id);
            stack.extend(self.children(id).iter().copied());
        }

        if let Some(parent) = self.nodes[target].parent {
            self.nodes[parent].children.retain(|&id| id != target);
        }
        for id in &doomed {
            self.nodes.remove(*id);
        }

        debug!(label, removed = doomed.len(), "removed subtree");
        true
    }

    /// Append a primitive to the node with the given label. Returns whether a node was found.
    pub fn add_shape(&mut self, label: &str, shape: impl Primitive + 'static) -> bool {
        match self.find_node(label) {
            Some(id) => {
                self.nodes[id].primitives.push(Box::new(shape));
                true
            }
            None => false,
        }
    }

    /// Append a primitive to a node
    pub fn add_primitive(&mut self, id: NodeId, shape: impl Primitive + 'static) -> Result<(), GraphError> {
        self.get_mut(id)?.primitives.push(Box::new(shape));
        Ok(())
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), GraphError> {
        self.get_mut(id)?.transform = transform;
        Ok(())
    }

    /// `node.transform * parent.composed`, walking up to the root
    pub fn composed_matrix(&self, id: NodeId) -> Option<Matrix4d> {
        let node = self.nodes.get(id)?;
        let mut matrix = node.transform.matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let parent = &self.nodes[parent];
            matrix *= parent.transform.matrix();
            current = parent.parent;
        }
        Some(matrix)
    }

    /// Pre-order walk from the root: a node is visited before its children,
    /// children in insertion order
    pub fn accept(&self, visitor: &mut dyn NodeVisitor) {
        self.accept_from(self.root, visitor);
    }

    /// Pre-order walk of the subtree under `start`
    pub fn accept_from(&self, start: NodeId, visitor: &mut dyn NodeVisitor) {
        if !self.nodes.contains_key(start) {
            return;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            visitor.visit(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }
}
