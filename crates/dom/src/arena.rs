//! Arena-backed tree storage.
//!
//! All nodes live in a single `Vec<DomNode>` and refer to each other by
//! 4-byte indices. No Rc/Arc, no recursive ownership, sequential allocation.
//!
//! Mutation model: structural edits go through the arena (`append_child`,
//! `insert_children`, `replace_child`, `detach`) so parent back-references
//! and child lists never disagree. Detached nodes stay allocated (ids are
//! never reused); they just drop out of the tree.

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeKind};

/// Arena allocator for tree nodes.
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly).
    nodes: Vec<DomNode>,

    /// Root node id (if set).
    root_id: Option<NodeId>,
}

impl DomArena {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Allocate a new detached node and return its id.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(DomNode::new(id, kind));
        id
    }

    pub fn alloc_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text { data: data.into() })
    }

    pub fn alloc_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element {
            name: name.into(),
            attributes: Default::default(),
        })
    }

    pub fn get(&self, id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(id as usize)
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(id as usize)
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root_id = Some(id);
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    pub fn root(&self) -> Result<&DomNode> {
        let id = self.root_id.ok_or(DomError::MissingRoot)?;
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `child` at the end of `parent`'s child list.
    ///
    /// # Panics
    /// Panics if either id was not allocated by this arena.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child as usize].parent_id = Some(parent);
        self.nodes[parent as usize].children_ids.push(child);
    }

    /// Insert `children` into `parent`'s child list at `index`, preserving
    /// their given order.
    ///
    /// # Panics
    /// Panics if any id was not allocated by this arena, or `index` is out
    /// of bounds.
    pub fn insert_children(&mut self, parent: NodeId, index: usize, children: &[NodeId]) {
        for &child in children {
            self.nodes[child as usize].parent_id = Some(parent);
        }
        self.nodes[parent as usize]
            .children_ids
            .insert_from_slice(index, children);
    }

    /// Position of `child` within `parent`'s child list.
    pub fn position_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes
            .get(parent as usize)?
            .children_ids
            .iter()
            .position(|&c| c == child)
    }

    /// Replace `old` with `new` at the same position under `parent`.
    /// `old` becomes detached.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        let index = self
            .position_of(parent, old)
            .ok_or(DomError::NotAChild { parent, child: old })?;
        self.get_mut(new)?.parent_id = Some(parent);
        self.get_mut(old)?.parent_id = None;
        self.get_mut(parent)?.children_ids[index] = new;
        Ok(())
    }

    /// Remove `id` from its parent's child list. Idempotent: returns `false`
    /// if the node was already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Ok(node) = self.get(id) else {
            return false;
        };
        let Some(parent) = node.parent_id else {
            return false;
        };
        if let Some(index) = self.position_of(parent, id) {
            self.nodes[parent as usize].children_ids.remove(index);
        }
        self.nodes[id as usize].parent_id = None;
        true
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
