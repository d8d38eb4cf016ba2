//! Node model for the mutable HTML tree.
//!
//! Key design points:
//! 1. Nodes are addressed by u32 ids into the arena, so the cyclic
//!    parent/child relations of a DOM stay plain non-owning indices
//! 2. Sibling order lives only in the parent's child list, so there is one
//!    source of truth to keep consistent across mutation
//! 3. Payloads are a closed tagged variant, so traversal and mutation sites
//!    match exhaustively instead of shape-checking

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Node identifier (index into the arena).
pub type NodeId = u32;

/// Insertion-ordered attribute map: name -> value, with `None` marking a
/// valueless attribute (`<input disabled>`). Order is preserved so
/// serialization reproduces the source attribute order.
pub type AttrMap = IndexMap<String, Option<String>, ahash::RandomState>;

/// Payload of a tree node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Synthetic root; every parsed tree has exactly one.
    Document,
    /// `<!DOCTYPE ...>` or another markup declaration, captured verbatim
    /// between `<!` and `>`.
    Doctype { data: String },
    Element { name: String, attributes: AttrMap },
    /// Character data, stored exactly as written in the source.
    /// Entity references are deliberately NOT decoded here.
    Text { data: String },
    Comment { data: String },
}

/// A tree node: linkage plus payload.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub id: NodeId,
    /// Non-owning back-reference; `None` for the root and detached nodes.
    pub parent_id: Option<NodeId>,
    /// Children in document order. Most nodes have few children.
    pub children_ids: SmallVec<[NodeId; 4]>,
    pub kind: NodeKind,
}

impl DomNode {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            parent_id: None,
            children_ids: SmallVec::new(),
            kind,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Tag name for element nodes.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Character data for text nodes.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { data } => Some(data),
            _ => None,
        }
    }

    /// Case-insensitive tag name check; `false` for non-elements.
    pub fn is_named(&self, name: &str) -> bool {
        self.tag_name()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// Attribute value lookup. Valueless attributes yield `None` just like
    /// absent ones; use the attribute map directly to tell them apart.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.get(name).and_then(|v| v.as_deref())
            }
            _ => None,
        }
    }
}
