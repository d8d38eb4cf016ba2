//! Text flattening: the ordered searchable text nodes of a tree and their
//! concatenated payload.
//!
//! The locator walks the same node list, so byte positions in the flat text
//! map one-to-one onto (node, local offset) pairs.

use crate::error::Result;
use dom::{DomArena, DomError, NodeId};

/// Elements whose subtree is invisible to matching.
const OPAQUE_TAG: &str = "script";

/// All non-empty text nodes in document order, skipping opaque subtrees.
pub(crate) fn visible_text_nodes(arena: &DomArena) -> Result<Vec<NodeId>> {
    let root = arena.root_id().ok_or(DomError::MissingRoot)?;
    let mut stack = vec![root];
    let mut out = Vec::new();

    while let Some(id) = stack.pop() {
        let node = arena.get(id)?;
        if node.is_named(OPAQUE_TAG) {
            continue;
        }
        if let Some(data) = node.text() {
            if !data.is_empty() {
                out.push(id);
            }
            continue;
        }
        for &child in node.children_ids.iter().rev() {
            stack.push(child);
        }
    }
    Ok(out)
}

/// Concatenated payloads of `visible_text_nodes`, still entity-encoded.
pub(crate) fn flatten_text(arena: &DomArena) -> Result<String> {
    let mut text = String::new();
    for id in visible_text_nodes(arena)? {
        if let Some(data) = arena.get(id)?.text() {
            text.push_str(data);
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{parse, ParserOptions};

    fn flat(html: &str) -> String {
        let arena = parse(html, &ParserOptions::default());
        flatten_text(&arena).unwrap()
    }

    #[test]
    fn concatenates_in_document_order() {
        // Plain payload concatenation: no separator between elements.
        assert_eq!(flat("<p>a <em>b</em> c</p><p>d</p>"), "a b cd");
    }

    #[test]
    fn script_subtree_is_opaque() {
        assert_eq!(flat("a<script>var x = 'b';</script>c"), "ac");
    }

    #[test]
    fn style_text_participates() {
        assert_eq!(flat("a<style>p {}</style>c"), "ap {}c");
    }

    #[test]
    fn comments_are_not_text() {
        assert_eq!(flat("a<!-- b -->c"), "ac");
    }

    #[test]
    fn entities_stay_encoded() {
        assert_eq!(flat("<p>a&nbsp;b</p>"), "a&nbsp;b");
    }

    #[test]
    fn node_list_skips_empty_text() {
        let arena = parse("<p></p><p>x</p>", &ParserOptions::default());
        let nodes = visible_text_nodes(&arena).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(arena.get(nodes[0]).unwrap().text(), Some("x"));
    }
}
