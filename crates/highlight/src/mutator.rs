//! Tree mutation: splicing marker elements around matched text.
//!
//! Original text nodes are never edited in place. Each match's replacement
//! pieces are spliced in next to the originals, and the superseded originals
//! are detached in one cleanup pass at the end, so every node's payload
//! stays readable while later matches are processed.

use crate::error::{HighlightError, Result};
use crate::matcher::{Endpoint, Match};
use dom::{DomArena, DomError, NodeId, NodeKind};

/// Element wrapped around matched text.
const MARK_TAG: &str = "mark";

/// Apply every match to the tree. Matches must be bound (see
/// `locator::bind_nodes`) and in document order.
pub(crate) fn apply_matches(arena: &mut DomArena, matches: &[Match]) -> Result<()> {
    let mut superseded: Vec<NodeId> = Vec::new();

    for (i, m) in matches.iter().enumerate() {
        let start_node = bound(&m.start, m)?;
        let end_node = bound(&m.end, m)?;

        // When the previous match ended in this match's start node, that
        // node's gap text was already emitted as the previous after-piece.
        let duplicate_before =
            i > 0 && matches[i - 1].end.node == Some(start_node);

        if start_node == end_node {
            // The matched bytes equal this node's payload between the two
            // local offsets; the matcher already holds that slice.
            let mut pieces: Vec<NodeId> = Vec::with_capacity(3);
            if !duplicate_before && !m.before.is_empty() {
                pieces.push(arena.alloc_text(m.before.clone()));
            }
            pieces.push(make_mark(arena, m.text.clone()));
            if !m.after.is_empty() {
                pieces.push(arena.alloc_text(m.after.clone()));
            }
            splice_at(arena, start_node, 0, &pieces)?;
            superseded.push(start_node);
        } else {
            // Start side: unmatched head stays, matched tail gets marked.
            let start_data = node_text(arena, start_node)?.to_string();
            let tail = slice(&start_data, m.start.local, start_data.len(), start_node)?
                .to_string();
            let mut pieces: Vec<NodeId> = Vec::with_capacity(2);
            if !duplicate_before && !m.before.is_empty() {
                pieces.push(arena.alloc_text(m.before.clone()));
            }
            pieces.push(make_mark(arena, tail));
            splice_at(arena, start_node, 1, &pieces)?;
            superseded.push(start_node);

            // End side: matched head gets marked, unmatched tail stays.
            let end_data = node_text(arena, end_node)?.to_string();
            let head = slice(&end_data, 0, m.end.local, end_node)?.to_string();
            let mut pieces: Vec<NodeId> = Vec::with_capacity(2);
            pieces.push(make_mark(arena, head));
            if !m.after.is_empty() {
                pieces.push(arena.alloc_text(m.after.clone()));
            }
            splice_at(arena, end_node, 0, &pieces)?;
            superseded.push(end_node);

            // Fully covered nodes are wrapped in place, keeping their own
            // position under their own parents.
            for &node in &m.intermediates {
                wrap_in_mark(arena, node)?;
            }
        }
    }

    for id in superseded {
        arena.detach(id);
    }
    Ok(())
}

fn bound(endpoint: &Endpoint, m: &Match) -> Result<NodeId> {
    endpoint.node.ok_or(HighlightError::UnboundMatch {
        start: m.start.offset,
        end: m.end.offset,
    })
}

fn node_text<'a>(arena: &'a DomArena, id: NodeId) -> Result<&'a str> {
    arena
        .get(id)?
        .text()
        .ok_or(HighlightError::Misaligned(id))
}

fn slice<'a>(data: &'a str, from: usize, to: usize, node: NodeId) -> Result<&'a str> {
    data.get(from..to).ok_or(HighlightError::Misaligned(node))
}

/// Allocate `<mark>` holding one text node.
fn make_mark(arena: &mut DomArena, text: String) -> NodeId {
    let mark = arena.alloc_element(MARK_TAG);
    if !text.is_empty() {
        let content = arena.alloc_text(text);
        arena.append_child(mark, content);
    }
    mark
}

/// Insert `pieces` into `anchor`'s parent, `offset` positions after `anchor`.
fn splice_at(
    arena: &mut DomArena,
    anchor: NodeId,
    offset: usize,
    pieces: &[NodeId],
) -> Result<()> {
    if pieces.is_empty() {
        return Ok(());
    }
    let parent = arena
        .get(anchor)?
        .parent_id
        .ok_or(DomError::Detached(anchor))?;
    let index = arena
        .position_of(parent, anchor)
        .ok_or(DomError::NotAChild {
            parent,
            child: anchor,
        })?;
    arena.insert_children(parent, index + offset, pieces);
    Ok(())
}

/// Replace `node` with a `<mark>` that re-parents `node` inside it.
fn wrap_in_mark(arena: &mut DomArena, node: NodeId) -> Result<()> {
    if node_text(arena, node)?.is_empty() {
        return Ok(());
    }
    let parent = arena
        .get(node)?
        .parent_id
        .ok_or(DomError::Detached(node))?;
    let mark = arena.alloc(NodeKind::Element {
        name: MARK_TAG.to_string(),
        attributes: Default::default(),
    });
    arena.replace_child(parent, node, mark)?;
    arena.append_child(mark, node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten_text;
    use crate::locator::bind_nodes;
    use crate::matcher::find_matches;
    use dom::{parse, serialize, ParserOptions, SerializerOptions};

    fn run(query: &str, html: &str) -> String {
        let mut arena = parse(html, &ParserOptions::default());
        let text = flatten_text(&arena).unwrap();
        let decoded = dom::decode_html(&text);
        let mut matches = find_matches(query, &text, &decoded, &dom::decode_html).unwrap();
        bind_nodes(&arena, &mut matches).unwrap();
        apply_matches(&mut arena, &matches).unwrap();
        serialize(&arena, &SerializerOptions::default()).unwrap()
    }

    #[test]
    fn single_node_splice() {
        assert_eq!(run("ell", "<p>hello</p>"), "<p>h<mark>ell</mark>o</p>");
    }

    #[test]
    fn match_covering_whole_node_has_no_side_text() {
        assert_eq!(run("hello", "<p>hello</p>"), "<p><mark>hello</mark></p>");
    }

    #[test]
    fn multi_node_splice() {
        assert_eq!(
            run("lot of", "<p>a <em>lot</em> of x</p>"),
            "<p>a <em><mark>lot</mark></em><mark> of</mark> x</p>"
        );
    }

    #[test]
    fn intermediate_wrapped_in_place() {
        assert_eq!(
            run("a b c", "<p>a <em>b</em> c</p>"),
            "<p><mark>a </mark><em><mark>b</mark></em><mark> c</mark></p>"
        );
    }

    #[test]
    fn adjacent_matches_keep_gap_once() {
        assert_eq!(
            run("a", "<p>a-a</p>"),
            "<p><mark>a</mark>-<mark>a</mark></p>"
        );
    }

    #[test]
    fn originals_detached_not_edited() {
        let mut arena = parse("<p>hello</p>", &ParserOptions::default());
        let text = flatten_text(&arena).unwrap();
        let decoded = dom::decode_html(&text);
        let mut matches =
            find_matches("ell", &text, &decoded, &dom::decode_html).unwrap();
        bind_nodes(&arena, &mut matches).unwrap();
        let original = matches[0].start.node.unwrap();
        apply_matches(&mut arena, &matches).unwrap();

        let node = arena.get(original).unwrap();
        assert_eq!(node.parent_id, None);
        assert_eq!(node.text(), Some("hello"));
    }
}
