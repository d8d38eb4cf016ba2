//! Binding matches to text nodes.
//!
//! One forward pass over the searchable text nodes with a running byte
//! cursor. For each node, every match whose span touches it is advanced:
//! the start endpoint binds to the first node whose end lies strictly past
//! it, the end endpoint to the first node whose end reaches it. Nodes
//! visited in between are the match's intermediates.
//!
//! The unmatched text sharing an endpoint's node (`before`/`after`) is
//! clamped by the neighbouring matches' spans so two matches landing in the
//! same node never claim the same bytes.

use crate::error::{HighlightError, Result};
use crate::flatten::visible_text_nodes;
use crate::matcher::Match;
use dom::{DomArena, NodeId};

/// Bind every match's endpoints to concrete text nodes.
///
/// `matches` must be in ascending, non-overlapping flat-text order (as the
/// matcher produces them). Errors if any match's span lies outside the
/// traversed text.
pub(crate) fn bind_nodes(arena: &DomArena, matches: &mut [Match]) -> Result<()> {
    let mut current = 0;
    let mut node_start = 0;

    for id in visible_text_nodes(arena)? {
        let data = arena
            .get(id)?
            .text()
            .ok_or(HighlightError::Misaligned(id))?;
        let node_end = node_start + data.len();

        while current < matches.len() {
            let prev_end = current
                .checked_sub(1)
                .map(|p| matches[p].end.offset)
                .unwrap_or(node_start);
            let next_start = matches
                .get(current + 1)
                .map(|m| m.start.offset)
                .unwrap_or(node_end);
            let m = &mut matches[current];

            if m.start.node.is_none() {
                if node_end <= m.start.offset {
                    break;
                }
                let local = m.start.offset - node_start;
                m.start.node = Some(id);
                m.start.local = local;
                // Unmatched head of this node, not already claimed by the
                // previous match.
                let from = prev_end.saturating_sub(node_start).min(local);
                m.before = slice(data, from, local, id)?.to_string();
            }

            if node_end < m.end.offset {
                // End lies in a later node; this one is fully covered unless
                // it also holds the start.
                if m.start.node != Some(id) {
                    m.intermediates.push(id);
                }
                break;
            }

            let local = m.end.offset - node_start;
            m.end.node = Some(id);
            m.end.local = local;
            // Unmatched tail of this node, up to the next match.
            let to = next_start
                .saturating_sub(node_start)
                .min(data.len())
                .max(local);
            m.after = slice(data, local, to, id)?.to_string();
            tracing::trace!(
                start = m.start.offset,
                end = m.end.offset,
                node = id,
                "bound match"
            );
            current += 1;
        }

        node_start = node_end;
    }

    if let Some(m) = matches.get(current) {
        return Err(HighlightError::UnboundMatch {
            start: m.start.offset,
            end: m.end.offset,
        });
    }
    Ok(())
}

fn slice(data: &str, from: usize, to: usize, node: NodeId) -> Result<&str> {
    data.get(from..to).ok_or(HighlightError::Misaligned(node))
}
