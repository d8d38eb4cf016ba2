//! Tree serializer - render the arena back to HTML text.
//!
//! The inverse of the parser: attribute order and payload bytes come out
//! exactly as stored, so parse → serialize of well-formed input is the
//! identity on everything but discarded noise (stray end tags).

use crate::arena::DomArena;
use crate::error::Result;
use crate::parser::is_void_element;
use crate::types::{NodeId, NodeKind};

/// Serializer configuration.
#[derive(Debug, Clone, Default)]
pub struct SerializerOptions {
    /// Emit void elements as `<br/>` instead of `<br>`.
    pub self_closing: bool,
}

/// Serialize the whole tree (children of the root document node).
pub fn serialize(arena: &DomArena, options: &SerializerOptions) -> Result<String> {
    let mut output = String::with_capacity(256);
    if let Some(root_id) = arena.root_id() {
        serialize_node(arena, root_id, options, &mut output)?;
    }
    Ok(output)
}

fn serialize_node(
    arena: &DomArena,
    id: NodeId,
    options: &SerializerOptions,
    output: &mut String,
) -> Result<()> {
    let node = arena.get(id)?;
    match &node.kind {
        NodeKind::Document => {
            for &child in &node.children_ids {
                serialize_node(arena, child, options, output)?;
            }
        }
        NodeKind::Doctype { data } => {
            output.push_str("<!");
            output.push_str(data);
            output.push('>');
        }
        NodeKind::Comment { data } => {
            output.push_str("<!--");
            output.push_str(data);
            output.push_str("-->");
        }
        NodeKind::Text { data } => {
            output.push_str(data);
        }
        NodeKind::Element { name, attributes } => {
            output.push('<');
            output.push_str(name);
            for (attr_name, value) in attributes {
                output.push(' ');
                output.push_str(attr_name);
                if let Some(value) = value {
                    output.push_str("=\"");
                    output.push_str(&value.replace('"', "&quot;"));
                    output.push('"');
                }
            }
            if is_void_element(name) && node.children_ids.is_empty() {
                output.push_str(if options.self_closing { "/>" } else { ">" });
            } else {
                output.push('>');
                for &child in &node.children_ids {
                    serialize_node(arena, child, options, output)?;
                }
                output.push_str("</");
                output.push_str(name);
                output.push('>');
            }
        }
    }
    Ok(())
}
