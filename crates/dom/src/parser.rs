//! Permissive single-pass HTML parser.
//!
//! Tokenizes and builds the tree in one sweep over the input, writing nodes
//! straight into the arena. Recovery rules are the forgiving ones real pages
//! need: unmatched end tags are dropped, unterminated constructs run to end
//! of input, a bare `<` that opens nothing is literal text.
//!
//! Text nodes hold the source bytes verbatim; entity references are NOT
//! decoded here. Offset arithmetic downstream depends on that.

use crate::arena::DomArena;
use crate::types::{AttrMap, NodeId, NodeKind};
use memchr::memchr;

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Lowercase element names while parsing.
    pub lowercase_tags: bool,
    /// Lowercase attribute names while parsing.
    pub lowercase_attributes: bool,
}

/// Parse `html` into a tree rooted at a synthetic Document node.
pub fn parse(html: &str, options: &ParserOptions) -> DomArena {
    let mut parser = Parser::new(html, options);
    parser.run();
    parser.arena
}

/// Elements whose start tag never takes content.
pub(crate) fn is_void_element(name: &str) -> bool {
    const VOID: &[&str] = &[
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    VOID.iter().any(|v| name.eq_ignore_ascii_case(v))
}

/// Elements whose content is raw text up to the matching close tag.
pub(crate) fn is_raw_text_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    options: &'a ParserOptions,
    arena: DomArena,
    root: NodeId,
    /// Open element stack; the document root is implicit below it.
    open: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, options: &'a ParserOptions) -> Self {
        let mut arena = DomArena::new();
        let root = arena.alloc(NodeKind::Document);
        arena.set_root(root);
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            options,
            arena,
            root,
            open: Vec::new(),
        }
    }

    fn parent(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.root)
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'<' {
                self.markup();
            } else {
                self.text_run();
            }
        }
    }

    /// Consume text up to the next `<` (or end of input) as one text node.
    fn text_run(&mut self) {
        let start = self.pos;
        let end = match memchr(b'<', &self.bytes[start..]) {
            Some(offset) => start + offset,
            None => self.bytes.len(),
        };
        let data = &self.input[start..end];
        let parent = self.parent();
        let text = self.arena.alloc_text(data);
        self.arena.append_child(parent, text);
        self.pos = end;
    }

    /// Dispatch on the byte after `<`.
    fn markup(&mut self) {
        match self.bytes.get(self.pos + 1) {
            Some(&b'!') if self.bytes[self.pos + 1..].starts_with(b"!--") => self.comment(),
            Some(&b'!') => self.declaration(),
            Some(&b'/') => self.end_tag(),
            Some(&b) if b.is_ascii_alphabetic() => self.start_tag(),
            _ => {
                // A `<` that opens nothing: literal text through the next `<`.
                let start = self.pos;
                let end = match memchr(b'<', &self.bytes[start + 1..]) {
                    Some(offset) => start + 1 + offset,
                    None => self.bytes.len(),
                };
                let data = &self.input[start..end];
                let parent = self.parent();
                let text = self.arena.alloc_text(data);
                self.arena.append_child(parent, text);
                self.pos = end;
            }
        }
    }

    fn comment(&mut self) {
        let body_start = self.pos + 4; // past "<!--"
        let (body_end, next) = match find_subslice(&self.bytes[body_start..], b"-->") {
            Some(offset) => (body_start + offset, body_start + offset + 3),
            None => (self.bytes.len(), self.bytes.len()),
        };
        let data = self.input[body_start.min(self.bytes.len())..body_end].to_string();
        let parent = self.parent();
        let comment = self.arena.alloc(NodeKind::Comment { data });
        self.arena.append_child(parent, comment);
        self.pos = next;
    }

    fn declaration(&mut self) {
        let body_start = self.pos + 2; // past "<!"
        let (body_end, next) = match memchr(b'>', &self.bytes[body_start..]) {
            Some(offset) => (body_start + offset, body_start + offset + 1),
            None => (self.bytes.len(), self.bytes.len()),
        };
        let data = self.input[body_start..body_end].to_string();
        let parent = self.parent();
        let doctype = self.arena.alloc(NodeKind::Doctype { data });
        self.arena.append_child(parent, doctype);
        self.pos = next;
    }

    fn end_tag(&mut self) {
        let name_start = self.pos + 2; // past "</"
        let mut end = name_start;
        while end < self.bytes.len() && is_name_byte(self.bytes[end]) {
            end += 1;
        }
        let name = &self.input[name_start..end];
        // Skip to the closing '>' (or end of input).
        self.pos = match memchr(b'>', &self.bytes[end..]) {
            Some(offset) => end + offset + 1,
            None => self.bytes.len(),
        };
        if name.is_empty() {
            return;
        }
        // Pop to the nearest matching open element; ignore stray end tags.
        let matching = self.open.iter().rposition(|&id| {
            self.arena
                .get(id)
                .is_ok_and(|node| node.is_named(name))
        });
        if let Some(index) = matching {
            self.open.truncate(index);
        }
    }

    fn start_tag(&mut self) {
        let input = self.input;
        let name_start = self.pos + 1;
        let mut cursor = name_start;
        while cursor < self.bytes.len() && is_name_byte(self.bytes[cursor]) {
            cursor += 1;
        }
        let mut name = input[name_start..cursor].to_string();
        if self.options.lowercase_tags {
            name.make_ascii_lowercase();
        }

        let mut attributes = AttrMap::default();
        let mut self_closing = false;

        loop {
            while cursor < self.bytes.len() && self.bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }
            match self.bytes.get(cursor) {
                None => break,
                Some(&b'>') => {
                    cursor += 1;
                    break;
                }
                Some(&b'/') if self.bytes.get(cursor + 1) == Some(&b'>') => {
                    self_closing = true;
                    cursor += 2;
                    break;
                }
                Some(&b'/') => {
                    cursor += 1;
                }
                _ => {
                    // Attribute name runs to whitespace, '=', '/', or '>'.
                    let attr_start = cursor;
                    while cursor < self.bytes.len()
                        && !self.bytes[cursor].is_ascii_whitespace()
                        && !matches!(self.bytes[cursor], b'=' | b'/' | b'>')
                    {
                        cursor += 1;
                    }
                    let mut attr_name = input[attr_start..cursor].to_string();
                    if self.options.lowercase_attributes {
                        attr_name.make_ascii_lowercase();
                    }

                    while cursor < self.bytes.len() && self.bytes[cursor].is_ascii_whitespace() {
                        cursor += 1;
                    }
                    let value = if self.bytes.get(cursor) == Some(&b'=') {
                        cursor += 1;
                        while cursor < self.bytes.len() && self.bytes[cursor].is_ascii_whitespace()
                        {
                            cursor += 1;
                        }
                        match self.bytes.get(cursor) {
                            Some(&quote) if quote == b'"' || quote == b'\'' => {
                                let value_start = cursor + 1;
                                let value_end =
                                    match memchr(quote, &self.bytes[value_start..]) {
                                        Some(offset) => value_start + offset,
                                        None => self.bytes.len(),
                                    };
                                cursor = (value_end + 1).min(self.bytes.len());
                                Some(input[value_start..value_end].to_string())
                            }
                            _ => {
                                let value_start = cursor;
                                while cursor < self.bytes.len()
                                    && !self.bytes[cursor].is_ascii_whitespace()
                                    && !matches!(self.bytes[cursor], b'>' | b'/')
                                {
                                    cursor += 1;
                                }
                                Some(input[value_start..cursor].to_string())
                            }
                        }
                    } else {
                        None
                    };
                    if !attr_name.is_empty() {
                        attributes.entry(attr_name).or_insert(value);
                    }
                }
            }
        }
        self.pos = cursor;

        let void = self_closing || is_void_element(&name);
        let raw_text = (!void && is_raw_text_element(&name)).then(|| name.clone());

        let parent = self.parent();
        let element = self.arena.alloc(NodeKind::Element { name, attributes });
        self.arena.append_child(parent, element);

        if let Some(tag) = raw_text {
            self.raw_text(element, &tag);
        } else if !void {
            self.open.push(element);
        }
    }

    /// Consume raw text content (script/style) up to the matching close tag.
    fn raw_text(&mut self, element: NodeId, tag: &str) {
        let start = self.pos;
        let (body_end, next) = match find_close_tag(&self.bytes[start..], tag) {
            Some((at, after)) => (start + at, start + after),
            None => (self.bytes.len(), self.bytes.len()),
        };
        if body_end > start {
            let data = &self.input[start..body_end];
            let text = self.arena.alloc_text(data);
            self.arena.append_child(element, text);
        }
        self.pos = next;
    }
}

/// Find `</tag` (case-insensitive, optional whitespace before `>`) in
/// `haystack`. Returns (offset of `<`, offset just past `>`).
fn find_close_tag(haystack: &[u8], tag: &str) -> Option<(usize, usize)> {
    let tag = tag.as_bytes();
    let mut search_from = 0;
    while let Some(offset) = memchr(b'<', &haystack[search_from..]) {
        let at = search_from + offset;
        let rest = &haystack[at..];
        if rest.len() > 2 && rest[1] == b'/' {
            let name = rest.get(2..2 + tag.len());
            if name.is_some_and(|n| n.eq_ignore_ascii_case(tag)) {
                let mut cursor = 2 + tag.len();
                while cursor < rest.len() && rest[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                if rest.get(cursor) == Some(&b'>') {
                    return Some((at, at + cursor + 1));
                }
            }
        }
        search_from = at + 1;
    }
    None
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn parse_default(html: &str) -> DomArena {
        parse(html, &ParserOptions::default())
    }

    fn child_names(arena: &DomArena, id: NodeId) -> Vec<String> {
        arena
            .get(id)
            .unwrap()
            .children_ids
            .iter()
            .map(|&c| match &arena.get(c).unwrap().kind {
                NodeKind::Element { name, .. } => format!("<{name}>"),
                NodeKind::Text { data } => format!("#{data}"),
                NodeKind::Comment { data } => format!("<!--{data}-->"),
                NodeKind::Doctype { data } => format!("<!{data}>"),
                NodeKind::Document => "#doc".to_string(),
            })
            .collect()
    }

    #[test]
    fn nested_elements_and_text() {
        let arena = parse_default("<div>a<em>b</em>c</div>");
        let root = arena.root_id().unwrap();
        assert_eq!(child_names(&arena, root), vec!["<div>"]);
        let div = arena.get(root).unwrap().children_ids[0];
        assert_eq!(child_names(&arena, div), vec!["#a", "<em>", "#c"]);
    }

    #[test]
    fn attributes_in_source_order() {
        let arena = parse_default(r##"<a href="#x" class='c' disabled data-v=7>t</a>"##);
        let root = arena.root_id().unwrap();
        let a = arena.get(root).unwrap().children_ids[0];
        let node = arena.get(a).unwrap();
        let NodeKind::Element { attributes, .. } = &node.kind else {
            panic!("expected element");
        };
        let keys: Vec<_> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["href", "class", "disabled", "data-v"]);
        assert_eq!(node.attr("href"), Some("#x"));
        assert_eq!(node.attr("class"), Some("c"));
        assert_eq!(node.attr("data-v"), Some("7"));
        assert_eq!(attributes.get("disabled"), Some(&None));
    }

    #[test]
    fn text_is_not_entity_decoded() {
        let arena = parse_default("<p>a&nbsp;b</p>");
        let root = arena.root_id().unwrap();
        let p = arena.get(root).unwrap().children_ids[0];
        let text = arena.get(p).unwrap().children_ids[0];
        assert_eq!(arena.get(text).unwrap().text(), Some("a&nbsp;b"));
    }

    #[test]
    fn void_and_self_closing() {
        let arena = parse_default("<p>a<br>b<img src=x/>c</p>");
        let root = arena.root_id().unwrap();
        let p = arena.get(root).unwrap().children_ids[0];
        assert_eq!(
            child_names(&arena, p),
            vec!["#a", "<br>", "#b", "<img>", "#c"]
        );
        let br = arena.get(p).unwrap().children_ids[1];
        assert!(arena.get(br).unwrap().children_ids.is_empty());
    }

    #[test]
    fn comments_and_doctype() {
        let arena = parse_default("<!DOCTYPE html><!-- note -->x");
        let root = arena.root_id().unwrap();
        assert_eq!(
            child_names(&arena, root),
            vec!["<!DOCTYPE html>", "<!-- note -->", "#x"]
        );
    }

    #[test]
    fn script_body_is_raw_text() {
        let arena = parse_default("<script>if (a < b) { f(\"<em>\"); }</script>after");
        let root = arena.root_id().unwrap();
        assert_eq!(child_names(&arena, root), vec!["<script>", "#after"]);
        let script = arena.get(root).unwrap().children_ids[0];
        let body = arena.get(script).unwrap().children_ids[0];
        assert_eq!(
            arena.get(body).unwrap().text(),
            Some("if (a < b) { f(\"<em>\"); }")
        );
    }

    #[test]
    fn raw_text_close_tag_case_insensitive() {
        let arena = parse_default("<STYLE>p { color: red }</style>x");
        let root = arena.root_id().unwrap();
        assert_eq!(child_names(&arena, root), vec!["<STYLE>", "#x"]);
    }

    #[test]
    fn stray_end_tag_dropped() {
        let arena = parse_default("<div>a</span>b</div>");
        let root = arena.root_id().unwrap();
        let div = arena.get(root).unwrap().children_ids[0];
        assert_eq!(child_names(&arena, div), vec!["#a", "#b"]);
    }

    #[test]
    fn unclosed_elements_run_to_end() {
        let arena = parse_default("<ul><li>one<li>two");
        let root = arena.root_id().unwrap();
        let ul = arena.get(root).unwrap().children_ids[0];
        // Permissive: the second <li> nests under the first (no implied close).
        let li1 = arena.get(ul).unwrap().children_ids[0];
        assert_eq!(child_names(&arena, li1), vec!["#one", "<li>"]);
    }

    #[test]
    fn bare_lt_is_text() {
        let arena = parse_default("a < b");
        let root = arena.root_id().unwrap();
        assert_eq!(child_names(&arena, root), vec!["#a ", "#< b"]);
    }

    #[test]
    fn lowercase_options() {
        let options = ParserOptions {
            lowercase_tags: true,
            lowercase_attributes: true,
        };
        let arena = parse("<DIV CLASS=x></DIV>", &options);
        let root = arena.root_id().unwrap();
        let div = arena.get(root).unwrap().children_ids[0];
        let node = arena.get(div).unwrap();
        assert_eq!(node.tag_name(), Some("div"));
        assert_eq!(node.attr("class"), Some("x"));
    }

    #[test]
    fn unterminated_comment_runs_to_end() {
        let arena = parse_default("a<!-- never closed");
        let root = arena.root_id().unwrap();
        assert_eq!(
            child_names(&arena, root),
            vec!["#a", "<!-- never closed-->"]
        );
    }
}
