//! Query matching over the flattened text.
//!
//! The query is a literal phrase, not a pattern: every character is escaped,
//! except that each whitespace run matches any whitespace run in the source.
//! Matching is case-insensitive, leftmost, non-overlapping.
//!
//! When the text contains entity references that actually decode, matching
//! runs over the decoded text and the offsets are translated back to encoded
//! coordinates; otherwise the encoded text is searched directly.

use crate::error::Result;
use crate::offsets;
use dom::NodeId;
use regex::RegexBuilder;

/// One end of a match: position in the flat encoded text, later bound to a
/// concrete text node and a byte offset local to that node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    /// Byte offset in the flat encoded text.
    pub offset: usize,
    /// Text node this endpoint falls in, once located.
    pub node: Option<NodeId>,
    /// Byte offset within that node's payload.
    pub local: usize,
}

impl Endpoint {
    fn new(offset: usize) -> Self {
        Self {
            offset,
            node: None,
            local: 0,
        }
    }
}

/// One occurrence of the query.
#[derive(Debug, Clone)]
pub(crate) struct Match {
    pub start: Endpoint,
    pub end: Endpoint,
    /// Matched slice of the flat encoded text.
    pub text: String,
    /// Unmatched text sharing the start node, to the match's left.
    pub before: String,
    /// Unmatched text sharing the end node, to the match's right.
    pub after: String,
    /// Text nodes fully covered between the start and end nodes.
    pub intermediates: Vec<NodeId>,
}

impl Match {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Endpoint::new(start),
            end: Endpoint::new(end),
            text: String::new(),
            before: String::new(),
            after: String::new(),
            intermediates: Vec::new(),
        }
    }
}

/// Escape the query into a pattern: literal characters, with each INTERIOR
/// whitespace run relaxed to `\s+`. Leading and trailing whitespace stays
/// literal.
fn build_pattern(query: &str) -> String {
    let trimmed_start = query.trim_start();
    let leading = &query[..query.len() - trimmed_start.len()];
    let core = trimmed_start.trim_end();
    let trailing = &trimmed_start[core.len()..];

    let mut pattern = String::with_capacity(query.len() * 2);
    pattern.push_str(&regex::escape(leading));
    let mut rest = core;
    while !rest.is_empty() {
        match rest.find(char::is_whitespace) {
            Some(0) => {
                pattern.push_str(r"\s+");
                rest = rest.trim_start();
            }
            Some(idx) => {
                pattern.push_str(&regex::escape(&rest[..idx]));
                rest = &rest[idx..];
            }
            None => {
                pattern.push_str(&regex::escape(rest));
                rest = "";
            }
        }
    }
    pattern.push_str(&regex::escape(trailing));
    pattern
}

/// Find every occurrence of `query` in the flat text.
///
/// `text` is the encoded flat text, `decoded` its decoded form, and `decode`
/// the decoder that produced it (used to measure individual references).
/// Returned offsets are in ENCODED coordinates either way.
pub(crate) fn find_matches<F>(
    query: &str,
    text: &str,
    decoded: &str,
    decode: &F,
) -> Result<Vec<Match>>
where
    F: Fn(&str) -> String,
{
    let pattern = RegexBuilder::new(&build_pattern(query))
        .case_insensitive(true)
        .build()?;

    let mut matches: Vec<Match> = if text.len() == decoded.len() {
        // No reference decoded to anything shorter; encoded == decoded
        // coordinates, search directly.
        pattern
            .find_iter(text)
            .map(|m| Match::new(m.start(), m.end()))
            .collect()
    } else {
        let entities = offsets::scan_entities(text, decode);
        let mut found: Vec<Match> = pattern
            .find_iter(decoded)
            .map(|m| Match::new(m.start(), m.end()))
            .collect();
        offsets::to_encoded(&mut found, &entities);
        found
    };

    for m in &mut matches {
        m.text = text
            .get(m.start.offset..m.end.offset)
            .unwrap_or("")
            .to_string();
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(query: &str, text: &str) -> Vec<(usize, usize)> {
        let decoded = dom::decode_html(text);
        find_matches(query, text, &decoded, &dom::decode_html)
            .unwrap()
            .iter()
            .map(|m| (m.start.offset, m.end.offset))
            .collect()
    }

    #[test]
    fn pattern_escapes_metacharacters() {
        assert_eq!(build_pattern("a.b*c"), r"a\.b\*c");
    }

    #[test]
    fn pattern_relaxes_interior_whitespace_runs() {
        assert_eq!(build_pattern("a lot  of tests"), r"a\s+lot\s+of\s+tests");
    }

    #[test]
    fn pattern_keeps_edge_whitespace_literal() {
        assert_eq!(build_pattern(" x "), " x ");
        assert_eq!(spans(" x ", "a x b"), vec![(1, 4)]);
        // A literal edge space claims exactly one character of a longer run.
        assert_eq!(spans(" x ", "a  x b"), vec![(2, 5)]);
        // Edge tabs do not match spaces.
        assert!(spans("\tx", "a x b").is_empty());
    }

    #[test]
    fn case_insensitive_literal() {
        assert_eq!(spans("Text", "some text and TEXT"), vec![(5, 9), (14, 18)]);
    }

    #[test]
    fn non_overlapping_leftmost() {
        assert_eq!(spans("aa", "aaaa"), vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn whitespace_elastic_in_encoded_path() {
        assert_eq!(spans("a b", "x a \n\t b y"), vec![(2, 8)]);
    }

    #[test]
    fn decoded_path_translates_offsets() {
        // encoded "a&nbsp;b": decoded "a\u{a0}b"; query whitespace spans the NBSP
        let text = "x a&nbsp;b y";
        let matched = spans("a b", text);
        assert_eq!(matched, vec![(2, 10)]);
        assert_eq!(&text[2..10], "a&nbsp;b");
    }

    #[test]
    fn matched_text_is_encoded_slice() {
        let text = "broke&nbsp;it";
        let decoded = dom::decode_html(text);
        let found = find_matches("broke it", text, &decoded, &dom::decode_html).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "broke&nbsp;it");
    }

    #[test]
    fn no_match_is_empty() {
        assert!(spans("zebra", "no stripes here").is_empty());
    }
}
