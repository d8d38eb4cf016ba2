//! Phrase highlighting in HTML.
//!
//! Wraps every occurrence of a query phrase in `<mark>` elements, without
//! disturbing the surrounding markup. Matching is case-insensitive, treats
//! query whitespace as elastic, sees through element boundaries (a phrase
//! split across `<em>`/`<b>`/... still matches), and understands character
//! entity references (`&nbsp;` counts as whitespace).
//!
//! ## Pipeline
//!
//! ```text
//! parse → flatten text → decode entities → match → bind to nodes → splice marks → serialize
//! ```
//!
//! The tree stores text entity-encoded; matching runs over decoded text when
//! needed and offsets are translated back, so the output preserves the
//! source's entity spelling (`&nbsp;` stays `&nbsp;`, never a literal NBSP).

mod error;
mod flatten;
mod locator;
mod matcher;
mod mutator;
mod offsets;

pub use error::{HighlightError, Result};
pub use dom::{ParserOptions, SerializerOptions};

/// Pipeline configuration, forwarded to the parser and serializer.
#[derive(Debug, Clone, Default)]
pub struct HighlightOptions {
    pub parser: ParserOptions,
    pub serializer: SerializerOptions,
}

/// Wrap every occurrence of `query` in `html` with `<mark>` elements.
///
/// An empty query or a query with no occurrences returns the input
/// unchanged (byte-identical, not re-serialized).
pub fn highlight(query: &str, html: &str, options: &HighlightOptions) -> Result<String> {
    if query.is_empty() {
        return Ok(html.to_string());
    }

    let mut arena = dom::parse(html, &options.parser);
    let text = flatten::flatten_text(&arena)?;
    let decoded = dom::decode_html(&text);
    let mut matches = matcher::find_matches(query, &text, &decoded, &dom::decode_html)?;
    if matches.is_empty() {
        return Ok(html.to_string());
    }
    tracing::debug!(query, count = matches.len(), "highlighting matches");

    locator::bind_nodes(&arena, &mut matches)?;
    mutator::apply_matches(&mut arena, &matches)?;
    Ok(dom::serialize(&arena, &options.serializer)?)
}
