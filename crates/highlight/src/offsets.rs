//! Entity-aware offset translation.
//!
//! Matching may run over DECODED text while the tree stores ENCODED text.
//! Every entity reference before or inside a match stretches the encoded
//! form relative to the decoded form; this module scans the references and
//! shifts match endpoints from decoded coordinates back to encoded ones.
//!
//! All offsets are byte offsets.

use crate::matcher::Match;
use regex::Regex;
use std::sync::OnceLock;

/// One character-entity reference in the encoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntityOccurrence {
    /// Byte range of the reference in the encoded text.
    pub start: usize,
    pub end: usize,
    /// Byte length of what the reference decodes to; equals `end - start`
    /// when the decoder leaves it alone.
    pub decoded_len: usize,
}

impl EntityOccurrence {
    /// How many bytes the encoded form is longer than the decoded form.
    pub fn delta(&self) -> usize {
        (self.end - self.start).saturating_sub(self.decoded_len)
    }
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);")
            .expect("reference pattern is valid")
    })
}

/// Scan `text` for entity references, measuring each one's decoded length
/// with the caller's decoder. References the decoder passes through
/// unchanged get `decoded_len == raw len` and never shift anything.
pub(crate) fn scan_entities<F>(text: &str, decode: &F) -> Vec<EntityOccurrence>
where
    F: Fn(&str) -> String,
{
    reference_pattern()
        .find_iter(text)
        .map(|m| EntityOccurrence {
            start: m.start(),
            end: m.end(),
            decoded_len: decode(m.as_str()).len(),
        })
        .collect()
}

/// Translate match endpoints from decoded-text coordinates to encoded-text
/// coordinates, in place.
///
/// Occurrences must be in ascending position order (as `scan_entities`
/// returns them). For each occurrence, matches starting at or after it shift
/// right by its delta; a match that started before it but whose tail reaches
/// it grows by the delta instead.
pub(crate) fn to_encoded(matches: &mut [Match], entities: &[EntityOccurrence]) {
    for entity in entities {
        let delta = entity.delta();
        if delta == 0 {
            continue;
        }
        for m in matches.iter_mut() {
            if entity.start <= m.start.offset {
                m.start.offset += delta;
                m.end.offset += delta;
            } else if entity.end <= m.end.offset + delta {
                m.end.offset += delta;
            }
        }
    }
}
