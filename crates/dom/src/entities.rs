//! Character entity decoding.
//!
//! Decodes the common named references plus well-formed numeric references.
//! Anything malformed, unknown, unterminated, or referring to an invalid
//! scalar value passes through unchanged.

use memchr::memchr;

const MAX_NAME_LEN: usize = 32;
const MAX_DEC_DIGITS: usize = 7;
const MAX_HEX_DIGITS: usize = 6;

/// Decode character entity references in `s`.
///
/// Returns the input's content with every recognized reference replaced by
/// its character. When `s` contains no `&` the input is copied as-is.
pub fn decode_html(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp;
        out.push_str(&s[pos..amp]);
        match parse_reference(&s[amp..]) {
            Some((len, ch)) => {
                out.push(ch);
                pos = amp + len;
            }
            None => {
                out.push('&');
                pos = amp + 1;
            }
        }
    }
    out.push_str(&s[pos..]);
    out
}

/// Parse one reference at the start of `s` (which begins with `&`).
/// Returns the byte length consumed (including `&` and `;`) and the decoded
/// character, or `None` if no well-formed recognized reference starts here.
fn parse_reference(s: &str) -> Option<(usize, char)> {
    let bytes = s.as_bytes();
    debug_assert_eq!(bytes.first(), Some(&b'&'));

    if bytes.get(1) == Some(&b'#') {
        let (radix, digits_at, max_digits) = if matches!(bytes.get(2), Some(&b'x') | Some(&b'X')) {
            (16, 3, MAX_HEX_DIGITS)
        } else {
            (10, 2, MAX_DEC_DIGITS)
        };
        let mut end = digits_at;
        while end < bytes.len()
            && end - digits_at < max_digits
            && (bytes[end] as char).is_digit(radix)
        {
            end += 1;
        }
        if end == digits_at || bytes.get(end) != Some(&b';') {
            return None;
        }
        let value = u32::from_str_radix(&s[digits_at..end], radix).ok()?;
        let ch = char::from_u32(value)?;
        return Some((end + 1, ch));
    }

    // Named reference: letters then digits, semicolon-terminated.
    let mut end = 1;
    while end < bytes.len() && end - 1 < MAX_NAME_LEN && bytes[end].is_ascii_alphanumeric() {
        end += 1;
    }
    if end == 1 || bytes.get(end) != Some(&b';') {
        return None;
    }
    let ch = named(&s[1..end])?;
    Some((end + 1, ch))
}

/// Lookup for the named references this decoder knows. Case-sensitive, as
/// entity names are; the uppercase forms of the XML five are also valid HTML.
fn named(name: &str) -> Option<char> {
    let ch = match name {
        "amp" | "AMP" => '&',
        "lt" | "LT" => '<',
        "gt" | "GT" => '>',
        "quot" | "QUOT" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "deg" => '\u{b0}',
        "middot" => '\u{b7}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "times" => '\u{d7}',
        "divide" => '\u{f7}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "trade" => '\u{2122}',
        "euro" => '\u{20ac}',
        _ => return None,
    };
    Some(ch)
}
