//! Bidirectional escaping of the format's fixed reserved-character set.
//!
//! Reserved characters are replaced with `&<decimal codepoint>;`. The scheme
//! is total in both directions and hand-rolled rather than regex-backed: the
//! grammar is fixed and small enough that a forward scan is simpler than
//! pulling in a regex engine for it.

/// Characters that may not appear literally inside a `Safe` terminal (see
/// the grammar in the crate's design notes); each must round-trip through
/// [`escape`]/[`unescape`].
const RESERVED: &[char] = &[
    '&', ';', '!', '@', '#', '%', '[', ']', '{', '}', '|', ',', '=', '$', ':', '~',
];

fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Escapes every reserved character in `s` to `&<codepoint>;`.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_reserved(c) {
            out.push('&');
            out.push_str(&(c as u32).to_string());
            out.push(';');
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverses [`escape`]: every `&<digits>;` run becomes the character for
/// that codepoint. Any `&` not followed by a valid `<digits>;` run is left
/// untouched, since it cannot have been produced by `escape`.
#[must_use]
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            let digits_start = i + 1;
            let mut j = digits_start;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > digits_start && j < bytes.len() && bytes[j] == b';' {
                if let Ok(code) = s[digits_start..j].parse::<u32>() {
                    if let Some(ch) = char::from_u32(code) {
                        out.push(ch);
                        i = j + 1;
                        continue;
                    }
                }
            }
        }
        // Fall back to copying one char (not necessarily one byte).
        let ch = s[i..].chars().next().expect("i < bytes.len()");
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}
