//! Splits the body of an entried value's `{…}` block into its individual
//! `[key]%flags:value` entries, and splits each entry into its key and value
//! fragments.
//!
//! Both splits are done by a single forward scan that tracks bracket depth,
//! since a naive split on `,` or `:` would also match separators nested
//! inside a child block's own payload.

use crate::error::Error;

/// Splits `body` (the interior of an entried value's `{…}`, braces already
/// stripped) into top-level entry fragments, each still containing its own
/// `key:value` pair. Top-level commas are the only separators recognized;
/// commas inside a nested `{…}`/`[…]` are not split points.
#[must_use]
pub fn split_entries(body: &str) -> Vec<&str> {
    if body.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                out.push(&body[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&body[start..]);
    out
}

/// Splits a single entry fragment (e.g. `[1|name]%7:2|value`) into its key
/// fragment (`[1|name]%7`) and value fragment (`2|value`) at the first
/// top-level `:`.
pub fn split_key_fragment(entry: &str) -> Result<(&str, &str), Error> {
    let mut depth = 0i32;
    for (i, c) in entry.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            ':' if depth == 0 => {
                return Ok((&entry[..i], &entry[i + 1..]));
            }
            _ => {}
        }
    }
    Err(Error::DecodeGrammar(format!(
        "entry `{entry}` has no top-level `:` separating its key from its value"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_flat_entries() {
        let entries = split_entries("[1|a]%7:2|1,[1|b]%7:2|2");
        assert_eq!(entries, vec!["[1|a]%7:2|1", "[1|b]%7:2|2"]);
    }

    #[test]
    fn ignores_commas_nested_in_child_blocks() {
        let entries = split_entries("[1|a]%7:3|{[1|x]%7:2|1,[1|y]%7:2|2}");
        assert_eq!(entries, vec!["[1|a]%7:3|{[1|x]%7:2|1,[1|y]%7:2|2}"]);
    }

    #[test]
    fn empty_body_yields_no_entries() {
        assert!(split_entries("").is_empty());
    }

    #[test]
    fn splits_key_and_value_fragment() {
        let (key, value) = split_key_fragment("[1|name]%7:2|1").unwrap();
        assert_eq!(key, "[1|name]%7");
        assert_eq!(value, "2|1");
    }

    #[test]
    fn key_split_ignores_colons_nested_in_child_blocks() {
        let (key, value) = split_key_fragment("[1|a]%7:3|{[1|x]%7:1|y}").unwrap();
        assert_eq!(key, "[1|a]%7");
        assert_eq!(value, "3|{[1|x]%7:1|y}");
    }

    #[test]
    fn rejects_entry_without_separator() {
        assert!(split_key_fragment("[1|a]%7").is_err());
    }
}
