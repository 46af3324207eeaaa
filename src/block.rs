//! Parses the two fragments [`crate::entries::split_key_fragment`] hands
//! back: a `[<key>]%<descriptor-bits>` key fragment, and a
//! `@<id>=<tagged>` / `#<id>` / `<tagged>` value fragment.

use crate::error::Error;

/// A parsed value fragment: either a pointer to an already-declared value, a
/// fresh declaration (with the still-unparsed tagged text to recurse into),
/// or a bare, never-referenced value.
pub enum ParsedValue<'a> {
    Pointer(u64),
    Declare(u64, &'a str),
    Bare(&'a str),
}

/// Parses a value fragment of the form `@<id>=<tagged>`, `#<id>`, or a bare
/// `<tagged>` expression.
pub fn parse_value_fragment(s: &str) -> Result<ParsedValue<'_>, Error> {
    if let Some(rest) = s.strip_prefix('@') {
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 || rest.as_bytes().get(digits_len) != Some(&b'=') {
            return Err(Error::DecodeGrammar(format!(
                "malformed declaration `{s}`, expected `@<id>=<value>`"
            )));
        }
        let id: u64 = rest[..digits_len]
            .parse()
            .map_err(|_| Error::DecodeGrammar(format!("declaration id `{s}` out of range")))?;
        return Ok(ParsedValue::Declare(id, &rest[digits_len + 1..]));
    }
    if let Some(rest) = s.strip_prefix('#') {
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 || digits_len != rest.len() {
            return Err(Error::DecodeGrammar(format!(
                "malformed pointer `{s}`, expected `#<id>` with nothing trailing"
            )));
        }
        let id: u64 = rest
            .parse()
            .map_err(|_| Error::DecodeGrammar(format!("pointer id `{s}` out of range")))?;
        return Ok(ParsedValue::Pointer(id));
    }
    Ok(ParsedValue::Bare(s))
}

/// Parses a key fragment of the form `[<key>]%<descriptor-bits>`, returning
/// the inner key text (still itself a value fragment) and the parsed
/// descriptor bits.
pub fn parse_key_fragment(s: &str) -> Result<(&str, u32), Error> {
    let inner = s
        .strip_prefix('[')
        .ok_or_else(|| Error::DecodeGrammar(format!("key fragment `{s}` must start with `[`")))?;

    let bytes = inner.as_bytes();
    let mut depth = 1i32;
    let mut close = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| Error::DecodeGrammar(format!("key fragment `{s}` has no closing `]`")))?;
    let key_text = &inner[..close];
    let after = &inner[close + 1..];

    let bits_text = after
        .strip_prefix('%')
        .ok_or_else(|| Error::DecodeGrammar(format!("key fragment `{s}` missing `%<descriptor-bits>` after `]`")))?;
    let bits: u32 = bits_text
        .parse()
        .map_err(|_| Error::DecodeGrammar(format!("descriptor bits `{bits_text}` in `{s}` are not a valid integer")))?;
    Ok((key_text, bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_value() {
        assert!(matches!(parse_value_fragment("2|1").unwrap(), ParsedValue::Bare("2|1")));
    }

    #[test]
    fn parses_declaration() {
        match parse_value_fragment("@3=2|1").unwrap() {
            ParsedValue::Declare(3, rest) => assert_eq!(rest, "2|1"),
            _ => panic!("expected declaration"),
        }
    }

    #[test]
    fn parses_pointer() {
        assert!(matches!(parse_value_fragment("#3").unwrap(), ParsedValue::Pointer(3)));
    }

    #[test]
    fn rejects_pointer_with_trailing_garbage() {
        assert!(parse_value_fragment("#3x").is_err());
    }

    #[test]
    fn parses_key_fragment() {
        let (key, bits) = parse_key_fragment("[1|name]%23").unwrap();
        assert_eq!(key, "1|name");
        assert_eq!(bits, 23);
    }

    #[test]
    fn key_fragment_handles_nested_brackets() {
        let (key, bits) = parse_key_fragment("[3|{[1|a]%7:2|1}]%5").unwrap();
        assert_eq!(key, "3|{[1|a]%7:2|1}");
        assert_eq!(bits, 5);
    }

    #[test]
    fn rejects_missing_descriptor_bits() {
        assert!(parse_key_fragment("[1|name]").is_err());
    }
}
