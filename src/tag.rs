//! The shorthand native tags (0..12) plus the `$N` custom-class tag form.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/// A native shorthand type tag, as listed in the format's data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Tag {
    Null = 0,
    String = 1,
    Number = 2,
    Object = 3,
    Array = 4,
    Mapping = 5,
    Set = 6,
    Symbol = 7,
    Boolean = 8,
    Function = 9,
    Undefined = 10,
    BigInt = 11,
    Timestamp = 12,
}

impl Tag {
    /// Singleton types carry no payload at all (no `|`).
    #[must_use]
    pub fn is_singleton(self) -> bool {
        matches!(self, Tag::Null | Tag::Undefined)
    }

    /// Entried types serialize as a `{…}` block of `[key]%flags:value` entries.
    #[must_use]
    pub fn is_entried(self) -> bool {
        matches!(self, Tag::Object | Tag::Array | Tag::Mapping | Tag::Set)
    }
}

/// Either a native [`Tag`] or a custom-class tag `$N` indexing the
/// dependency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTag {
    Native(Tag),
    Custom(u32),
}

impl ParsedTag {
    #[must_use]
    pub fn is_singleton(self) -> bool {
        matches!(self, ParsedTag::Native(t) if t.is_singleton())
    }

    /// Custom-class instances are always entried.
    #[must_use]
    pub fn is_entried(self) -> bool {
        match self {
            ParsedTag::Native(t) => t.is_entried(),
            ParsedTag::Custom(_) => true,
        }
    }

    #[must_use]
    pub fn is_custom(self) -> bool {
        matches!(self, ParsedTag::Custom(_))
    }

    /// Parses a tag prefix (`"3"`, `"$2"`, …) from the start of `s`, along
    /// with the number of bytes it consumed.
    pub fn parse_prefix(s: &str) -> Result<(Self, usize), Error> {
        if let Some(rest) = s.strip_prefix('$') {
            let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits_len == 0 {
                return Err(Error::DecodeGrammar(format!(
                    "custom tag `${rest}` has no numeric id"
                )));
            }
            let id: u32 = rest[..digits_len].parse().map_err(|_| {
                Error::DecodeGrammar(format!("custom tag `${}` id out of range", &rest[..digits_len]))
            })?;
            return Ok((ParsedTag::Custom(id), 1 + digits_len));
        }
        let digits_len = s.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(Error::DecodeGrammar(
                "expected a type tag but found no digits".to_string(),
            ));
        }
        let raw: u32 = s[..digits_len]
            .parse()
            .map_err(|_| Error::DecodeGrammar(format!("type tag `{}` out of range", &s[..digits_len])))?;
        let tag = Tag::try_from_primitive(raw)
            .map_err(|_| Error::DecodeTypeUnknown(format!("unknown native tag `{raw}`")))?;
        Ok((ParsedTag::Native(tag), digits_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_native_tag() {
        let (tag, len) = ParsedTag::parse_prefix("3|{}").unwrap();
        assert_eq!(tag, ParsedTag::Native(Tag::Object));
        assert_eq!(len, 1);
    }

    #[test]
    fn parses_custom_tag() {
        let (tag, len) = ParsedTag::parse_prefix("$12|{}").unwrap();
        assert_eq!(tag, ParsedTag::Custom(12));
        assert_eq!(len, 3);
    }

    #[test]
    fn rejects_non_numeric_custom_id() {
        assert!(ParsedTag::parse_prefix("$x|{}").is_err());
    }

    #[test]
    fn rejects_unknown_native_tag() {
        assert!(matches!(
            ParsedTag::parse_prefix("99|x"),
            Err(Error::DecodeTypeUnknown(_))
        ));
    }

    #[test]
    fn singleton_and_entried_predicates() {
        assert!(Tag::Null.is_singleton());
        assert!(Tag::Undefined.is_singleton());
        assert!(!Tag::Object.is_singleton());
        assert!(Tag::Object.is_entried());
        assert!(Tag::Array.is_entried());
        assert!(!Tag::String.is_entried());
        assert!(ParsedTag::Custom(0).is_entried());
        assert!(ParsedTag::Custom(0).is_custom());
    }
}
