//! Parses the format's wire text (see [`crate::encoder`] for the grammar)
//! back into a [`Value`] graph.
//!
//! Entried values are bound into the reference table *before* their entries
//! are parsed, so a child entry that points back at an ancestor (a cycle)
//! resolves against the same, still-filling-in handle rather than failing
//! with an unbound-reference error.

use chrono::{TimeZone, Utc};

use crate::block::{self, ParsedValue};
use crate::config::{DebugCounters, DecoderConfig};
use crate::custom::{ConstructorEntry, DecodeCustomTable};
use crate::entries;
use crate::error::Error;
use crate::flags::{BitFlagSet, ObjectAccessibilityFlags, PropertyDescriptorFlags};
use crate::refs::DecodeRefTable;
use crate::tag::{ParsedTag, Tag};
use crate::value::{FunctionSource, PropertyEntry, PropertyKey, Value};

struct Decoder {
    config: DecoderConfig,
    refs: DecodeRefTable,
    customs: DecodeCustomTable,
    counters: DebugCounters,
}

/// Decodes `input` under `config`. `constructors` is the caller's registry
/// of custom classes it is willing to receive instances of; a dependency
/// prelude naming a class absent from this list is a [`Error::DecodeReference`].
pub fn decode(input: &str, constructors: &[ConstructorEntry], config: DecoderConfig) -> Result<Value, Error> {
    decode_with_counters(input, constructors, config).map(|(v, _)| v)
}

/// Same as [`decode`], but also returns the debug counters collected during
/// the decode (meaningful only when `config.debug_mode` is set).
pub fn decode_with_counters(
    input: &str,
    constructors: &[ConstructorEntry],
    config: DecoderConfig,
) -> Result<(Value, DebugCounters), Error> {
    let (customs, body) = parse_prelude(input, constructors)?;
    let mut dec = Decoder {
        config,
        refs: DecodeRefTable::default(),
        customs,
        counters: DebugCounters::default(),
    };
    let value = dec.decode_value(body)?;
    if config.debug_mode {
        tracing::debug!(entries_visited = dec.counters.entries_visited, "decode finished");
    }
    Ok((value, dec.counters))
}

/// A dependency-table prelude is unambiguous with a root value: a bare
/// custom-tagged value never appears un-declared at the very start of a
/// payload (it is always wrapped in `@id=`), so a leading `$` can only be
/// the start of a prelude.
fn parse_prelude<'a>(input: &'a str, constructors: &[ConstructorEntry]) -> Result<(DecodeCustomTable, &'a str), Error> {
    let Some(rest) = input.strip_prefix('$') else {
        return Ok((DecodeCustomTable::default(), input));
    };
    let bytes = rest.as_bytes();
    let mut depth = 0i32;
    let mut end = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth -= 1,
            b':' if depth == 0 => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }
    let end = end.ok_or_else(|| Error::DecodeGrammar("dependency table prelude has no terminating `:`".to_string()))?;
    let names: Vec<String> = rest[..end].split(',').map(crate::escape::unescape).collect();

    let mut seen = std::collections::HashSet::with_capacity(names.len());
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(Error::DecodeReference(format!(
                "dependency table declares `{name}` more than once"
            )));
        }
    }

    let customs = DecodeCustomTable::from_prelude(names, constructors)?;
    Ok((customs, &rest[end + 1..]))
}

impl Decoder {
    fn decode_value(&mut self, s: &str) -> Result<Value, Error> {
        match block::parse_value_fragment(s)? {
            ParsedValue::Pointer(id) => self.refs.get(id),
            ParsedValue::Bare(tagged) => self.decode_tagged(tagged, None),
            ParsedValue::Declare(id, tagged) => self.decode_tagged(tagged, Some(id)),
        }
    }

    fn decode_tagged(&mut self, tagged: &str, bind_id: Option<u64>) -> Result<Value, Error> {
        let (parsed_tag, consumed) = ParsedTag::parse_prefix(tagged)?;
        let rest = &tagged[consumed..];

        if parsed_tag.is_singleton() {
            let value = match parsed_tag {
                ParsedTag::Native(Tag::Null) => Value::Null,
                ParsedTag::Native(Tag::Undefined) => Value::Undefined,
                _ => unreachable!("is_singleton only holds for Null/Undefined"),
            };
            if let Some(id) = bind_id {
                self.refs.set(id, value.clone());
            }
            return Ok(value);
        }

        if parsed_tag.is_entried() {
            return self.decode_entried(parsed_tag, rest, bind_id);
        }

        let payload = rest
            .strip_prefix('|')
            .ok_or_else(|| Error::DecodeGrammar(format!("tagged value `{tagged}` is missing its `|` payload separator")))?;

        let value = match parsed_tag {
            ParsedTag::Native(Tag::Boolean) => match payload {
                "0" => Value::Bool(false),
                "1" => Value::Bool(true),
                other => return Err(Error::DecodeGrammar(format!("boolean payload `{other}` is not `0` or `1`"))),
            },
            ParsedTag::Native(Tag::Number) => {
                let n: f64 = payload
                    .parse()
                    .map_err(|_| Error::DecodeGrammar(format!("`{payload}` is not a valid number literal")))?;
                Value::Number(n)
            }
            ParsedTag::Native(Tag::BigInt) => {
                let b: num_bigint::BigInt = payload
                    .parse()
                    .map_err(|_| Error::DecodeGrammar(format!("`{payload}` is not a valid bigint literal")))?;
                Value::BigInt(b)
            }
            ParsedTag::Native(Tag::String) => Value::String(crate::escape::unescape(payload)),
            ParsedTag::Native(Tag::Symbol) => {
                let index: u32 = payload
                    .parse()
                    .map_err(|_| Error::DecodeGrammar(format!("symbol index `{payload}` is not a valid integer")))?;
                Value::Symbol(crate::symbol::WellKnownSymbol::from_index(index)?)
            }
            ParsedTag::Native(Tag::Timestamp) => {
                let millis: i64 = payload
                    .parse()
                    .map_err(|_| Error::DecodeGrammar(format!("timestamp `{payload}` is not a valid integer")))?;
                Value::Timestamp(
                    Utc.timestamp_millis_opt(millis)
                        .single()
                        .ok_or_else(|| Error::DecodeGrammar(format!("timestamp `{millis}` is out of range")))?,
                )
            }
            ParsedTag::Native(Tag::Function) => {
                if !self.config.functions {
                    return Err(Error::DecodePolicy(
                        "function values are disabled by this decoder's configuration".to_string(),
                    ));
                }
                let (name_part, source_part) = payload.split_once('~').ok_or_else(|| {
                    Error::DecodeGrammar(format!("function payload `{payload}` is missing the `~` separator"))
                })?;
                Value::Function(FunctionSource {
                    name: crate::escape::unescape(name_part),
                    source: crate::escape::unescape(source_part),
                })
            }
            ParsedTag::Native(Tag::Null | Tag::Undefined) => unreachable!("handled as singleton above"),
            ParsedTag::Native(Tag::Object | Tag::Array | Tag::Mapping | Tag::Set) | ParsedTag::Custom(_) => {
                unreachable!("handled as entried above")
            }
        };
        if let Some(id) = bind_id {
            self.refs.set(id, value.clone());
        }
        Ok(value)
    }

    fn decode_entried(&mut self, tag: ParsedTag, rest: &str, bind_id: Option<u64>) -> Result<Value, Error> {
        let rest = rest
            .strip_prefix('%')
            .ok_or_else(|| Error::DecodeGrammar(format!("entried value is missing its `%<accessibility>` prefix, found `{rest}`")))?;
        let bar = rest
            .find('|')
            .ok_or_else(|| Error::DecodeGrammar("entried value is missing its `|` body separator".to_string()))?;
        let acc_bits: u32 = rest[..bar]
            .parse()
            .map_err(|_| Error::DecodeGrammar(format!("accessibility bits `{}` are not a valid integer", &rest[..bar])))?;
        let body = rest[bar + 1..]
            .strip_prefix('{')
            .and_then(|b| b.strip_suffix('}'))
            .ok_or_else(|| Error::DecodeGrammar("entried value body is missing its `{...}` braces".to_string()))?;

        let accessibility = BitFlagSet::<ObjectAccessibilityFlags>::from_bits_checked(acc_bits)?.inner();
        if accessibility.contains(ObjectAccessibilityFlags::HAS_METADATA) && !self.config.metadata {
            return Err(Error::DecodePolicy(
                "entried value carries a metadata bit but this decoder's configuration disables metadata".to_string(),
            ));
        }

        let value = match tag {
            ParsedTag::Native(Tag::Object) => Value::object(),
            ParsedTag::Native(Tag::Array) => Value::array(),
            ParsedTag::Native(Tag::Mapping) => Value::mapping(),
            ParsedTag::Native(Tag::Set) => Value::set(),
            ParsedTag::Custom(id) => Value::custom(self.customs.class_name(id)?.to_string()),
            ParsedTag::Native(_) => unreachable!("only entried native tags reach decode_entried"),
        };
        set_accessibility(&value, accessibility);
        if let Some(id) = bind_id {
            self.refs.set(id, value.clone());
        }
        self.counters.entries_visited += 1;

        for fragment in entries::split_entries(body) {
            if fragment.is_empty() {
                continue;
            }
            self.decode_entry_into(&value, tag, fragment)?;
        }

        Ok(value)
    }

    fn decode_entry_into(&mut self, container: &Value, tag: ParsedTag, fragment: &str) -> Result<(), Error> {
        let (key_fragment, value_fragment) = entries::split_key_fragment(fragment)?;

        if matches!(tag, ParsedTag::Native(Tag::Array)) {
            let bits: u32 = key_fragment
                .strip_prefix('%')
                .ok_or_else(|| Error::DecodeGrammar(format!("array entry `{fragment}` is missing its `%<bits>` prefix")))?
                .parse()
                .map_err(|_| Error::DecodeGrammar(format!("array entry `{fragment}` has a malformed descriptor")))?;
            let descriptor = self.checked_descriptor(bits)?;
            let element = self.decode_value(value_fragment)?;
            let Value::Array(h) = container else { unreachable!() };
            h.borrow_mut().elements.push(PropertyEntry::new(element, descriptor));
            return Ok(());
        }

        let (key_text, bits) = block::parse_key_fragment(key_fragment)?;
        let descriptor = self.checked_descriptor(bits)?;

        match tag {
            ParsedTag::Native(Tag::Set) => {
                let element = self.decode_value(key_text)?;
                let Value::Set(h) = container else { unreachable!() };
                h.borrow_mut().elements.push(PropertyEntry::new(element, descriptor));
            }
            ParsedTag::Native(Tag::Mapping) => {
                let key = self.decode_value(key_text)?;
                let value = self.decode_value(value_fragment)?;
                let Value::Mapping(h) = container else { unreachable!() };
                h.borrow_mut().entries.push((key, PropertyEntry::new(value, descriptor)));
            }
            ParsedTag::Native(Tag::Object) | ParsedTag::Custom(_) => {
                let key_value = self.decode_value(key_text)?;
                let key = match key_value {
                    Value::String(s) => PropertyKey::String(s),
                    Value::Symbol(sym) => PropertyKey::Symbol(sym),
                    _ => return Err(Error::DecodeGrammar("an object/custom key must decode to a string or symbol".to_string())),
                };
                let value = self.decode_value(value_fragment)?;
                match container {
                    Value::Object(h) => h.borrow_mut().entries.push((key, PropertyEntry::new(value, descriptor))),
                    Value::Custom(h) => h.borrow_mut().entries.push((key, PropertyEntry::new(value, descriptor))),
                    _ => unreachable!(),
                }
            }
            ParsedTag::Native(Tag::Array) => unreachable!("handled above"),
            _ => unreachable!("only entried tags reach this function"),
        }
        Ok(())
    }

    fn checked_descriptor(&self, bits: u32) -> Result<PropertyDescriptorFlags, Error> {
        let descriptor = BitFlagSet::<PropertyDescriptorFlags>::from_bits_checked(bits)?.inner();
        if descriptor.contains(PropertyDescriptorFlags::HAS_ACCESSOR) {
            return Err(Error::DecodeGrammar(
                "property descriptor sets the accessor bit, which has no decodable payload".to_string(),
            ));
        }
        if descriptor.contains(PropertyDescriptorFlags::HAS_METADATA) && !self.config.metadata {
            return Err(Error::DecodePolicy(
                "property descriptor carries a metadata bit but this decoder's configuration disables metadata".to_string(),
            ));
        }
        Ok(descriptor)
    }
}

fn set_accessibility(value: &Value, accessibility: ObjectAccessibilityFlags) {
    match value {
        Value::Object(h) => h.borrow_mut().accessibility = accessibility,
        Value::Array(h) => h.borrow_mut().accessibility = accessibility,
        Value::Mapping(h) => h.borrow_mut().accessibility = accessibility,
        Value::Set(h) => h.borrow_mut().accessibility = accessibility,
        Value::Custom(h) => h.borrow_mut().accessibility = accessibility,
        _ => unreachable!("only entried values reach set_accessibility"),
    }
}
