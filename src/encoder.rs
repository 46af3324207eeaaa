//! Serializes a [`Value`] graph into the format's textual wire syntax.
//!
//! Wire grammar (summarized; see SPEC_FULL.md §4 for the full grammar):
//!
//! ```text
//! payload    := prelude? value
//! prelude    := "$" className ("," className)* ":"
//! value      := "@" id "=" tagged | "#" id | tagged
//! tagged     := singletonTag | nativeTag "|" payload-body | "$" id "|" payload-body
//! payload-body (Null/Undefined) := (nothing)
//! payload-body (entried)        := accessBits "|{" entry ("," entry)* "}"
//! entry (Object/Custom/Mapping) := "[" value "]%" descriptorBits ":" value
//! entry (Array)                 := "%" descriptorBits ":" value
//! entry (Set)                   := "[" value "]%" descriptorBits ":" "#" id
//! ```

use std::cell::Ref;

use crate::config::{DebugCounters, EncoderConfig};
use crate::custom::EncodeCustomTable;
use crate::error::Error;
use crate::refs::{EncodeRefTable, Mark};
use crate::value::{ArrayData, CustomData, MappingData, ObjectData, PropertyKey, SetData, Value};

pub struct Encoder {
    config: EncoderConfig,
    refs: EncodeRefTable,
    customs: EncodeCustomTable,
    counters: DebugCounters,
}

/// Encodes `root` under `config`, returning the cleaned, minimal wire text.
pub fn encode(root: &Value, config: EncoderConfig) -> Result<String, Error> {
    let mut enc = Encoder {
        config,
        refs: EncodeRefTable::default(),
        customs: EncodeCustomTable::default(),
        counters: DebugCounters::default(),
    };
    let body = enc.encode_marked(root)?;
    let raw = prepend_dependency_prelude(&enc.customs, body);
    let cleaned = crate::refs::clean(&raw);
    if config.debug_mode {
        tracing::debug!(
            declarations = enc.counters.declarations,
            duplicate_references = enc.counters.duplicate_references,
            "encode finished"
        );
    }
    Ok(cleaned)
}

/// Prepends the `$name1,name2,…:` dependency prelude (escaped per-name, so a
/// class name that itself contains a reserved character stays unambiguous
/// with the grammar's own `,`/`:` separators), or returns `body` unchanged
/// if no custom classes were encoded.
fn prepend_dependency_prelude(customs: &EncodeCustomTable, body: String) -> String {
    match customs.ordered_class_names() {
        [] => body,
        names => {
            let escaped: Vec<String> = names.iter().map(|n| crate::escape::escape(n)).collect();
            format!("${}:{}", escaped.join(","), body)
        }
    }
}

/// Same as [`encode`], but also returns the debug counters collected during
/// the encode (meaningful only when `config.debug_mode` is set).
pub fn encode_with_counters(root: &Value, config: EncoderConfig) -> Result<(String, DebugCounters), Error> {
    let mut enc = Encoder {
        config,
        refs: EncodeRefTable::default(),
        customs: EncodeCustomTable::default(),
        counters: DebugCounters::default(),
    };
    let body = enc.encode_marked(root)?;
    let raw = prepend_dependency_prelude(&enc.customs, body);
    let cleaned = crate::refs::clean(&raw);
    Ok((cleaned, enc.counters))
}

impl Encoder {
    fn encode_marked(&mut self, value: &Value) -> Result<String, Error> {
        match self.refs.mark(value) {
            Mark::Bare => self.encode_tagged(value),
            Mark::FreshDeclaration(id) => {
                self.counters.declarations += 1;
                let tagged = self.encode_tagged(value)?;
                Ok(format!("@{id}={tagged}"))
            }
            Mark::Pointer(id) => {
                self.counters.duplicate_references += 1;
                Ok(format!("#{id}"))
            }
        }
    }

    /// Like [`Self::encode_marked`], but for a Set element: the element is
    /// encoded once (producing its own declaration/pointer/bare form for the
    /// key slot), then the *same* id is reused as a forced pointer for the
    /// value slot, so sets never need a bespoke grammar.
    fn encode_set_entry(&mut self, element: &Value) -> Result<(String, String), Error> {
        let key_frag = self.encode_marked(element)?;
        let value_frag = match self.refs.mark(element) {
            Mark::Pointer(id) => format!("#{id}"),
            Mark::Bare => key_frag.clone(),
            Mark::FreshDeclaration(_) => unreachable!("element was already marked by encode_marked above"),
        };
        Ok((key_frag, value_frag))
    }

    fn encode_tagged(&mut self, value: &Value) -> Result<String, Error> {
        match value {
            Value::Null => Ok("0".to_string()),
            Value::Undefined => Ok("10".to_string()),
            Value::Bool(b) => Ok(format!("8|{}", u8::from(*b))),
            Value::Number(n) => Ok(format!("2|{n}")),
            Value::BigInt(b) => Ok(format!("11|{b}")),
            Value::String(s) => Ok(format!("1|{}", crate::escape::escape(s))),
            Value::Symbol(s) => Ok(format!("7|{}", s.index())),
            Value::Timestamp(t) => Ok(format!("12|{}", t.timestamp_millis())),
            Value::Function(f) => {
                if !self.config.functions {
                    return Err(Error::EncodeTypeUnsupported(
                        "function values are disabled by this encoder's configuration".to_string(),
                    ));
                }
                Ok(format!(
                    "9|{}~{}",
                    crate::escape::escape(&f.name),
                    crate::escape::escape(&f.source)
                ))
            }
            Value::Object(h) => self.encode_object(&h.borrow()),
            Value::Array(h) => self.encode_array(&h.borrow()),
            Value::Mapping(h) => self.encode_mapping(&h.borrow()),
            Value::Set(h) => self.encode_set(&h.borrow()),
            Value::Custom(h) => self.encode_custom(&h.borrow()),
        }
    }

    fn check_metadata(&self, has_metadata: bool) -> Result<(), Error> {
        if has_metadata && !self.config.metadata {
            return Err(Error::EncodeTypeUnsupported(
                "metadata bit is set but this encoder's configuration disables metadata".to_string(),
            ));
        }
        Ok(())
    }

    /// Accessor properties have no value to read, and metadata is gated by
    /// config; both are unimplemented and rejected outright when requested
    /// on a property descriptor (see SPEC_FULL.md's resolved open question).
    fn check_descriptor(&self, descriptor: crate::flags::PropertyDescriptorFlags) -> Result<(), Error> {
        use crate::flags::PropertyDescriptorFlags as D;
        if descriptor.contains(D::HAS_ACCESSOR) {
            return Err(Error::EncodeTypeUnsupported(
                "accessor (get/set) properties have no value to encode".to_string(),
            ));
        }
        self.check_metadata(descriptor.contains(D::HAS_METADATA))
    }

    fn encode_object(&mut self, data: &Ref<'_, ObjectData>) -> Result<String, Error> {
        use crate::flags::ObjectAccessibilityFlags as A;
        self.check_metadata(data.accessibility.contains(A::HAS_METADATA))?;
        let mut parts = Vec::with_capacity(data.entries.len());
        for (key, entry) in &data.entries {
            self.check_descriptor(entry.descriptor)?;
            let key_value = match key {
                PropertyKey::String(s) => Value::String(s.clone()),
                PropertyKey::Symbol(sym) => Value::Symbol(*sym),
            };
            let key_frag = self.encode_marked(&key_value)?;
            let value_frag = self.encode_marked(&entry.value)?;
            parts.push(format!("[{key_frag}]%{}:{value_frag}", entry.descriptor.bits()));
        }
        Ok(format!("3%{}|{{{}}}", data.accessibility.bits(), parts.join(",")))
    }

    fn encode_array(&mut self, data: &Ref<'_, ArrayData>) -> Result<String, Error> {
        use crate::flags::ObjectAccessibilityFlags as A;
        self.check_metadata(data.accessibility.contains(A::HAS_METADATA))?;
        let mut parts = Vec::with_capacity(data.elements.len());
        for entry in &data.elements {
            self.check_descriptor(entry.descriptor)?;
            let value_frag = self.encode_marked(&entry.value)?;
            parts.push(format!("%{}:{value_frag}", entry.descriptor.bits()));
        }
        Ok(format!("4%{}|{{{}}}", data.accessibility.bits(), parts.join(",")))
    }

    fn encode_mapping(&mut self, data: &Ref<'_, MappingData>) -> Result<String, Error> {
        use crate::flags::ObjectAccessibilityFlags as A;
        self.check_metadata(data.accessibility.contains(A::HAS_METADATA))?;
        let mut parts = Vec::with_capacity(data.entries.len());
        for (key, entry) in &data.entries {
            self.check_descriptor(entry.descriptor)?;
            let key_frag = self.encode_marked(key)?;
            let value_frag = self.encode_marked(&entry.value)?;
            parts.push(format!("[{key_frag}]%{}:{value_frag}", entry.descriptor.bits()));
        }
        Ok(format!("5%{}|{{{}}}", data.accessibility.bits(), parts.join(",")))
    }

    fn encode_set(&mut self, data: &Ref<'_, SetData>) -> Result<String, Error> {
        use crate::flags::ObjectAccessibilityFlags as A;
        self.check_metadata(data.accessibility.contains(A::HAS_METADATA))?;
        let mut parts = Vec::with_capacity(data.elements.len());
        for entry in &data.elements {
            self.check_descriptor(entry.descriptor)?;
            let (key_frag, value_frag) = self.encode_set_entry(&entry.value)?;
            parts.push(format!("[{key_frag}]%{}:{value_frag}", entry.descriptor.bits()));
        }
        Ok(format!("6%{}|{{{}}}", data.accessibility.bits(), parts.join(",")))
    }

    fn encode_custom(&mut self, data: &Ref<'_, CustomData>) -> Result<String, Error> {
        use crate::flags::ObjectAccessibilityFlags as A;
        self.check_metadata(data.accessibility.contains(A::HAS_METADATA))?;
        let id = self.customs.intern(&data.class_name);
        let mut parts = Vec::with_capacity(data.entries.len());
        for (key, entry) in &data.entries {
            self.check_descriptor(entry.descriptor)?;
            let key_value = match key {
                PropertyKey::String(s) => Value::String(s.clone()),
                PropertyKey::Symbol(sym) => Value::Symbol(*sym),
            };
            let key_frag = self.encode_marked(&key_value)?;
            let value_frag = self.encode_marked(&entry.value)?;
            parts.push(format!("[{key_frag}]%{}:{value_frag}", entry.descriptor.bits()));
        }
        Ok(format!("${id}%{}|{{{}}}", data.accessibility.bits(), parts.join(",")))
    }
}
