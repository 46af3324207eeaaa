//! The dependency table: the ordered list of custom class names a
//! serialized payload's `$N` tags index into.
//!
//! A custom class name is registered at most once, the first time an
//! instance of it is encoded; later instances of the same class reuse its
//! `$N` id. This mirrors how the format treats the native tag set as fixed
//! and addresses everything else through this side table, the same way the
//! reference manager addresses repeated values through `@`/`#` ids rather
//! than repeating their payload.

use std::collections::HashMap;

use crate::error::Error;

/// Encoder-side class-name → `$N` id table.
#[derive(Default)]
pub struct EncodeCustomTable {
    ids: HashMap<String, u32>,
    order: Vec<String>,
}

impl EncodeCustomTable {
    /// Returns the `$N` id for `class_name`, registering it if this is the
    /// first instance of that class seen so far.
    pub fn intern(&mut self, class_name: &str) -> u32 {
        if let Some(&id) = self.ids.get(class_name) {
            return id;
        }
        let id = self.order.len() as u32;
        self.order.push(class_name.to_string());
        self.ids.insert(class_name.to_string(), id);
        id
    }

    /// The dependency table in `$N` order, ready to be emitted as the
    /// payload's prelude.
    #[must_use]
    pub fn ordered_class_names(&self) -> &[String] {
        &self.order
    }
}

/// One caller-supplied custom constructor, injected by name for decode to
/// resolve the dependency prelude against. Decoding never invokes a real
/// constructor function (see SPEC_FULL.md §9) — registering a name here is
/// purely a statement "I know this class and am willing to receive
/// instances of it"; the instance itself is always an empty, name-tagged
/// [`crate::value::CustomData`] that the decoded entries then populate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorEntry {
    pub name: String,
}

impl ConstructorEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Decoder-side `$N` id → class-name table, built once from a payload's
/// parsed prelude after every declared name has been resolved against the
/// caller-supplied constructor registry.
#[derive(Default)]
pub struct DecodeCustomTable {
    by_id: Vec<String>,
}

impl DecodeCustomTable {
    /// Builds the table from the prelude's ordered, already-deduplicated
    /// name list, failing if any name has no matching entry in `registry`.
    pub fn from_prelude(names: Vec<String>, registry: &[ConstructorEntry]) -> Result<Self, Error> {
        for name in &names {
            if !registry.iter().any(|entry| &entry.name == name) {
                return Err(Error::DecodeReference(format!(
                    "dependency `{name}` was not supplied in the caller's constructor list"
                )));
            }
        }
        Ok(Self { by_id: names })
    }

    #[must_use]
    pub fn from_ordered_class_names(names: Vec<String>) -> Self {
        Self { by_id: names }
    }

    pub fn class_name(&self, id: u32) -> Result<&str, Error> {
        self.by_id
            .get(id as usize)
            .map(String::as_str)
            .ok_or_else(|| Error::DecodeReference(format!("dependency table has no entry `${id}`")))
    }
}
