//! The dynamic value universe this crate serializes, and the owned graph
//! types that stand in for the "host object model" the format's design
//! treats as an external collaborator (see SPEC_FULL.md §1a).
//!
//! Entried values (object, array, mapping, set, custom instances) are kept
//! behind an [`std::rc::Rc`]`<`[`std::cell::RefCell`]`<_>>` handle so that
//! sharing and cycles can be represented directly: two [`Value`]s that clone
//! the same handle are, by construction, the same object.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use num_bigint::BigInt;

use crate::flags::{ObjectAccessibilityFlags, PropertyDescriptorFlags};
use crate::symbol::WellKnownSymbol;

/// A shared, mutable handle to an entried value's backing data.
pub type Handle<T> = Rc<RefCell<T>>;

/// A property or element value together with its descriptor flags.
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    pub value: Value,
    pub descriptor: PropertyDescriptorFlags,
}

impl PropertyEntry {
    #[must_use]
    pub fn new(value: Value, descriptor: PropertyDescriptorFlags) -> Self {
        Self { value, descriptor }
    }
}

/// A property key: either a plain string or one of the well-known symbols
/// (see the crate's Open Question resolution — non-well-known symbol keys
/// are not representable here).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(String),
    Symbol(WellKnownSymbol),
}

/// Source text recovered for (or supplied to) a tag-9 function value. This
/// crate never evaluates `source`; see SPEC_FULL.md §4.9a.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Default)]
pub struct ObjectData {
    pub entries: Vec<(PropertyKey, PropertyEntry)>,
    pub accessibility: ObjectAccessibilityFlags,
}

#[derive(Debug, Default)]
pub struct ArrayData {
    pub elements: Vec<PropertyEntry>,
    pub accessibility: ObjectAccessibilityFlags,
}

#[derive(Debug, Default)]
pub struct MappingData {
    pub entries: Vec<(Value, PropertyEntry)>,
    pub accessibility: ObjectAccessibilityFlags,
}

#[derive(Debug, Default)]
pub struct SetData {
    pub elements: Vec<PropertyEntry>,
    pub accessibility: ObjectAccessibilityFlags,
}

#[derive(Debug)]
pub struct CustomData {
    pub class_name: String,
    pub entries: Vec<(PropertyKey, PropertyEntry)>,
    pub accessibility: ObjectAccessibilityFlags,
}

impl CustomData {
    #[must_use]
    pub fn new(class_name: String) -> Self {
        Self {
            class_name,
            entries: Vec::new(),
            accessibility: ObjectAccessibilityFlags::empty(),
        }
    }
}

/// The dynamic value universe, tagged per the format's data model (see
/// [`crate::tag::Tag`]).
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    Symbol(WellKnownSymbol),
    Timestamp(DateTime<Utc>),
    Function(FunctionSource),
    Object(Handle<ObjectData>),
    Array(Handle<ArrayData>),
    Mapping(Handle<MappingData>),
    Set(Handle<SetData>),
    Custom(Handle<CustomData>),
}

impl Value {
    #[must_use]
    pub fn object() -> Self {
        Value::Object(Rc::new(RefCell::new(ObjectData::default())))
    }

    #[must_use]
    pub fn array() -> Self {
        Value::Array(Rc::new(RefCell::new(ArrayData::default())))
    }

    #[must_use]
    pub fn mapping() -> Self {
        Value::Mapping(Rc::new(RefCell::new(MappingData::default())))
    }

    #[must_use]
    pub fn set() -> Self {
        Value::Set(Rc::new(RefCell::new(SetData::default())))
    }

    #[must_use]
    pub fn custom(class_name: impl Into<String>) -> Self {
        Value::Custom(Rc::new(RefCell::new(CustomData::new(class_name.into()))))
    }

    /// The raw address backing an entried/custom handle, used as an identity
    /// key for reference interning. `None` for everything else.
    #[must_use]
    pub fn handle_identity(&self) -> Option<usize> {
        match self {
            Value::Object(h) => Some(Rc::as_ptr(h) as *const () as usize),
            Value::Array(h) => Some(Rc::as_ptr(h) as *const () as usize),
            Value::Mapping(h) => Some(Rc::as_ptr(h) as *const () as usize),
            Value::Set(h) => Some(Rc::as_ptr(h) as *const () as usize),
            Value::Custom(h) => Some(Rc::as_ptr(h) as *const () as usize),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_singleton(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    #[must_use]
    pub fn is_entried(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Array(_) | Value::Mapping(_) | Value::Set(_) | Value::Custom(_)
        )
    }

    /// True for the number zero of either sign — the one non-singleton value
    /// this format's reference manager refuses to intern, since `+0` and
    /// `-0` must stay distinguishable after round-trip.
    #[must_use]
    pub fn is_signed_zero(&self) -> bool {
        matches!(self, Value::Number(n) if *n == 0.0)
    }
}
