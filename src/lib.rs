//! Serime: a textual serialization format for dynamic object graphs that
//! preserves sharing and cycles, descriptor metadata, and accessibility
//! state across a round trip.
//!
//! See `SPEC_FULL.md` in the repository root for the full format grammar
//! and design notes.

pub mod block;
pub mod compare;
pub mod config;
pub mod custom;
pub mod decoder;
pub mod encoder;
pub mod entries;
pub mod error;
pub mod escape;
pub mod flags;
pub mod refs;
pub mod symbol;
pub mod tag;
pub mod value;

pub use self::compare::deep_equal;
pub use self::config::{DebugCounters, DecoderConfig, EncoderConfig};
pub use self::custom::ConstructorEntry;
pub use self::decoder::{decode, decode_with_counters};
pub use self::encoder::{encode, encode_with_counters};
pub use self::error::Error;
pub use self::value::{
    ArrayData, CustomData, FunctionSource, Handle, MappingData, ObjectData, PropertyEntry, PropertyKey, SetData, Value,
};
