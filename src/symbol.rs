//! The ordered table of well-known named symbols a tag-7 value may index into.
//!
//! Only symbols in this table are portable (see the crate's Non-goals);
//! encoding any other symbol is an [`Error::EncodeTypeUnsupported`].

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/// A well-known symbol, indexed by its position in this enum (which is also
/// its tag-7 wire index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum WellKnownSymbol {
    Iterator = 0,
    AsyncIterator = 1,
    HasInstance = 2,
    IsConcatSpreadable = 3,
    Match = 4,
    Replace = 5,
    Search = 6,
    Species = 7,
    Split = 8,
    ToPrimitive = 9,
    ToStringTag = 10,
    Unscopables = 11,
}

impl WellKnownSymbol {
    /// The wire index for this symbol (its tag-7 payload digits).
    #[must_use]
    pub fn index(self) -> u32 {
        self.into()
    }

    /// Looks up a symbol by its wire index.
    pub fn from_index(index: u32) -> Result<Self, Error> {
        Self::try_from_primitive(index)
            .map_err(|_| Error::DecodeTypeUnknown(format!("no well-known symbol at index {index}")))
    }

    /// The `Symbol.<name>`-style description, used only for diagnostics.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Iterator => "Symbol.iterator",
            Self::AsyncIterator => "Symbol.asyncIterator",
            Self::HasInstance => "Symbol.hasInstance",
            Self::IsConcatSpreadable => "Symbol.isConcatSpreadable",
            Self::Match => "Symbol.match",
            Self::Replace => "Symbol.replace",
            Self::Search => "Symbol.search",
            Self::Species => "Symbol.species",
            Self::Split => "Symbol.split",
            Self::ToPrimitive => "Symbol.toPrimitive",
            Self::ToStringTag => "Symbol.toStringTag",
            Self::Unscopables => "Symbol.unscopables",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        for i in 0..=11u32 {
            let sym = WellKnownSymbol::from_index(i).unwrap();
            assert_eq!(sym.index(), i);
        }
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert!(WellKnownSymbol::from_index(999).is_err());
    }
}
