use std::{error, fmt};

/// Failures produced while validating a [`crate::flags::BitFlagSet`] layout or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitflagError {
    /// The raw integer does not fit in the 32-bit signed range the format allows.
    PrecisionLoss,
    /// A flag (or raw value) was negative.
    NegativeValue,
    /// A flag's declared value was zero.
    ZeroValue,
    /// A flag's declared value was not a power of two.
    NonPowerOfTwo,
}

impl fmt::Display for BitflagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PrecisionLoss => "bitflag value does not fit in a 32-bit signed integer",
            Self::NegativeValue => "bitflag value is negative",
            Self::ZeroValue => "bitflag value is zero",
            Self::NonPowerOfTwo => "bitflag value is not a power of two",
        })
    }
}

impl error::Error for BitflagError {}

/// The taxonomy of fatal errors this crate's encode/decode paths can produce.
///
/// Every public fallible function returns `Result<_, Error>`; no host-specific
/// error type crosses the API boundary.
#[derive(Debug, Clone)]
pub enum Error {
    /// Non-well-known symbol, native-source function, or a feature disabled
    /// in the active [`crate::config::EncoderConfig`].
    EncodeTypeUnsupported(String),
    /// A property descriptor was requested for a property that does not exist.
    EncodePropertyMissing(String),
    /// Malformed brackets, unbalanced dependency list, bad reference digits,
    /// missing type separator, or a missing required descriptor flag.
    DecodeGrammar(String),
    /// Lookup of an unbound reference id, a duplicate dependency name, or a
    /// dependency name with no matching caller-supplied constructor.
    DecodeReference(String),
    /// An unknown native tag, or a `$N` tag with no registered dependency.
    DecodeTypeUnknown(String),
    /// A feature was used during decode that the active
    /// [`crate::config::DecoderConfig`] does not permit.
    DecodePolicy(String),
    /// A [`crate::flags::BitFlagSet`] failed its construction-time validation.
    BitflagInvalid(BitflagError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncodeTypeUnsupported(msg) => write!(f, "unsupported type for encoding: {msg}"),
            Self::EncodePropertyMissing(msg) => write!(f, "missing property: {msg}"),
            Self::DecodeGrammar(msg) => write!(f, "malformed input: {msg}"),
            Self::DecodeReference(msg) => write!(f, "bad reference: {msg}"),
            Self::DecodeTypeUnknown(msg) => write!(f, "unknown type: {msg}"),
            Self::DecodePolicy(msg) => write!(f, "policy violation: {msg}"),
            Self::BitflagInvalid(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {}

impl From<BitflagError> for Error {
    fn from(err: BitflagError) -> Self {
        Self::BitflagInvalid(err)
    }
}
