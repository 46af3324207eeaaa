//! The two packed 32-bit flag sets carried by the format, plus a small
//! generic wrapper that performs the construction-time validation described
//! for the original dynamic bitflag container: every named flag must be a
//! positive power of two, and the packed value must fit a 32-bit signed
//! integer.

use bitflags::bitflags;

use crate::error::{BitflagError, Error};

bitflags! {
    /// Per-property metadata carried by every entry in an entried value.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct PropertyDescriptorFlags: u32 {
        /// The property is backed by an accessor (`get`/`set`) rather than a
        /// plain value. Reserved: encode refuses values that set this bit.
        const HAS_ACCESSOR = 1 << 0;
        /// The property carries reflect-metadata-style metadata. Reserved:
        /// encode refuses, decode rejects blocks that set this bit.
        const HAS_METADATA = 1 << 1;
        /// The property may be deleted or have its descriptor changed.
        const CONFIGURABLE = 1 << 2;
        /// The property appears during `for..in`-style own-key enumeration.
        const ENUMERABLE = 1 << 3;
        /// The property's value may be reassigned.
        const WRITABLE = 1 << 4;
    }
}

bitflags! {
    /// Per-object accessibility, applied once all of an entried value's
    /// entries have been filled during decode.
    ///
    /// This uses a clean single-bit-per-flag layout (`1<<0 .. 1<<3`). The
    /// original source's `ObjectAccessibilityFlag` enum had `IS_SEALED = 2`
    /// and `NON_EXTENSIBLE = 4` overlapping what a clean `1<<n` layout would
    /// assign; that overlap is not reproduced here (see DESIGN.md).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ObjectAccessibilityFlags: u32 {
        /// No further changes to any property descriptor, and no property
        /// values may be reassigned. Implies `SEALED` at the host level.
        const FROZEN = 1 << 0;
        /// No properties may be added or removed.
        const SEALED = 1 << 1;
        /// No new properties may be added, but existing ones may change.
        const NON_EXTENSIBLE = 1 << 2;
        /// The object carries reflect-metadata-style metadata. Reserved:
        /// encode refuses, decode rejects blocks that set this bit.
        const HAS_METADATA = 1 << 3;
    }
}

/// Validates that every named flag of `F` is a positive power of two fitting
/// the 32-bit signed range, matching the construction-time checks the
/// original dynamic bitflag container performed against its enum descriptor.
///
/// Warns (via `tracing::warn!`) once seven or more flags are declared, and
/// again at eight or more, mirroring the original's two-tier warning.
pub fn validate_flag_layout<F>() -> Result<(), Error>
where
    F: bitflags::Flags<Bits = u32>,
{
    let mut count = 0usize;
    for flag in F::FLAGS {
        count += 1;
        let bits = flag.value().bits();
        if bits == 0 {
            return Err(BitflagError::ZeroValue.into());
        }
        if bits > i32::MAX as u32 {
            return Err(BitflagError::PrecisionLoss.into());
        }
        if bits & (bits - 1) != 0 {
            return Err(BitflagError::NonPowerOfTwo.into());
        }
    }
    if count >= 8 {
        tracing::warn!(count, "bitflag set declares a large number of flags (>= 8)");
    } else if count >= 7 {
        tracing::warn!(count, "bitflag set declares a large number of flags (>= 7)");
    }
    Ok(())
}

/// A validated, packed 32-bit flag set.
///
/// This is a thin wrapper over the `bitflags`-generated types
/// ([`PropertyDescriptorFlags`], [`ObjectAccessibilityFlags`]) that performs
/// the same fatal validation the original dynamic container performed, so
/// the contract from the format's design is enforced once, generically,
/// rather than being re-implemented per concrete flag type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitFlagSet<F> {
    inner: F,
}

impl<F> BitFlagSet<F>
where
    F: bitflags::Flags<Bits = u32> + Copy,
{
    /// Builds a flag set from an already-typed `bitflags` value. Still runs
    /// layout validation over `F`'s declared flags.
    pub fn new(inner: F) -> Result<Self, Error> {
        validate_flag_layout::<F>()?;
        Ok(Self { inner })
    }

    /// Builds a flag set from a raw packed integer, truncating any bits that
    /// do not correspond to a named flag. Fails if the raw value does not
    /// fit a 32-bit signed integer.
    pub fn from_bits_checked(raw: u32) -> Result<Self, Error> {
        if raw > i32::MAX as u32 {
            return Err(BitflagError::PrecisionLoss.into());
        }
        validate_flag_layout::<F>()?;
        Ok(Self {
            inner: F::from_bits_truncate(raw),
        })
    }

    /// Returns the empty flag set (still validates `F`'s layout).
    pub fn empty() -> Result<Self, Error> {
        Self::from_bits_checked(0)
    }

    /// True if every flag in `flags` is set.
    #[must_use]
    pub fn has(&self, flags: F) -> bool {
        self.inner.contains(flags)
    }

    /// Sets every flag in `flags`.
    pub fn enable(&mut self, flags: F) {
        self.inner.insert(flags);
    }

    /// Clears every flag in `flags`.
    pub fn disable(&mut self, flags: F) {
        self.inner.remove(flags);
    }

    /// Flips every flag in `flags`.
    pub fn toggle(&mut self, flags: F) {
        self.inner.toggle(flags);
    }

    /// The underlying `bitflags` value.
    #[must_use]
    pub fn inner(&self) -> F {
        self.inner
    }

    /// The packed integer view.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.inner.bits()
    }
}
