// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Error kinds surfaced at the API boundary.
//!
//! Constructors enforce the internal invariants, so every error here reflects
//! a caller mistake or an operation whose result is not expressible in the
//! data model. Nothing falls back silently: the call that triggered the
//! problem reports it.

use crate::family::Family;

/// Errors produced by address construction and address arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrError {
    /// A binary operation received operands of incompatible segment counts.
    #[error("{family} operands have mismatched segment counts: {left} vs {right}")]
    SizeMismatch {
        /// Family of the left operand.
        family: Family,
        /// Segment count of the left operand.
        left: usize,
        /// Segment count of the right operand.
        right: usize,
    },
    /// A prefix length lies outside `[0, bit_count]` for the family.
    #[error("{family} prefix length {len} exceeds {max} bits")]
    PrefixLenOutOfRange {
        /// Family the prefix was applied to.
        family: Family,
        /// The rejected prefix length.
        len: u16,
        /// Largest permitted prefix length.
        max: u8,
    },
    /// An input byte array implies a value wider than the family allows.
    #[error("{family} value exceeds the {max_bytes}-byte address size (offending byte {value:#04x})")]
    ValueExceedsSize {
        /// Family the bytes were read for.
        family: Family,
        /// The byte that could not be absorbed as sign extension.
        value: u8,
        /// Byte count of a full address of the family.
        max_bytes: usize,
    },
    /// Applying a mask to a ranged segment would not produce a contiguous range.
    #[error("{family} mask produces a discontiguous range at segment {segment}")]
    MaskRangeIncompatible {
        /// Family of the masked section.
        family: Family,
        /// Index of the segment whose masked values tear.
        segment: usize,
    },
    /// A bit or byte reversal cannot be expressed as a segment range.
    #[error("{family} segment {segment} range cannot be reversed")]
    ReverseRangeIncompatible {
        /// Family of the reversed section.
        family: Family,
        /// Index of the irreversible segment.
        segment: usize,
    },
    /// Joining two segments into a wider one would not produce a contiguous range.
    #[error("{family} segment {segment} range cannot be joined into a wider segment")]
    JoinRangeIncompatible {
        /// Family of the joined segments.
        family: Family,
        /// Index of the high-half segment that blocks the join.
        segment: usize,
    },
    /// A constructor received a segment count or segment value outside the family.
    #[error("invalid {family} address value: {reason}")]
    AddressValueInvalid {
        /// Family being constructed.
        family: Family,
        /// What was wrong with the input.
        reason: String,
    },
}

impl AddrError {
    pub(crate) fn invalid(family: Family, reason: impl Into<String>) -> Self {
        AddrError::AddressValueInvalid {
            family,
            reason: reason.into(),
        }
    }
}
