// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Byte-array and integer ingestion.
//!
//! Byte arrays are read in two compatible formats:
//!
//! 1. **Two's complement.** The top bit of the first value byte is a sign.
//!    Shorter arrays sign-extend: `[0xfe]` for IPv4 is `255.255.255.254`.
//!    Longer arrays are legal when the extra leading bytes are exactly the
//!    sign extension of the value (`0x00` runs for non-negatives, `0xff`
//!    runs for negatives).
//! 2. **Unsigned.** Any number of leading zero bytes is accepted; a value
//!    whose natural top bit is one needs one leading zero byte to be read
//!    as positive.
//!
//! Anything else fails with [`AddrError::ValueExceedsSize`] naming the byte
//! that could not be absorbed.

use crate::errors::AddrError;
use crate::family::Family;
use crate::section::{Section, Segs};
use crate::seg::{Seg, SegInt};

/// Builds the full-address segments of `family` from `bytes`.
pub(crate) fn segs_from_bytes(family: Family, bytes: &[u8]) -> Result<Segs, AddrError> {
    let expected = family.byte_count();
    let bits = family.bits_per_seg();
    let bytes_per_seg = family.bytes_per_seg();

    let mut start = 0usize;
    let mut missing = expected.saturating_sub(bytes.len());
    if bytes.len() > expected {
        let value_start = bytes.len() - expected;
        let extended = bytes[value_start - 1];
        if extended != 0 {
            let negative = bytes[value_start] >> 7 != 0;
            if !(negative && extended == 0xff) {
                return Err(AddrError::ValueExceedsSize {
                    family,
                    value: extended,
                    max_bytes: expected,
                });
            }
        }
        for &byte in &bytes[..value_start - 1] {
            if byte != extended {
                return Err(AddrError::ValueExceedsSize {
                    family,
                    value: byte,
                    max_bytes: expected,
                });
            }
        }
        start = value_start;
        missing = 0;
    }

    let fill: u8 = if missing > 0 && !bytes.is_empty() && bytes[start] >> 7 != 0 {
        0xff
    } else {
        0x00
    };

    let mut segs = Segs::new();
    let mut i = 0usize;
    for _ in 0..family.seg_count() {
        let mut value: u32 = 0;
        for _ in 0..bytes_per_seg {
            let byte = if i < missing {
                fill
            } else {
                bytes[start + i - missing]
            };
            value = value << 8 | u32::from(byte);
            i += 1;
        }
        #[allow(clippy::cast_possible_truncation)]
        segs.push(Seg::ranged(bits, value as SegInt, value as SegInt, None));
    }
    Ok(segs)
}

/// Builds full-address segments from per-index value functions: `lower`
/// supplies the low bound of each segment, `upper` (when present) the upper
/// bound. Without `upper` the section is single-valued.
pub(crate) fn segs_from_fns(
    family: Family,
    lower: impl Fn(usize) -> SegInt,
    upper: Option<&dyn Fn(usize) -> SegInt>,
) -> Result<Segs, AddrError> {
    let mut segs = Segs::new();
    for i in 0..family.seg_count() {
        let lo = lower(i);
        let up = upper.map_or(lo, |f| f(i));
        segs.push(Seg::new(family, lo, up, None)?);
    }
    Ok(segs)
}

/// Builds full-address segments from a big-endian integer.
pub(crate) fn segs_from_u128(family: Family, value: u128) -> Segs {
    let bits = family.bits_per_seg();
    let count = family.seg_count();
    let mut segs = Segs::new();
    for i in 0..count {
        let shift = (count - 1 - i) * usize::from(bits);
        #[allow(clippy::cast_possible_truncation)]
        let v = ((value >> shift) as u32 & ((1u32 << bits) - 1)) as SegInt;
        segs.push(Seg::ranged(bits, v, v, None));
    }
    segs
}

impl Section {
    /// A full-length section of `family` built from `bytes`, per the module
    /// ingestion rules, with `prefix` applied through prefix assignment.
    ///
    /// # Errors
    ///
    /// [`AddrError::ValueExceedsSize`] for bytes that are not legal sign
    /// extension, [`AddrError::PrefixLenOutOfRange`] for a bad prefix.
    pub fn from_bytes(
        family: Family,
        bytes: &[u8],
        prefix: Option<u16>,
    ) -> Result<Section, AddrError> {
        let segs = segs_from_bytes(family, bytes)?;
        Section::new(family, &segs, prefix, false)
    }
}
