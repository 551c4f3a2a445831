// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Masking and bitwise-or over sections.
//!
//! Each segment is masked independently through the range maskers; a mask
//! that would tear any segment's range into a discontiguous set fails with
//! the index of the offending segment. A ranged mask contributes only its
//! lowest value.

use tracing::trace;

use super::{Section, Segs, prefix};
use crate::errors::AddrError;
use crate::masker;
use crate::seg::SegInt;

#[derive(Clone, Copy)]
enum Op {
    And,
    Or,
}

impl Section {
    /// Masks every segment of this section with the corresponding segment of
    /// `mask`.
    ///
    /// With `retain_prefix` the section's prefix length survives and the
    /// result is re-normalized through prefix assignment (it may or may not
    /// remain a prefix block); otherwise the result carries no prefix.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] when `mask` has fewer segments than this
    /// section, and [`AddrError::MaskRangeIncompatible`] when a masked
    /// segment range is not contiguous.
    pub fn mask(&self, mask: &Section, retain_prefix: bool) -> Result<Section, AddrError> {
        self.apply(mask, retain_prefix, Op::And)
    }

    /// Bitwise-ors every segment of this section with the corresponding
    /// segment of `mask`. Mirror of [`Section::mask`].
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] and [`AddrError::MaskRangeIncompatible`],
    /// as for [`Section::mask`].
    pub fn bitwise_or(&self, mask: &Section, retain_prefix: bool) -> Result<Section, AddrError> {
        self.apply(mask, retain_prefix, Op::Or)
    }

    fn apply(&self, mask: &Section, retain_prefix: bool, op: Op) -> Result<Section, AddrError> {
        if mask.family() != self.family() || mask.seg_count() < self.seg_count() {
            return Err(AddrError::SizeMismatch {
                family: self.family(),
                left: self.seg_count(),
                right: mask.seg_count(),
            });
        }
        let mut segs = Segs::new();
        for (i, seg) in self.segs().iter().enumerate() {
            // a ranged mask contributes its lowest value only
            let m = u32::from(mask.seg(i).low());
            let lo = u32::from(seg.low());
            let up = u32::from(seg.upper());
            let max = u32::from(seg.max_value());
            let masked = match op {
                Op::And => masker::mask_range(lo, up, m, max),
                Op::Or => masker::or_range(lo, up, m, max),
            };
            if !masked.sequential {
                trace!(segment = i, "mask tears segment range");
                return Err(AddrError::MaskRangeIncompatible {
                    family: self.family(),
                    segment: i,
                });
            }
            #[allow(clippy::cast_possible_truncation)]
            segs.push(seg.derive(masked.low as SegInt, masked.upper as SegInt, None));
        }
        let prefix = if retain_prefix { self.prefix_len() } else { None };
        Ok(prefix::assign(
            self.family(),
            self.start_index(),
            segs,
            prefix,
            false,
        ))
    }

    /// The section with all host bits zeroed, per its prefix. Without a
    /// prefix the whole section is the host and the result is all zeros.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when zeroing is not expressible
    /// over a ranged segment.
    pub fn to_zero_host(&self) -> Result<Section, AddrError> {
        self.to_zero_host_len(self.prefix_len().unwrap_or(0))
    }

    /// The section with host bits beyond `prefix_len` zeroed.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when zeroing is not expressible
    /// over a ranged segment.
    pub fn to_zero_host_len(&self, prefix_len: u8) -> Result<Section, AddrError> {
        let masked = self.apply_uniform(prefix_len, Op::And)?;
        Ok(masked.derive_prefixed(
            masked.segs().iter().copied().collect(),
            self.prefix_len(),
            false,
        ))
    }

    /// The section with all host bits set, per its prefix.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when the result is not
    /// expressible over a ranged segment.
    pub fn to_max_host(&self) -> Result<Section, AddrError> {
        self.to_max_host_len(self.prefix_len().unwrap_or(0))
    }

    /// The section with host bits beyond `prefix_len` set to ones.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when the result is not
    /// expressible over a ranged segment.
    pub fn to_max_host_len(&self, prefix_len: u8) -> Result<Section, AddrError> {
        let ored = self.apply_uniform(prefix_len, Op::Or)?;
        Ok(ored.derive_prefixed(
            ored.segs().iter().copied().collect(),
            self.prefix_len(),
            false,
        ))
    }

    /// The section with its network bits zeroed, keeping the prefix.
    #[must_use]
    pub fn to_zero_network(&self) -> Section {
        let p = self.prefix_len().unwrap_or(0);
        let bits = self.bits_per_seg();
        let segs: Segs = self
            .segs()
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let net_bits = match prefix::seg_prefix_at(bits, p, i) {
                    None => bits,
                    Some(r) => r,
                };
                let host = seg.host_mask(net_bits);
                seg.derive(seg.low() & host, seg.upper() & host, seg.seg_prefix())
            })
            .collect();
        Section::from_parts(self.family(), self.start_index(), segs, self.prefix_len())
    }

    /// Applies the network mask (`And`) or host mask (`Or`) of `prefix_len`
    /// segment-wise.
    fn apply_uniform(&self, prefix_len: u8, op: Op) -> Result<Section, AddrError> {
        let p = prefix_len.min(self.bit_count());
        let bits = self.bits_per_seg();
        let mut segs = Segs::new();
        for (i, seg) in self.segs().iter().enumerate() {
            let net_bits = match prefix::seg_prefix_at(bits, p, i) {
                None => bits,
                Some(r) => r,
            };
            let m = match op {
                Op::And => u32::from(seg.network_mask(net_bits)),
                Op::Or => u32::from(seg.host_mask(net_bits)),
            };
            let lo = u32::from(seg.low());
            let up = u32::from(seg.upper());
            let max = u32::from(seg.max_value());
            let masked = match op {
                Op::And => masker::mask_range(lo, up, m, max),
                Op::Or => masker::or_range(lo, up, m, max),
            };
            if !masked.sequential {
                return Err(AddrError::MaskRangeIncompatible {
                    family: self.family(),
                    segment: i,
                });
            }
            #[allow(clippy::cast_possible_truncation)]
            segs.push(seg.derive(masked.low as SegInt, masked.upper as SegInt, None));
        }
        Ok(Section::from_parts(
            self.family(),
            self.start_index(),
            segs,
            None,
        ))
    }

    /// True iff the subnet includes the zero-host address of its prefix.
    #[must_use]
    pub fn includes_zero_host(&self) -> bool {
        self.prefix_len()
            .is_some_and(|p| self.includes_zero_host_len(p))
    }

    /// True iff the subnet includes the address whose host bits beyond
    /// `prefix_len` are all zero.
    #[must_use]
    pub fn includes_zero_host_len(&self, prefix_len: u8) -> bool {
        let p = prefix_len.min(self.bit_count());
        let bits = self.bits_per_seg();
        let boundary = prefix::host_seg_index(bits, p);
        for (i, seg) in self.segs().iter().enumerate().skip(boundary) {
            #[allow(clippy::cast_possible_truncation)]
            let host = if i == boundary {
                seg.host_mask(p - (i as u8) * bits)
            } else {
                seg.max_value()
            };
            if seg.low() & host != 0 {
                return false;
            }
        }
        true
    }

    /// True iff the subnet includes the max-host address of its prefix.
    #[must_use]
    pub fn includes_max_host(&self) -> bool {
        self.prefix_len()
            .is_some_and(|p| self.includes_max_host_len(p))
    }

    /// True iff the subnet includes the address whose host bits beyond
    /// `prefix_len` are all ones.
    #[must_use]
    pub fn includes_max_host_len(&self, prefix_len: u8) -> bool {
        let p = prefix_len.min(self.bit_count());
        let bits = self.bits_per_seg();
        let boundary = prefix::host_seg_index(bits, p);
        for (i, seg) in self.segs().iter().enumerate().skip(boundary) {
            #[allow(clippy::cast_possible_truncation)]
            let host = if i == boundary {
                seg.host_mask(p - (i as u8) * bits)
            } else {
                seg.max_value()
            };
            if seg.upper() & host != host {
                return false;
            }
        }
        true
    }
}
