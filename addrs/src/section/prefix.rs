// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prefix assignment and prefix-block classification.
//!
//! A prefix length on a section does not force the section to be a prefix
//! block. At construction time the segments are inspected: when, starting at
//! the first host bit, the low bounds are all zero and the upper bounds form
//! a run of zeros followed by a run of ones reaching the end, the host side
//! is materialized into full ranges and the section becomes the block.
//! Anything else keeps its exact bounds and simply carries the prefix, the
//! way `1.2.3.4/24` stays a single address.

use super::{MaskLens, Section, Segs};
use crate::family::Family;
use crate::seg::Seg;

/// Per-segment prefix position implied by a section prefix `p` at segment
/// `index`: `None` for fully-network segments, the local boundary offset for
/// the boundary segment (a segment ending exactly on the boundary gets
/// `Some(bits)`), and `Some(0)` for host-side segments.
pub(crate) fn seg_prefix_at(bits: u8, p: u8, index: usize) -> Option<u8> {
    let start = u16::from(bits) * u16::try_from(index).unwrap_or(u16::MAX);
    let p = u16::from(p);
    if p <= start {
        return Some(0);
    }
    let end = start + u16::from(bits);
    if p >= end {
        if p == end {
            return Some(bits);
        }
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let local = (p - start) as u8;
    Some(local)
}

/// Index of the first segment holding host bits for prefix `p`.
pub(crate) fn host_seg_index(bits: u8, p: u8) -> usize {
    usize::from(p / bits)
}

/// Decides whether segments with prefix `p` applied satisfy the prefix-block
/// pattern: low host bits all zero, upper host bits a run of zeros then a
/// run of ones reaching the last bit. All-zero hosts qualify (they widen to
/// the block) and so do full-range hosts; a prefix covering every bit does
/// not (there are no host bits to free).
pub(crate) fn is_prefix_block_segs(segs: &[Seg], p: u8, bits: u8) -> bool {
    let total = u16::from(bits) * u16::try_from(segs.len()).unwrap_or(0);
    if segs.is_empty() || u16::from(p) >= total {
        return false;
    }
    let boundary = host_seg_index(bits, p);
    let mut ones_started = false;
    for (i, seg) in segs.iter().enumerate().skip(boundary) {
        let host_mask = if i == boundary {
            seg.host_mask(p - u8::try_from(i).unwrap_or(0) * bits)
        } else {
            seg.max_value()
        };
        let low_host = seg.low() & host_mask;
        let upper_host = seg.upper() & host_mask;
        if low_host != 0 {
            return false;
        }
        if ones_started {
            if upper_host != host_mask {
                return false;
            }
        } else {
            // upper host bits must read as zeros then ones
            if u32::from(upper_host) & (u32::from(upper_host) + 1) != 0 {
                return false;
            }
            ones_started = upper_host != 0;
        }
    }
    true
}

/// Prefix assignment over candidate segments.
///
/// The requested prefix is reconciled with any prefix the segments already
/// carry (the shorter wins), the prefix-block decision is made, and the
/// per-segment prefixes are attached where the boundary falls. With
/// `single_only` the block path is never taken and `(low, upper)` survive
/// exactly.
pub(crate) fn assign(
    family: Family,
    start: u8,
    segs: Segs,
    prefix: Option<u8>,
    single_only: bool,
) -> Section {
    let bits = family.bits_per_seg();
    let derived = derive_prefix_from_segs(&segs, bits);
    let effective = match (prefix, derived) {
        (Some(requested), Some(existing)) => Some(requested.min(existing)),
        (Some(requested), None) => Some(requested),
        (None, existing) => existing,
    };
    let Some(p) = effective else {
        let segs = segs
            .into_iter()
            .map(|seg| seg.with_seg_prefix(None))
            .collect();
        return Section::from_parts(family, start, segs, None);
    };
    let as_block = !single_only && is_prefix_block_segs(&segs, p, bits);
    let segs: Segs = segs
        .into_iter()
        .enumerate()
        .map(|(i, seg)| match seg_prefix_at(bits, p, i) {
            None => seg.with_seg_prefix(None),
            Some(r) => {
                if as_block {
                    seg.to_network_seg(r)
                } else {
                    seg.with_seg_prefix(Some(r))
                }
            }
        })
        .collect();
    Section::from_parts(family, start, segs, Some(p))
}

/// The section prefix implied by prefixes already attached to segments: the
/// position of the first per-segment boundary.
fn derive_prefix_from_segs(segs: &[Seg], bits: u8) -> Option<u8> {
    for (i, seg) in segs.iter().enumerate() {
        if let Some(r) = seg.seg_prefix() {
            #[allow(clippy::cast_possible_truncation)]
            return Some((i as u8) * bits + r);
        }
    }
    None
}

/// The four-flag scan classifying a section as a network mask, a host mask,
/// or neither. Returned lengths are prefix lengths: `255.224.0.0` yields a
/// network length of 11, `0.0.31.255` a host length of 11. All-zeros and
/// all-ones sections classify both ways.
pub(crate) fn check_for_prefix_mask(section: &Section) -> MaskLens {
    const NEITHER: MaskLens = MaskLens {
        network: None,
        host: None,
    };
    let count = section.seg_count();
    if count == 0 {
        return NEITHER;
    }
    let bits = section.bits_per_seg();
    let max = section.seg(0).max_value();
    let mut checking_network_front = true;
    let mut checking_host_front = true;
    let mut checking_network_back = false;
    let mut checking_host_back = false;
    let mut prefixed_seg = 0usize;
    let mut prefixed_seg_prefix = 0u8;
    for i in 0..count {
        let seg = section.seg(i);
        if seg.is_multiple() {
            return NEITHER;
        }
        let val = seg.low();
        if val == 0 {
            if checking_network_front {
                prefixed_seg = i;
                checking_network_front = false;
                checking_network_back = true;
            } else if !checking_host_front && !checking_network_back {
                return NEITHER;
            }
            checking_host_back = false;
        } else if val == max {
            if checking_host_front {
                prefixed_seg = i;
                checking_host_front = false;
                checking_host_back = true;
            } else if !checking_host_back && !checking_network_front {
                return NEITHER;
            }
            checking_network_back = false;
        } else {
            // at most one transition segment, itself a mask digit
            let (seg_network, seg_host) = seg.check_for_prefix_mask();
            if let Some(n) = seg_network {
                if !checking_network_front {
                    return NEITHER;
                }
                prefixed_seg_prefix = n;
                prefixed_seg = i;
                checking_network_back = true;
            } else if let Some(h) = seg_host {
                if !checking_host_front {
                    return NEITHER;
                }
                prefixed_seg_prefix = h;
                prefixed_seg = i;
                checking_host_back = true;
            } else {
                return NEITHER;
            }
            checking_network_front = false;
            checking_host_front = false;
        }
    }
    let total = section.bit_count();
    #[allow(clippy::cast_possible_truncation)]
    let at_seg = (prefixed_seg as u8) * bits + prefixed_seg_prefix;
    if checking_network_front {
        // all ones
        MaskLens {
            network: Some(total),
            host: Some(0),
        }
    } else if checking_host_front {
        // all zeros
        MaskLens {
            network: Some(0),
            host: Some(total),
        }
    } else if checking_network_back {
        MaskLens {
            network: Some(at_seg),
            host: None,
        }
    } else if checking_host_back {
        MaskLens {
            network: None,
            host: Some(at_seg),
        }
    } else {
        NEITHER
    }
}

impl Section {
    /// True iff the section carries a prefix and spans exactly the full
    /// block(s) of that prefix.
    #[must_use]
    pub fn is_prefix_block(&self) -> bool {
        self.prefix_len()
            .is_some_and(|p| self.contains_prefix_block(p))
    }

    /// True iff the section is the block of exactly one prefix value.
    #[must_use]
    pub fn is_single_prefix_block(&self) -> bool {
        self.prefix_len()
            .is_some_and(|p| self.contains_single_prefix_block(p))
    }

    /// True iff every host bit beyond `prefix_len` spans its full range.
    #[must_use]
    pub fn contains_prefix_block(&self, prefix_len: u8) -> bool {
        let p = prefix_len.min(self.bit_count());
        if p == self.bit_count() {
            return true;
        }
        let bits = self.bits_per_seg();
        let boundary = host_seg_index(bits, p);
        for (i, seg) in self.segs().iter().enumerate().skip(boundary) {
            #[allow(clippy::cast_possible_truncation)]
            let host_mask = if i == boundary {
                seg.host_mask(p - (i as u8) * bits)
            } else {
                seg.max_value()
            };
            if seg.low() & host_mask != 0 || seg.upper() & host_mask != host_mask {
                return false;
            }
        }
        true
    }

    /// True iff the section is exactly one prefix value's full block.
    #[must_use]
    pub fn contains_single_prefix_block(&self, prefix_len: u8) -> bool {
        let p = prefix_len.min(self.bit_count());
        if !self.contains_prefix_block(p) {
            return false;
        }
        let bits = self.bits_per_seg();
        for (i, seg) in self.segs().iter().enumerate() {
            let seg_start = u16::from(bits) * u16::try_from(i).unwrap_or(0);
            if u16::from(p) <= seg_start {
                break;
            }
            #[allow(clippy::cast_possible_truncation)]
            let net_bits = (u16::from(p) - seg_start).min(u16::from(bits)) as u8;
            let shift = bits - net_bits;
            if seg.low() >> shift != seg.upper() >> shift {
                return false;
            }
        }
        true
    }

    /// The smallest prefix length for which the section spans full blocks.
    /// For a single address this is the bit count.
    #[must_use]
    pub fn min_prefix_len_for_block(&self) -> u8 {
        let bits = self.bits_per_seg();
        let mut total = self.bit_count();
        for seg in self.segs().iter().rev() {
            let mut free = 0u8;
            while free < bits {
                #[allow(clippy::cast_possible_truncation)]
                let mask = ((1u32 << (free + 1)) - 1) as u16;
                if seg.low() & mask != 0 || seg.upper() & mask != mask {
                    break;
                }
                free += 1;
            }
            total -= free;
            if free < bits {
                break;
            }
        }
        total
    }

    /// The prefix length whose single block equals this section exactly, if
    /// one exists.
    #[must_use]
    pub fn prefix_len_for_single_block(&self) -> Option<u8> {
        let p = self.min_prefix_len_for_block();
        self.contains_single_prefix_block(p).then_some(p)
    }

    /// The section as the full block of its own prefix; without a prefix the
    /// section is returned unchanged.
    #[must_use]
    pub fn to_prefix_block(&self) -> Section {
        match self.prefix_len() {
            None => self.clone(),
            Some(p) => self.to_prefix_block_len(p),
        }
    }

    /// The full block of the given prefix length containing this section.
    #[must_use]
    pub fn to_prefix_block_len(&self, prefix_len: u8) -> Section {
        let p = prefix_len.min(self.bit_count());
        let bits = self.bits_per_seg();
        let segs: Segs = self
            .segs()
            .iter()
            .enumerate()
            .map(|(i, seg)| match seg_prefix_at(bits, p, i) {
                None => seg.with_seg_prefix(None),
                Some(r) => seg.to_network_seg(r),
            })
            .collect();
        Section::from_parts(self.family(), self.start_index(), segs, Some(p))
    }

    /// Applies a prefix length through prefix assignment; out-of-range
    /// lengths are clamped to the bit count.
    #[must_use]
    pub fn set_prefix_len(&self, prefix_len: u8) -> Section {
        let p = prefix_len.min(self.bit_count());
        let segs: Segs = self
            .segs()
            .iter()
            .map(|seg| seg.with_seg_prefix(None))
            .collect();
        assign(self.family(), self.start_index(), segs, Some(p), false)
    }

    /// Adjusts the prefix by a signed delta, from the bit count when no
    /// prefix is present. The result is clamped to `[0, bit_count]`.
    #[must_use]
    pub fn adjust_prefix_len(&self, delta: i16) -> Section {
        if delta == 0 {
            return self.clone();
        }
        let base = i16::from(self.prefix_len().unwrap_or(self.bit_count()));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let adjusted = (base + delta).clamp(0, i16::from(self.bit_count())) as u8;
        self.set_prefix_len(adjusted)
    }

    /// Drops the prefix length, keeping the value ranges.
    #[must_use]
    pub fn without_prefix_len(&self) -> Section {
        if self.prefix_len().is_none() {
            return self.clone();
        }
        let segs: Segs = self
            .segs()
            .iter()
            .map(|seg| seg.with_seg_prefix(None))
            .collect();
        Section::from_parts(self.family(), self.start_index(), segs, None)
    }

    /// Assigns the smallest prefix for which the section spans full blocks.
    #[must_use]
    pub fn assign_min_prefix_for_block(&self) -> Section {
        self.set_prefix_len(self.min_prefix_len_for_block())
    }

    /// Assigns the prefix whose single block equals this section, if any.
    #[must_use]
    pub fn assign_prefix_for_single_block(&self) -> Option<Section> {
        self.prefix_len_for_single_block()
            .map(|p| self.set_prefix_len(p))
    }

    /// The prefix length this section represents when read as a network mask
    /// (`network` true) or a host mask. Memoized on first use.
    #[must_use]
    pub fn block_mask_prefix_len(&self, network: bool) -> Option<u8> {
        let lens = self.cache_mask_lens();
        if network { lens.network } else { lens.host }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::SetSize;
    use crate::seg::SegInt;

    fn ipv4(values: [(SegInt, SegInt); 4], prefix: Option<u16>) -> Section {
        let segs: Vec<Seg> = values
            .iter()
            .map(|&(lo, up)| Seg::new(Family::Ipv4, lo, up, None).expect("valid segment"))
            .collect();
        Section::new(Family::Ipv4, &segs, prefix, false).expect("valid section")
    }

    #[test]
    fn zero_host_with_prefix_becomes_the_block() {
        let block = ipv4([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        assert!(block.is_prefix_block());
        assert!(block.is_multiple());
        assert_eq!(block.count(), SetSize::U128(1 << 16));
        assert_eq!(block.seg(2).low(), 0);
        assert_eq!(block.seg(2).upper(), 255);
    }

    #[test]
    fn nonzero_host_with_prefix_stays_single() {
        let single = ipv4([(1, 1), (2, 2), (3, 3), (4, 4)], Some(24));
        assert!(!single.is_prefix_block());
        assert!(!single.is_multiple());
        assert_eq!(single.count(), SetSize::ONE);
        assert_eq!(single.prefix_len(), Some(24));
    }

    #[test]
    fn single_only_never_forms_a_block() {
        let segs: Vec<Seg> = [1u16, 2, 0, 0]
            .iter()
            .map(|&v| Seg::new(Family::Ipv4, v, v, None).expect("valid segment"))
            .collect();
        let section =
            Section::new(Family::Ipv4, &segs, Some(16), true).expect("valid section");
        assert!(!section.is_multiple());
        assert_eq!(section.prefix_len(), Some(16));
        assert_eq!(section.count(), SetSize::ONE);
    }

    #[test]
    fn mid_segment_boundary() {
        // 10.4.0.0/14: boundary inside the second segment
        let block = ipv4([(10, 10), (4, 4), (0, 0), (0, 0)], Some(14));
        assert!(block.is_prefix_block());
        assert_eq!(block.seg(1).low(), 4);
        assert_eq!(block.seg(1).upper(), 7);
        assert_eq!(block.seg(1).seg_prefix(), Some(6));
        assert_eq!(block.count(), SetSize::U128(1 << 18));
    }

    #[test]
    fn prefix_zero_is_the_full_space() {
        let block = ipv4([(0, 0), (0, 0), (0, 0), (0, 0)], Some(0));
        assert!(block.is_prefix_block());
        assert_eq!(block.count(), SetSize::U128(1 << 32));
        assert!(block.is_full_range());
    }

    #[test]
    fn full_bit_count_prefix_keeps_one_address() {
        let section = ipv4([(1, 1), (2, 2), (3, 3), (4, 4)], Some(32));
        assert_eq!(section.count(), SetSize::ONE);
        assert!(section.is_prefix_block()); // the /32 block is the address itself
        assert!(section.is_single_prefix_block());
    }

    #[test]
    fn shorter_segment_prefix_wins() {
        // segments already carrying a /16 boundary override a requested /24
        let segs = [
            Seg::new(Family::Ipv4, 1, 1, None).expect("seg"),
            Seg::new(Family::Ipv4, 2, 2, Some(8)).expect("seg"),
            Seg::new(Family::Ipv4, 0, 0, Some(0)).expect("seg"),
            Seg::new(Family::Ipv4, 0, 0, Some(0)).expect("seg"),
        ];
        let section = Section::new(Family::Ipv4, &segs, Some(24), false).expect("valid");
        assert_eq!(section.prefix_len(), Some(16));
    }

    #[test]
    fn partial_host_run_forms_a_block() {
        // upper host bits read zeros-then-ones: 1.2.3.0-7/24 widens to /24
        let block = ipv4([(1, 1), (2, 2), (3, 3), (0, 7)], Some(24));
        assert!(block.is_prefix_block());
        assert_eq!(block.count(), SetSize::U128(256));
        // but 1.2.3.0-5/24 does not (upper 5 = 101 is not a run)
        let kept = ipv4([(1, 1), (2, 2), (3, 3), (0, 5)], Some(24));
        assert!(!kept.is_prefix_block());
        assert_eq!(kept.count(), SetSize::U128(6));
    }

    #[test]
    fn mask_classification_on_sections() {
        let network = ipv4([(255, 255), (224, 224), (0, 0), (0, 0)], None);
        let lens = check_for_prefix_mask(&network);
        assert_eq!((lens.network, lens.host), (Some(11), None));

        let host = ipv4([(0, 0), (0, 0), (31, 31), (255, 255)], None);
        let lens = check_for_prefix_mask(&host);
        assert_eq!((lens.network, lens.host), (None, Some(11)));

        let zeros = ipv4([(0, 0), (0, 0), (0, 0), (0, 0)], None);
        let lens = check_for_prefix_mask(&zeros);
        assert_eq!((lens.network, lens.host), (Some(0), Some(32)));

        let ones = ipv4([(255, 255), (255, 255), (255, 255), (255, 255)], None);
        let lens = check_for_prefix_mask(&ones);
        assert_eq!((lens.network, lens.host), (Some(32), Some(0)));

        let neither = ipv4([(255, 255), (0, 0), (255, 255), (0, 0)], None);
        let lens = check_for_prefix_mask(&neither);
        assert_eq!((lens.network, lens.host), (None, None));

        let ranged = ipv4([(255, 255), (0, 224), (0, 0), (0, 0)], None);
        let lens = check_for_prefix_mask(&ranged);
        assert_eq!((lens.network, lens.host), (None, None));
    }

    #[test]
    fn min_prefix_for_block() {
        let block = ipv4([(1, 1), (2, 2), (0, 255), (0, 255)], None);
        assert_eq!(block.min_prefix_len_for_block(), 16);
        assert_eq!(block.prefix_len_for_single_block(), Some(16));

        let single = ipv4([(1, 1), (2, 2), (3, 3), (4, 4)], None);
        assert_eq!(single.min_prefix_len_for_block(), 32);

        let nibble = ipv4([(1, 1), (2, 2), (3, 3), (0x10, 0x1f)], None);
        assert_eq!(nibble.min_prefix_len_for_block(), 28);
        assert_eq!(nibble.prefix_len_for_single_block(), Some(28));

        // two /24 blocks: min prefix is 24 but no single block exists
        let double = ipv4([(1, 1), (2, 2), (2, 3), (0, 255)], None);
        assert_eq!(double.min_prefix_len_for_block(), 24);
        assert_eq!(double.prefix_len_for_single_block(), None);
    }

    #[test]
    fn to_prefix_block_widens() {
        let single = ipv4([(1, 1), (2, 2), (3, 3), (4, 4)], Some(24));
        let block = single.to_prefix_block();
        assert!(block.is_prefix_block());
        assert_eq!(block.count(), SetSize::U128(256));
        assert_eq!(block.seg(3).low(), 0);
        assert_eq!(block.seg(3).upper(), 255);
        assert_eq!(block.seg(2).low(), 3);
    }

    #[test]
    fn prefix_assignment_is_idempotent() {
        let section = ipv4([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let again = section.set_prefix_len(16);
        assert_eq!(section, again);
    }

    #[test]
    fn adjust_prefix_len_moves_the_boundary() {
        let section = ipv4([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let wider = section.adjust_prefix_len(-8);
        assert_eq!(wider.prefix_len(), Some(8));
        let narrower = section.adjust_prefix_len(8);
        assert_eq!(narrower.prefix_len(), Some(24));
        let unprefixed = ipv4([(1, 1), (2, 2), (3, 3), (4, 4)], None);
        assert_eq!(unprefixed.adjust_prefix_len(-8).prefix_len(), Some(24));
    }

    #[test]
    fn block_mask_prefix_len_is_memoized() {
        let mask = ipv4([(255, 255), (255, 255), (0, 0), (0, 0)], None);
        assert_eq!(mask.block_mask_prefix_len(true), Some(16));
        assert_eq!(mask.block_mask_prefix_len(true), Some(16));
        assert_eq!(mask.block_mask_prefix_len(false), None);
    }
}
