// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! MAC addresses, 48-bit and EUI-64.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::count::SetSize;
use crate::errors::AddrError;
use crate::family::Family;
use crate::section::{Section, Segs};
use crate::seg::{Seg, SegInt};

/// A MAC address or range of MAC addresses: six or eight 8-bit segments,
/// each carrying a value range, with an optional prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Section", into = "Section")]
pub struct MacAddr {
    section: Section,
}

impl MacAddr {
    /// Wraps a full-length MAC section of either width.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] unless the section is MAC-48 with
    /// six segments or MAC-64 with eight.
    pub fn new(section: Section) -> Result<MacAddr, AddrError> {
        let ok = section.family().is_mac()
            && section.seg_count() == section.family().seg_count();
        if !ok {
            return Err(AddrError::invalid(
                section.family(),
                format!(
                    "expected a full-length MAC section, got {} segments",
                    section.seg_count()
                ),
            ));
        }
        Ok(MacAddr { section })
    }

    pub(crate) fn wrap(section: Section) -> MacAddr {
        debug_assert!(section.family().is_mac());
        MacAddr { section }
    }

    /// The 48-bit address from the low six bytes of `value`.
    #[must_use]
    pub fn from_u64(value: u64) -> MacAddr {
        MacAddr::wrap(Section::from_value_u128(
            Family::Mac48,
            0,
            6,
            u128::from(value) & 0xffff_ffff_ffff,
            None,
            false,
        ))
    }

    /// The EUI-64 address from all eight bytes of `value`.
    #[must_use]
    pub fn from_u64_extended(value: u64) -> MacAddr {
        MacAddr::wrap(Section::from_value_u128(
            Family::Mac64,
            0,
            8,
            u128::from(value),
            None,
            false,
        ))
    }

    /// The address from bytes per the two's-complement/unsigned ingestion
    /// rules; six-or-fewer bytes read as MAC-48, more as EUI-64.
    ///
    /// # Errors
    ///
    /// [`AddrError::ValueExceedsSize`] for bytes that are not legal sign
    /// extension of a MAC of the chosen width.
    pub fn from_bytes(bytes: &[u8]) -> Result<MacAddr, AddrError> {
        let family = if bytes.len() > 6 {
            Family::Mac64
        } else {
            Family::Mac48
        };
        Ok(MacAddr::wrap(Section::from_bytes(family, bytes, None)?))
    }

    /// The address from per-index bound functions of the chosen family.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] for out-of-range segment values.
    pub fn from_vals(
        family: Family,
        lower: impl Fn(usize) -> SegInt,
        upper: Option<&dyn Fn(usize) -> SegInt>,
    ) -> Result<MacAddr, AddrError> {
        if !family.is_mac() {
            return Err(AddrError::invalid(family, "not a MAC family"));
        }
        let segs = crate::bytes::segs_from_fns(family, lower, upper)?;
        Ok(MacAddr::wrap(Section::new(family, &segs, None, false)?))
    }

    /// The underlying section.
    #[must_use]
    pub const fn section(&self) -> &Section {
        &self.section
    }

    /// MAC-48 or MAC-64.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.section.family()
    }

    /// The lower bound packed into a `u64`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value(&self) -> u64 {
        self.section.value_u128() as u64
    }

    /// The upper bound packed into a `u64`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn upper_value(&self) -> u64 {
        self.section.upper_value_u128() as u64
    }

    /// True iff more than one address is covered.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.section.is_multiple()
    }

    /// Number of covered addresses.
    #[must_use]
    pub fn count(&self) -> SetSize {
        self.section.count()
    }

    /// The prefix length, if any.
    #[must_use]
    pub const fn prefix_len(&self) -> Option<u8> {
        self.section.prefix_len()
    }

    /// The lowest covered address.
    #[must_use]
    pub fn lower(&self) -> MacAddr {
        MacAddr::wrap(self.section.lower())
    }

    /// The highest covered address.
    #[must_use]
    pub fn upper(&self) -> MacAddr {
        MacAddr::wrap(self.section.upper())
    }

    /// True iff every address of `other` is covered.
    #[must_use]
    pub fn contains(&self, other: &MacAddr) -> bool {
        self.section.contains(&other.section)
    }

    /// The full block of this address's prefix; the address itself when no
    /// prefix is present.
    #[must_use]
    pub fn to_prefix_block(&self) -> MacAddr {
        MacAddr::wrap(self.section.to_prefix_block())
    }

    /// The full block of the given prefix length containing this address:
    /// for an OUI allocation, `to_prefix_block_len(24)` is the whole block.
    #[must_use]
    pub fn to_prefix_block_len(&self, prefix_len: u8) -> MacAddr {
        MacAddr::wrap(self.section.to_prefix_block_len(prefix_len))
    }

    /// Applies a prefix length through prefix assignment.
    #[must_use]
    pub fn set_prefix_len(&self, prefix_len: u8) -> MacAddr {
        MacAddr::wrap(self.section.set_prefix_len(prefix_len))
    }

    /// Adjusts the prefix length by a signed delta.
    #[must_use]
    pub fn adjust_prefix_len(&self, delta: i16) -> MacAddr {
        MacAddr::wrap(self.section.adjust_prefix_len(delta))
    }

    /// Drops the prefix length, keeping the value ranges.
    #[must_use]
    pub fn without_prefix_len(&self) -> MacAddr {
        MacAddr::wrap(self.section.without_prefix_len())
    }

    /// This 48-bit address as EUI-64, with `ff:fe` spliced into the middle.
    /// EUI-64 addresses are returned unchanged.
    #[must_use]
    pub fn to_eui64(&self) -> MacAddr {
        if self.family() == Family::Mac64 {
            return self.clone();
        }
        let mut segs = Segs::new();
        for seg in &self.section.segs()[..3] {
            segs.push(seg.with_seg_prefix(None));
        }
        segs.push(Seg::octet(0xff));
        segs.push(Seg::octet(0xfe));
        for seg in &self.section.segs()[3..] {
            segs.push(seg.with_seg_prefix(None));
        }
        MacAddr::wrap(Section::from_parts(Family::Mac64, 0, segs, None))
    }

    /// Masks with `mask`, per the section masking rules.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for a mask of the other MAC width,
    /// [`AddrError::MaskRangeIncompatible`] when a masked range tears.
    pub fn mask(&self, mask: &MacAddr) -> Result<MacAddr, AddrError> {
        Ok(MacAddr::wrap(self.section.mask(&mask.section, false)?))
    }

    /// Bitwise-ors with `mask`.
    ///
    /// # Errors
    ///
    /// As [`MacAddr::mask`].
    pub fn bitwise_or(&self, mask: &MacAddr) -> Result<MacAddr, AddrError> {
        Ok(MacAddr::wrap(self.section.bitwise_or(&mask.section, false)?))
    }

    /// The address `increment` steps into the range, or `None` on overflow.
    #[must_use]
    pub fn increment(&self, increment: i64) -> Option<MacAddr> {
        self.section.increment(increment).map(MacAddr::wrap)
    }

    /// Iterates every single address of the range.
    pub fn iter(&self) -> impl Iterator<Item = MacAddr> + use<> {
        self.section.iter().map(MacAddr::wrap)
    }

    /// Iterates the distinct prefixes of the range, each clipped to the
    /// sub-range it covers.
    pub fn prefix_iter(&self) -> impl Iterator<Item = MacAddr> + use<> {
        self.section.prefix_iter().map(MacAddr::wrap)
    }

    /// Iterates the distinct prefixes as full blocks.
    pub fn prefix_block_iter(&self) -> impl Iterator<Item = MacAddr> + use<> {
        self.section.prefix_block_iter().map(MacAddr::wrap)
    }

    /// Iterates the blocks of the given prefix length within the range.
    pub fn prefix_block_iter_len(&self, prefix_len: u8) -> impl Iterator<Item = MacAddr> + use<> {
        self.section.prefix_block_iter_len(prefix_len).map(MacAddr::wrap)
    }

    /// Iterates maximal sequential blocks of the range.
    pub fn sequential_block_iter(&self) -> impl Iterator<Item = MacAddr> + use<> {
        self.section.sequential_block_iter().map(MacAddr::wrap)
    }

    /// True iff the low bit of the first octet is set on every covered
    /// address.
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        !self.section.seg(0).is_multiple() && self.section.seg(0).low() & 0x01 == 0x01
    }

    /// True iff the low bit of the first octet is clear on every covered
    /// address.
    #[must_use]
    pub fn is_unicast(&self) -> bool {
        !self.section.seg(0).is_multiple() && self.section.seg(0).low() & 0x01 == 0
    }

    /// True iff the locally-administered bit of the first octet is set.
    #[must_use]
    pub fn is_local(&self) -> bool {
        !self.section.seg(0).is_multiple() && self.section.seg(0).low() & 0x02 != 0
    }

    /// True iff the universally-administered bit reading holds.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        !self.section.seg(0).is_multiple() && self.section.seg(0).low() & 0x02 == 0
    }

    /// True iff this is the single all-ones (broadcast) address.
    #[must_use]
    pub fn is_max(&self) -> bool {
        self.section.is_max()
    }

    /// True iff this is the single all-zeros address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.section.is_zero()
    }
}

impl Default for MacAddr {
    /// The zero 48-bit address.
    fn default() -> MacAddr {
        MacAddr::from_u64(0)
    }
}

impl Display for MacAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.section, f)
    }
}

impl PartialOrd for MacAddr {
    fn partial_cmp(&self, other: &MacAddr) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MacAddr {
    fn cmp(&self, other: &MacAddr) -> Ordering {
        self.section.cmp(&other.section)
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> MacAddr {
        let segs: Vec<Seg> = octets.iter().map(|&o| Seg::octet(o)).collect();
        MacAddr::wrap(
            Section::new(Family::Mac48, &segs, None, false).expect("six octets are valid"),
        )
    }
}

impl From<[u8; 8]> for MacAddr {
    fn from(octets: [u8; 8]) -> MacAddr {
        let segs: Vec<Seg> = octets.iter().map(|&o| Seg::octet(o)).collect();
        MacAddr::wrap(
            Section::new(Family::Mac64, &segs, None, false).expect("eight octets are valid"),
        )
    }
}

impl TryFrom<Section> for MacAddr {
    type Error = AddrError;

    fn try_from(section: Section) -> Result<MacAddr, AddrError> {
        MacAddr::new(section)
    }
}

impl From<MacAddr> for Section {
    fn from(addr: MacAddr) -> Section {
        addr.section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_colon_hex() {
        let mac = MacAddr::from([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        assert_eq!(mac.to_string(), "0:1b:44:11:3a:b7");
        assert_eq!(mac.value(), 0x001b_4411_3ab7);
    }

    #[test]
    fn eui64_splice() {
        let mac = MacAddr::from([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        let extended = mac.to_eui64();
        assert_eq!(extended.family(), Family::Mac64);
        assert_eq!(extended.value(), 0x001b_44ff_fe11_3ab7);
        assert_eq!(extended.to_eui64(), extended);
    }

    #[test]
    fn classification_bits() {
        assert!(MacAddr::from([0x01, 0, 0, 0, 0, 0]).is_multicast());
        assert!(MacAddr::from([0x00, 0, 0, 0, 0, 1]).is_unicast());
        assert!(MacAddr::from([0x02, 0, 0, 0, 0, 0]).is_local());
        assert!(MacAddr::from([0x00, 0x1b, 0, 0, 0, 0]).is_universal());
        assert!(MacAddr::from([0xff; 6]).is_max());
        assert!(MacAddr::default().is_zero());
    }

    #[test]
    fn ranged_macs_count_and_iterate() {
        let lower = |_i: usize| 0u16;
        let upper = |i: usize| if i == 5 { 3u16 } else { 0 };
        let range = MacAddr::from_vals(Family::Mac48, lower, Some(&upper)).expect("valid");
        assert_eq!(range.count(), SetSize::U128(4));
        let all: Vec<MacAddr> = range.iter().collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].value(), 3);
    }

    #[test]
    fn byte_widths_choose_the_family() {
        let short = MacAddr::from_bytes(&[1, 2, 3, 4, 5, 6]).expect("valid");
        assert_eq!(short.family(), Family::Mac48);
        let long = MacAddr::from_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]).expect("valid");
        assert_eq!(long.family(), Family::Mac64);
    }

    #[test]
    fn oui_prefix_blocks() {
        // an OUI allocation is the /24 block of its first three octets
        let mac = MacAddr::from([0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        let oui = mac.to_prefix_block_len(24);
        assert_eq!(oui.prefix_len(), Some(24));
        assert!(oui.is_multiple());
        assert_eq!(oui.count(), SetSize::U128(1 << 24));
        assert_eq!(oui.lower().value(), 0x001b_4400_0000);
        assert_eq!(oui.upper().value(), 0x001b_44ff_ffff);
        assert!(oui.contains(&mac));

        // the prefix moves and drops like any other section prefix
        let narrower = oui.adjust_prefix_len(8);
        assert_eq!(narrower.prefix_len(), Some(32));
        assert_eq!(oui.without_prefix_len().prefix_len(), None);
        assert_eq!(mac.set_prefix_len(24).to_prefix_block(), oui);
    }

    #[test]
    fn oui_block_iteration() {
        let mac = MacAddr::from([0x00, 0x1b, 0x44, 0, 0, 0]);
        let oui = mac.set_prefix_len(24);
        let sub_blocks: Vec<MacAddr> = oui.prefix_block_iter_len(32).collect();
        assert_eq!(sub_blocks.len(), 256);
        assert_eq!(sub_blocks[0].lower().value(), 0x001b_4400_0000);
        assert_eq!(sub_blocks[255].lower().value(), 0x001b_44ff_0000);
        assert!(sub_blocks.windows(2).all(|w| w[0] < w[1]));

        let sequential: Vec<MacAddr> = oui.sequential_block_iter().collect();
        assert_eq!(sequential.len(), 1);

        let prefixes: Vec<MacAddr> = oui.prefix_iter().collect();
        assert_eq!(prefixes.len(), 1);
        assert_eq!(prefixes[0], oui);
    }
}
