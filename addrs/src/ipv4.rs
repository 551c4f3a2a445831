// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 addresses and subnets.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::count::SetSize;
use crate::errors::AddrError;
use crate::family::Family;
use crate::range::SeqRange;
use crate::section::Section;
use crate::seg::{Seg, SegInt};

/// An IPv4 address or subnet of addresses: four 8-bit segments, each
/// carrying a value range, with an optional CIDR prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Section", into = "Section")]
pub struct Ipv4Addr {
    section: Section,
}

impl Ipv4Addr {
    /// Wraps a full-length IPv4 section.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] unless the section is IPv4 with
    /// exactly four segments.
    pub fn new(section: Section) -> Result<Ipv4Addr, AddrError> {
        if section.family() != Family::Ipv4 || section.seg_count() != Family::Ipv4.seg_count() {
            return Err(AddrError::invalid(
                Family::Ipv4,
                format!(
                    "expected a full-length IPv4 section, got {} {}-segment section",
                    section.family(),
                    section.seg_count()
                ),
            ));
        }
        Ok(Ipv4Addr { section })
    }

    pub(crate) fn wrap(section: Section) -> Ipv4Addr {
        debug_assert_eq!(section.family(), Family::Ipv4);
        debug_assert_eq!(section.seg_count(), 4);
        Ipv4Addr { section }
    }

    /// The address from a 32-bit value.
    #[must_use]
    pub fn from_u32(value: u32) -> Ipv4Addr {
        Ipv4Addr::wrap(Section::from_value_u128(
            Family::Ipv4,
            0,
            4,
            u128::from(value),
            None,
            false,
        ))
    }

    /// The address from a 32-bit value with a prefix length applied.
    ///
    /// # Errors
    ///
    /// [`AddrError::PrefixLenOutOfRange`] when `prefix_len` exceeds 32.
    pub fn from_prefixed_u32(value: u32, prefix_len: u16) -> Result<Ipv4Addr, AddrError> {
        if prefix_len > 32 {
            return Err(AddrError::PrefixLenOutOfRange {
                family: Family::Ipv4,
                len: prefix_len,
                max: 32,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let prefix = prefix_len as u8;
        Ok(Ipv4Addr::wrap(Section::from_value_u128(
            Family::Ipv4,
            0,
            4,
            u128::from(value),
            Some(prefix),
            false,
        )))
    }

    /// The address from four octets.
    #[must_use]
    pub fn from_octets(octets: [u8; 4]) -> Ipv4Addr {
        let segs: Vec<Seg> = octets.iter().map(|&o| Seg::octet(o)).collect();
        Ipv4Addr::wrap(
            Section::new(Family::Ipv4, &segs, None, false).expect("four octets are valid"),
        )
    }

    /// The address from bytes per the two's-complement/unsigned ingestion
    /// rules.
    ///
    /// # Errors
    ///
    /// [`AddrError::ValueExceedsSize`] for bytes that are not legal sign
    /// extension.
    pub fn from_bytes(bytes: &[u8]) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(Section::from_bytes(Family::Ipv4, bytes, None)?))
    }

    /// [`Ipv4Addr::from_bytes`] with a prefix length applied.
    ///
    /// # Errors
    ///
    /// As [`Ipv4Addr::from_bytes`], plus [`AddrError::PrefixLenOutOfRange`].
    pub fn from_prefixed_bytes(bytes: &[u8], prefix_len: u16) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(Section::from_bytes(
            Family::Ipv4,
            bytes,
            Some(prefix_len),
        )?))
    }

    /// The subnet whose segment bounds come from per-index functions: the
    /// required function supplies low bounds, the optional one upper bounds.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] for out-of-range segment values,
    /// plus prefix errors when `prefix_len` is supplied.
    pub fn from_vals(
        lower: impl Fn(usize) -> SegInt,
        upper: Option<&dyn Fn(usize) -> SegInt>,
        prefix_len: Option<u16>,
    ) -> Result<Ipv4Addr, AddrError> {
        let segs = crate::bytes::segs_from_fns(Family::Ipv4, lower, upper)?;
        Ok(Ipv4Addr::wrap(Section::new(
            Family::Ipv4,
            &segs,
            prefix_len,
            false,
        )?))
    }

    /// The underlying section.
    #[must_use]
    pub const fn section(&self) -> &Section {
        &self.section
    }

    /// The lower bound as a 32-bit value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value(&self) -> u32 {
        self.section.value_u128() as u32
    }

    /// The upper bound as a 32-bit value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn upper_value(&self) -> u32 {
        self.section.upper_value_u128() as u32
    }

    /// The prefix length, if any.
    #[must_use]
    pub const fn prefix_len(&self) -> Option<u8> {
        self.section.prefix_len()
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

    /// The lowest covered address.
    #[must_use]
    pub fn lower(&self) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.lower())
    }

    /// The highest covered address.
    #[must_use]
    pub fn upper(&self) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.upper())
    }

    /// True iff every address of `other` is covered by this subnet.
    #[must_use]
    pub fn contains(&self, other: &Ipv4Addr) -> bool {
        self.section.contains(&other.section)
    }

    /// Masks with `mask`, dropping the prefix length.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when a masked segment range
    /// tears.
    pub fn mask(&self, mask: &Ipv4Addr) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(self.section.mask(&mask.section, false)?))
    }

    /// Masks with `mask`, keeping and re-normalizing the prefix length.
    ///
    /// # Errors
    ///
    /// As [`Ipv4Addr::mask`].
    pub fn mask_prefixed(&self, mask: &Ipv4Addr) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(self.section.mask(&mask.section, true)?))
    }

    /// Bitwise-ors with `mask`, dropping the prefix length.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when an or-ed segment range
    /// tears.
    pub fn bitwise_or(&self, mask: &Ipv4Addr) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(self.section.bitwise_or(&mask.section, false)?))
    }

    /// True iff this address equals `other` after masking both with `mask`.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] is impossible for full-length addresses
    /// but kept for interface parity.
    pub fn matches_with_mask(
        &self,
        other: &Ipv4Addr,
        mask: &Ipv4Addr,
    ) -> Result<bool, AddrError> {
        self.section.matches_with_mask(&other.section, &mask.section)
    }

    /// The subnet covering the addresses in both operands.
    #[must_use]
    pub fn intersect(&self, other: &Ipv4Addr) -> Option<Ipv4Addr> {
        self.section
            .intersect(&other.section)
            .expect("full-length operands")
            .map(Ipv4Addr::wrap)
    }

    /// The addresses of this subnet not in `other`, as minimal prefix
    /// blocks, sorted ascending.
    #[must_use]
    pub fn subtract(&self, other: &Ipv4Addr) -> Vec<Ipv4Addr> {
        self.section
            .subtract(&other.section)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv4Addr::wrap)
            .collect()
    }

    /// Minimal prefix blocks covering everything between the lowest and
    /// highest of the two operands.
    #[must_use]
    pub fn span_with_prefix_blocks(&self, other: &Ipv4Addr) -> Vec<Ipv4Addr> {
        self.section
            .span_with_prefix_blocks(&other.section)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv4Addr::wrap)
            .collect()
    }

    /// Minimal sequential blocks covering everything between the lowest and
    /// highest of the two operands.
    #[must_use]
    pub fn span_with_sequential_blocks(&self, other: &Ipv4Addr) -> Vec<Ipv4Addr> {
        self.section
            .span_with_sequential_blocks(&other.section)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv4Addr::wrap)
            .collect()
    }

    /// The smallest single prefix block containing both operands.
    #[must_use]
    pub fn cover_with_prefix_block(&self, other: &Ipv4Addr) -> Ipv4Addr {
        Ipv4Addr::wrap(
            self.section
                .cover_with_prefix_block(&other.section)
                .expect("full-length operands"),
        )
    }

    /// Merges subnets into minimal prefix blocks covering their union.
    #[must_use]
    pub fn merge_to_prefix_blocks(addrs: &[Ipv4Addr]) -> Vec<Ipv4Addr> {
        let sections: Vec<Section> = addrs.iter().map(|a| a.section.clone()).collect();
        Section::merge_to_prefix_blocks(&sections)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv4Addr::wrap)
            .collect()
    }

    /// Merges subnets into minimal sequential blocks covering their union.
    #[must_use]
    pub fn merge_to_sequential_blocks(addrs: &[Ipv4Addr]) -> Vec<Ipv4Addr> {
        let sections: Vec<Section> = addrs.iter().map(|a| a.section.clone()).collect();
        Section::merge_to_sequential_blocks(&sections)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv4Addr::wrap)
            .collect()
    }

    /// The full block of this address's prefix; the address itself when no
    /// prefix is present.
    #[must_use]
    pub fn to_prefix_block(&self) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.to_prefix_block())
    }

    /// The full block of the given prefix length containing this address.
    #[must_use]
    pub fn to_prefix_block_len(&self, prefix_len: u8) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.to_prefix_block_len(prefix_len))
    }

    /// Applies a prefix length through prefix assignment.
    #[must_use]
    pub fn set_prefix_len(&self, prefix_len: u8) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.set_prefix_len(prefix_len))
    }

    /// Adjusts the prefix length by a signed delta.
    #[must_use]
    pub fn adjust_prefix_len(&self, delta: i16) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.adjust_prefix_len(delta))
    }

    /// Drops the prefix length.
    #[must_use]
    pub fn without_prefix_len(&self) -> Ipv4Addr {
        Ipv4Addr::wrap(self.section.without_prefix_len())
    }

    /// The address with host bits zeroed, per its prefix.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when zeroing is not expressible
    /// over a ranged segment.
    pub fn to_zero_host(&self) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(self.section.to_zero_host()?))
    }

    /// The address with host bits set to ones, per its prefix.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when the result is not
    /// expressible over a ranged segment.
    pub fn to_max_host(&self) -> Result<Ipv4Addr, AddrError> {
        Ok(Ipv4Addr::wrap(self.section.to_max_host()?))
    }

    /// The broadcast address of the prefixed subnet: all host bits ones.
    ///
    /// # Errors
    ///
    /// As [`Ipv4Addr::to_max_host`].
    pub fn to_broadcast_address(&self) -> Result<Ipv4Addr, AddrError> {
        self.to_max_host()
    }

    /// The network address of the prefixed subnet: all host bits zero.
    ///
    /// # Errors
    ///
    /// As [`Ipv4Addr::to_zero_host`].
    pub fn to_network_address(&self) -> Result<Ipv4Addr, AddrError> {
        self.to_zero_host()
    }

    /// The address `increment` steps into the subnet, or `None` on
    /// overflow.
    #[must_use]
    pub fn increment(&self, increment: i64) -> Option<Ipv4Addr> {
        self.section.increment(increment).map(Ipv4Addr::wrap)
    }

    /// The address `increment` steps beyond the subnet boundary, or `None`
    /// on overflow.
    #[must_use]
    pub fn increment_boundary(&self, increment: i64) -> Option<Ipv4Addr> {
        self.section.increment_boundary(increment).map(Ipv4Addr::wrap)
    }

    /// The subnet as a sequential range from its lowest to highest address.
    #[must_use]
    pub fn to_seq_range(&self) -> SeqRange {
        SeqRange::new(&self.section, &self.section).expect("full-length operands")
    }

    /// Iterates every single address of the subnet.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        self.section.iter().map(Ipv4Addr::wrap)
    }

    /// Iterates the distinct prefixes of the subnet.
    pub fn prefix_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        self.section.prefix_iter().map(Ipv4Addr::wrap)
    }

    /// Iterates the distinct prefixes as full blocks.
    pub fn prefix_block_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        self.section.prefix_block_iter().map(Ipv4Addr::wrap)
    }

    /// Iterates the blocks of the given prefix length within the subnet.
    pub fn prefix_block_iter_len(&self, prefix_len: u8) -> impl Iterator<Item = Ipv4Addr> + use<> {
        self.section.prefix_block_iter_len(prefix_len).map(Ipv4Addr::wrap)
    }

    /// Iterates maximal sequential blocks of the subnet.
    pub fn sequential_block_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        self.section.sequential_block_iter().map(Ipv4Addr::wrap)
    }

    /// True iff this is the loopback address `127.0.0.1`.
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        !self.is_multiple() && self.section.seg(0).matches(127)
    }

    /// True iff every covered address is multicast (`224.0.0.0/4`).
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.section.seg(0).matches_with_prefix_mask(0xe0, 4)
    }

    /// True iff every covered address is in the RFC 1918 private ranges.
    #[must_use]
    pub fn is_private(&self) -> bool {
        let seg0 = self.section.seg(0);
        let seg1 = self.section.seg(1);
        seg0.matches(10)
            || (seg0.matches(172) && seg1.matches_with_prefix_mask(16, 4))
            || (seg0.matches(192) && seg1.matches(168))
    }

    /// True iff every covered address is link-local (`169.254.0.0/16`).
    #[must_use]
    pub fn is_link_local(&self) -> bool {
        self.section.seg(0).matches(169) && self.section.seg(1).matches(254)
    }

    /// True iff this is the single all-ones address.
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

impl Default for Ipv4Addr {
    /// The zero address `0.0.0.0`.
    fn default() -> Ipv4Addr {
        Ipv4Addr::from_u32(0)
    }
}

impl Display for Ipv4Addr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.section, f)
    }
}

impl PartialOrd for Ipv4Addr {
    fn partial_cmp(&self, other: &Ipv4Addr) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ipv4Addr {
    fn cmp(&self, other: &Ipv4Addr) -> Ordering {
        self.section.cmp(&other.section)
    }
}

impl From<std::net::Ipv4Addr> for Ipv4Addr {
    fn from(addr: std::net::Ipv4Addr) -> Ipv4Addr {
        Ipv4Addr::from_octets(addr.octets())
    }
}

impl TryFrom<&Ipv4Addr> for std::net::Ipv4Addr {
    type Error = AddrError;

    /// The single address as the standard library type; subnets do not
    /// convert.
    fn try_from(addr: &Ipv4Addr) -> Result<std::net::Ipv4Addr, AddrError> {
        if addr.is_multiple() {
            return Err(AddrError::invalid(
                Family::Ipv4,
                "a multi-valued subnet has no single std address",
            ));
        }
        Ok(std::net::Ipv4Addr::from(addr.value()))
    }
}

impl TryFrom<Section> for Ipv4Addr {
    type Error = AddrError;

    fn try_from(section: Section) -> Result<Ipv4Addr, AddrError> {
        Ipv4Addr::new(section)
    }
}

impl From<Ipv4Addr> for Section {
    fn from(addr: Ipv4Addr) -> Section {
        addr.section
    }
}
