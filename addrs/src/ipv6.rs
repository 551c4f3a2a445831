// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv6 addresses and subnets, with scope zones.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::count::SetSize;
use crate::errors::AddrError;
use crate::family::Family;
use crate::ipv4::Ipv4Addr;
use crate::mac::MacAddr;
use crate::range::SeqRange;
use crate::section::{Section, Segs};
use crate::seg::{Seg, SegInt};

/// An IPv6 scope zone identifier, the `%eth0` part of `fe80::1%eth0`.
/// Always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Zone(String);

impl Zone {
    /// Wraps a zone identifier.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] for an empty identifier.
    pub fn new(zone: impl Into<String>) -> Result<Zone, AddrError> {
        let zone = zone.into();
        if zone.is_empty() {
            return Err(AddrError::invalid(Family::Ipv6, "empty zone identifier"));
        }
        Ok(Zone(zone))
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An IPv6 address or subnet: eight 16-bit segments, each carrying a value
/// range, an optional prefix length, and an optional zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ipv6Addr {
    section: Section,
    zone: Option<Zone>,
}

impl Ipv6Addr {
    /// Wraps a full-length IPv6 section.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] unless the section is IPv6 with
    /// exactly eight segments.
    pub fn new(section: Section) -> Result<Ipv6Addr, AddrError> {
        if section.family() != Family::Ipv6 || section.seg_count() != Family::Ipv6.seg_count() {
            return Err(AddrError::invalid(
                Family::Ipv6,
                format!(
                    "expected a full-length IPv6 section, got {} {}-segment section",
                    section.family(),
                    section.seg_count()
                ),
            ));
        }
        Ok(Ipv6Addr {
            section,
            zone: None,
        })
    }

    pub(crate) fn wrap(section: Section) -> Ipv6Addr {
        debug_assert_eq!(section.family(), Family::Ipv6);
        debug_assert_eq!(section.seg_count(), 8);
        Ipv6Addr {
            section,
            zone: None,
        }
    }

    fn wrap_zoned(&self, section: Section) -> Ipv6Addr {
        Ipv6Addr {
            section,
            zone: self.zone.clone(),
        }
    }

    /// The address from a 128-bit value.
    #[must_use]
    pub fn from_u128(value: u128) -> Ipv6Addr {
        Ipv6Addr::wrap(Section::from_value_u128(
            Family::Ipv6,
            0,
            8,
            value,
            None,
            false,
        ))
    }

    /// The address from its high and low 64-bit halves.
    #[must_use]
    pub fn from_u64_pair(high: u64, low: u64) -> Ipv6Addr {
        Ipv6Addr::from_u128(u128::from(high) << 64 | u128::from(low))
    }

    /// The address from a 128-bit value with a prefix length applied.
    ///
    /// # Errors
    ///
    /// [`AddrError::PrefixLenOutOfRange`] when `prefix_len` exceeds 128.
    pub fn from_prefixed_u128(value: u128, prefix_len: u16) -> Result<Ipv6Addr, AddrError> {
        if prefix_len > 128 {
            return Err(AddrError::PrefixLenOutOfRange {
                family: Family::Ipv6,
                len: prefix_len,
                max: 128,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let prefix = prefix_len as u8;
        Ok(Ipv6Addr::wrap(Section::from_value_u128(
            Family::Ipv6,
            0,
            8,
            value,
            Some(prefix),
            false,
        )))
    }

    /// The address from bytes per the two's-complement/unsigned ingestion
    /// rules.
    ///
    /// # Errors
    ///
    /// [`AddrError::ValueExceedsSize`] for bytes that are not legal sign
    /// extension.
    pub fn from_bytes(bytes: &[u8]) -> Result<Ipv6Addr, AddrError> {
        Ok(Ipv6Addr::wrap(Section::from_bytes(Family::Ipv6, bytes, None)?))
    }

    /// [`Ipv6Addr::from_bytes`] with a prefix length applied.
    ///
    /// # Errors
    ///
    /// As [`Ipv6Addr::from_bytes`], plus [`AddrError::PrefixLenOutOfRange`].
    pub fn from_prefixed_bytes(bytes: &[u8], prefix_len: u16) -> Result<Ipv6Addr, AddrError> {
        Ok(Ipv6Addr::wrap(Section::from_bytes(
            Family::Ipv6,
            bytes,
            Some(prefix_len),
        )?))
    }

    /// The subnet whose segment bounds come from per-index functions.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] for out-of-range values, plus
    /// prefix errors when `prefix_len` is supplied.
    pub fn from_vals(
        lower: impl Fn(usize) -> SegInt,
        upper: Option<&dyn Fn(usize) -> SegInt>,
        prefix_len: Option<u16>,
    ) -> Result<Ipv6Addr, AddrError> {
        let segs = crate::bytes::segs_from_fns(Family::Ipv6, lower, upper)?;
        Ok(Ipv6Addr::wrap(Section::new(
            Family::Ipv6,
            &segs,
            prefix_len,
            false,
        )?))
    }

    /// The IPv6 link-local address derived from a MAC address: `fe80::/64`
    /// with the EUI-64 interface identifier (universal/local bit flipped,
    /// `ff:fe` inserted for 48-bit MACs).
    ///
    /// # Errors
    ///
    /// [`AddrError::JoinRangeIncompatible`] when the MAC's octet ranges
    /// cannot merge into contiguous hextets.
    pub fn from_mac(mac: &MacAddr) -> Result<Ipv6Addr, AddrError> {
        let m = mac.section();
        let first = m.seg(0);
        if first.is_multiple() {
            // the flipped universal/local bit does not survive a range
            return Err(AddrError::JoinRangeIncompatible {
                family: Family::Ipv6,
                segment: 4,
            });
        }
        let flipped = first.derive(first.low() ^ 0x02, first.low() ^ 0x02, None);
        let join = |hi: Seg, lo: Seg, at: usize| {
            hi.join(&lo, Family::Ipv6)
                .map_err(|_| AddrError::JoinRangeIncompatible {
                    family: Family::Ipv6,
                    segment: at,
                })
        };
        let mut segs = Segs::new();
        segs.push(Seg::hextet(0xfe80));
        segs.push(Seg::hextet(0));
        segs.push(Seg::hextet(0));
        segs.push(Seg::hextet(0));
        if m.seg_count() == 6 {
            // ff:fe splits a 48-bit MAC into an EUI-64 interface id
            segs.push(join(flipped, *m.seg(1), 4)?);
            segs.push(join(*m.seg(2), Seg::octet(0xff), 5)?);
            segs.push(join(Seg::octet(0xfe), *m.seg(3), 6)?);
            segs.push(join(*m.seg(4), *m.seg(5), 7)?);
        } else {
            // an EUI-64 MAC carries all eight octets verbatim
            segs.push(join(flipped, *m.seg(1), 4)?);
            segs.push(join(*m.seg(2), *m.seg(3), 5)?);
            segs.push(join(*m.seg(4), *m.seg(5), 6)?);
            segs.push(join(*m.seg(6), *m.seg(7), 7)?);
        }
        let section = Section::new(Family::Ipv6, &segs, Some(64), false)?;
        Ok(Ipv6Addr::wrap(section))
    }

    /// The IPv4-mapped IPv6 address `::ffff:a.b.c.d`.
    ///
    /// # Errors
    ///
    /// [`AddrError::JoinRangeIncompatible`] when the IPv4 octet ranges
    /// cannot merge into contiguous hextets.
    pub fn from_ipv4_mapped(addr: &Ipv4Addr) -> Result<Ipv6Addr, AddrError> {
        let v4 = addr.section();
        let join = |i: usize, j: usize, at: usize| {
            v4.seg(i)
                .join(v4.seg(j), Family::Ipv6)
                .map_err(|_| AddrError::JoinRangeIncompatible {
                    family: Family::Ipv6,
                    segment: at,
                })
        };
        let mut segs = Segs::new();
        for _ in 0..5 {
            segs.push(Seg::hextet(0));
        }
        segs.push(Seg::hextet(0xffff));
        segs.push(join(0, 1, 6)?);
        segs.push(join(2, 3, 7)?);
        Ok(Ipv6Addr::wrap(Section::new(Family::Ipv6, &segs, None, false)?))
    }

    /// The copy of this address carrying `zone`.
    #[must_use]
    pub fn with_zone(&self, zone: Zone) -> Ipv6Addr {
        Ipv6Addr {
            section: self.section.clone(),
            zone: Some(zone),
        }
    }

    /// The copy of this address without a zone.
    #[must_use]
    pub fn without_zone(&self) -> Ipv6Addr {
        Ipv6Addr {
            section: self.section.clone(),
            zone: None,
        }
    }

    /// The zone, if any.
    #[must_use]
    pub const fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    /// True iff a zone is attached.
    #[must_use]
    pub const fn has_zone(&self) -> bool {
        self.zone.is_some()
    }

    /// The underlying section.
    #[must_use]
    pub const fn section(&self) -> &Section {
        &self.section
    }

    /// The lower bound as a 128-bit value.
    #[must_use]
    pub fn value(&self) -> u128 {
        self.section.value_u128()
    }

    /// The upper bound as a 128-bit value.
    #[must_use]
    pub fn upper_value(&self) -> u128 {
        self.section.upper_value_u128()
    }

    /// The lower bound as high and low 64-bit halves.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn value_u64_pair(&self) -> (u64, u64) {
        let v = self.value();
        ((v >> 64) as u64, v as u64)
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

    /// The lowest covered address, zone preserved.
    #[must_use]
    pub fn lower(&self) -> Ipv6Addr {
        self.wrap_zoned(self.section.lower())
    }

    /// The highest covered address, zone preserved.
    #[must_use]
    pub fn upper(&self) -> Ipv6Addr {
        self.wrap_zoned(self.section.upper())
    }

    /// True iff every address of `other` is covered by this subnet. Zones
    /// must agree: a zoned address contains only addresses of its zone.
    #[must_use]
    pub fn contains(&self, other: &Ipv6Addr) -> bool {
        self.zone == other.zone && self.section.contains(&other.section)
    }

    /// Masks with `mask`, dropping the prefix length; the zone is
    /// preserved.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when a masked segment range
    /// tears.
    pub fn mask(&self, mask: &Ipv6Addr) -> Result<Ipv6Addr, AddrError> {
        Ok(self.wrap_zoned(self.section.mask(&mask.section, false)?))
    }

    /// Masks with `mask`, keeping and re-normalizing the prefix length; the
    /// zone is preserved.
    ///
    /// # Errors
    ///
    /// As [`Ipv6Addr::mask`].
    pub fn mask_prefixed(&self, mask: &Ipv6Addr) -> Result<Ipv6Addr, AddrError> {
        Ok(self.wrap_zoned(self.section.mask(&mask.section, true)?))
    }

    /// Bitwise-ors with `mask`, dropping the prefix length; the zone is
    /// preserved.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when an or-ed segment range
    /// tears.
    pub fn bitwise_or(&self, mask: &Ipv6Addr) -> Result<Ipv6Addr, AddrError> {
        Ok(self.wrap_zoned(self.section.bitwise_or(&mask.section, false)?))
    }

    /// The subnet covering the addresses in both operands.
    #[must_use]
    pub fn intersect(&self, other: &Ipv6Addr) -> Option<Ipv6Addr> {
        self.section
            .intersect(&other.section)
            .expect("full-length operands")
            .map(Ipv6Addr::wrap)
    }

    /// The addresses of this subnet not in `other`, as minimal prefix
    /// blocks, sorted ascending.
    #[must_use]
    pub fn subtract(&self, other: &Ipv6Addr) -> Vec<Ipv6Addr> {
        self.section
            .subtract(&other.section)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv6Addr::wrap)
            .collect()
    }

    /// Minimal prefix blocks covering everything between the lowest and
    /// highest of the two operands.
    #[must_use]
    pub fn span_with_prefix_blocks(&self, other: &Ipv6Addr) -> Vec<Ipv6Addr> {
        self.section
            .span_with_prefix_blocks(&other.section)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv6Addr::wrap)
            .collect()
    }

    /// Merges subnets into minimal prefix blocks covering their union.
    #[must_use]
    pub fn merge_to_prefix_blocks(addrs: &[Ipv6Addr]) -> Vec<Ipv6Addr> {
        let sections: Vec<Section> = addrs.iter().map(|a| a.section.clone()).collect();
        Section::merge_to_prefix_blocks(&sections)
            .expect("full-length operands")
            .into_iter()
            .map(Ipv6Addr::wrap)
            .collect()
    }

    /// The full block of this address's prefix, zone preserved.
    #[must_use]
    pub fn to_prefix_block(&self) -> Ipv6Addr {
        self.wrap_zoned(self.section.to_prefix_block())
    }

    /// The full block of the given prefix length containing this address.
    #[must_use]
    pub fn to_prefix_block_len(&self, prefix_len: u8) -> Ipv6Addr {
        self.wrap_zoned(self.section.to_prefix_block_len(prefix_len))
    }

    /// Applies a prefix length through prefix assignment.
    #[must_use]
    pub fn set_prefix_len(&self, prefix_len: u8) -> Ipv6Addr {
        self.wrap_zoned(self.section.set_prefix_len(prefix_len))
    }

    /// Adjusts the prefix length by a signed delta, zone preserved.
    #[must_use]
    pub fn adjust_prefix_len(&self, delta: i16) -> Ipv6Addr {
        self.wrap_zoned(self.section.adjust_prefix_len(delta))
    }

    /// Drops the prefix length, keeping value ranges and zone.
    #[must_use]
    pub fn without_prefix_len(&self) -> Ipv6Addr {
        self.wrap_zoned(self.section.without_prefix_len())
    }

    /// The address with host bits zeroed, per its prefix; zone preserved.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when zeroing is not expressible
    /// over a ranged segment.
    pub fn to_zero_host(&self) -> Result<Ipv6Addr, AddrError> {
        Ok(self.wrap_zoned(self.section.to_zero_host()?))
    }

    /// The address with host bits set to ones, per its prefix; zone
    /// preserved.
    ///
    /// # Errors
    ///
    /// [`AddrError::MaskRangeIncompatible`] when the result is not
    /// expressible over a ranged segment.
    pub fn to_max_host(&self) -> Result<Ipv6Addr, AddrError> {
        Ok(self.wrap_zoned(self.section.to_max_host()?))
    }

    /// The address `increment` steps into the subnet, or `None` on
    /// overflow. The zone is preserved.
    #[must_use]
    pub fn increment(&self, increment: i64) -> Option<Ipv6Addr> {
        self.section
            .increment(increment)
            .map(|section| self.wrap_zoned(section))
    }

    /// The subnet as a sequential range. The zone is dropped: a range is a
    /// pure run of numeric values.
    #[must_use]
    pub fn to_seq_range(&self) -> SeqRange {
        SeqRange::new(&self.section, &self.section).expect("full-length operands")
    }

    /// Iterates every single address of the subnet, zone preserved.
    pub fn iter(&self) -> impl Iterator<Item = Ipv6Addr> + use<> {
        let zone = self.zone.clone();
        self.section.iter().map(move |section| Ipv6Addr {
            section,
            zone: zone.clone(),
        })
    }

    /// Iterates the distinct prefixes of the subnet, each clipped to the
    /// sub-range it covers; zone preserved.
    pub fn prefix_iter(&self) -> impl Iterator<Item = Ipv6Addr> + use<> {
        let zone = self.zone.clone();
        self.section.prefix_iter().map(move |section| Ipv6Addr {
            section,
            zone: zone.clone(),
        })
    }

    /// Iterates the distinct prefixes as full blocks.
    pub fn prefix_block_iter(&self) -> impl Iterator<Item = Ipv6Addr> + use<> {
        let zone = self.zone.clone();
        self.section.prefix_block_iter().map(move |section| Ipv6Addr {
            section,
            zone: zone.clone(),
        })
    }

    /// Iterates the blocks of the given prefix length within the subnet;
    /// zone preserved.
    pub fn prefix_block_iter_len(&self, prefix_len: u8) -> impl Iterator<Item = Ipv6Addr> + use<> {
        let zone = self.zone.clone();
        self.section
            .prefix_block_iter_len(prefix_len)
            .map(move |section| Ipv6Addr {
                section,
                zone: zone.clone(),
            })
    }

    /// Iterates maximal sequential blocks of the subnet; zone preserved.
    pub fn sequential_block_iter(&self) -> impl Iterator<Item = Ipv6Addr> + use<> {
        let zone = self.zone.clone();
        self.section
            .sequential_block_iter()
            .map(move |section| Ipv6Addr {
                section,
                zone: zone.clone(),
            })
    }

    /// True iff this is the loopback address `::1`.
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        !self.is_multiple() && self.value() == 1
    }

    /// True iff this is the single all-zeros address `::`.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.section.is_zero()
    }

    /// True iff every covered address is multicast (`ff00::/8`).
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.section.seg(0).matches_with_prefix_mask(0xff00, 8)
    }

    /// True iff every covered address is link-local unicast (`fe80::/10`).
    #[must_use]
    pub fn is_link_local(&self) -> bool {
        self.section.seg(0).matches_with_prefix_mask(0xfe80, 10)
    }

    /// True iff every covered address is unique-local (`fc00::/7`).
    #[must_use]
    pub fn is_unique_local(&self) -> bool {
        self.section.seg(0).matches_with_prefix_mask(0xfc00, 7)
    }

    /// True iff the address embeds an IPv4 address as `::ffff:a.b.c.d`.
    #[must_use]
    pub fn is_ipv4_mapped(&self) -> bool {
        self.section.seg(5).matches(0xffff)
            && self.section.segs()[..5].iter().all(|seg| seg.matches(0))
    }

    /// Extracts the embedded IPv4 address of an IPv4-mapped address.
    ///
    /// # Errors
    ///
    /// [`AddrError::AddressValueInvalid`] when the address is not
    /// IPv4-mapped, [`AddrError::ReverseRangeIncompatible`] when a hextet
    /// range cannot split into octet ranges.
    pub fn to_ipv4_mapped(&self) -> Result<Ipv4Addr, AddrError> {
        if !self.is_ipv4_mapped() {
            return Err(AddrError::invalid(
                Family::Ipv6,
                "not an IPv4-mapped address",
            ));
        }
        let mut octets = Vec::with_capacity(4);
        for (i, seg) in [self.section.seg(6), self.section.seg(7)].iter().enumerate() {
            let hi = (seg.low() >> 8, seg.upper() >> 8);
            let lo = (seg.low() & 0xff, seg.upper() & 0xff);
            // a ranged hextet splits only when the high octet is single or
            // the low octet spans fully
            if hi.0 != hi.1 && !(lo.0 == 0 && lo.1 == 0xff) {
                return Err(AddrError::ReverseRangeIncompatible {
                    family: Family::Ipv6,
                    segment: 6 + i,
                });
            }
            octets.push(Seg::ranged(8, hi.0, hi.1, None));
            octets.push(Seg::ranged(8, lo.0, lo.1, None));
        }
        Ok(crate::ipv4::Ipv4Addr::wrap(Section::new(
            Family::Ipv4,
            &octets,
            None,
            false,
        )?))
    }
}

impl Default for Ipv6Addr {
    /// The zero address `::`.
    fn default() -> Ipv6Addr {
        Ipv6Addr::from_u128(0)
    }
}

impl Display for Ipv6Addr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.section, f)?;
        if let Some(zone) = &self.zone {
            write!(f, "%{zone}")?;
        }
        Ok(())
    }
}

impl PartialOrd for Ipv6Addr {
    fn partial_cmp(&self, other: &Ipv6Addr) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ipv6Addr {
    fn cmp(&self, other: &Ipv6Addr) -> Ordering {
        self.section
            .cmp(&other.section)
            .then_with(|| self.zone.cmp(&other.zone))
    }
}

impl From<std::net::Ipv6Addr> for Ipv6Addr {
    fn from(addr: std::net::Ipv6Addr) -> Ipv6Addr {
        Ipv6Addr::from_u128(addr.to_bits())
    }
}

impl TryFrom<&Ipv6Addr> for std::net::Ipv6Addr {
    type Error = AddrError;

    /// The single address as the standard library type; subnets do not
    /// convert and the zone is dropped.
    fn try_from(addr: &Ipv6Addr) -> Result<std::net::Ipv6Addr, AddrError> {
        if addr.is_multiple() {
            return Err(AddrError::invalid(
                Family::Ipv6,
                "a multi-valued subnet has no single std address",
            ));
        }
        Ok(std::net::Ipv6Addr::from_bits(addr.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_and_zone() {
        let loopback = Ipv6Addr::from_u128(1);
        assert!(loopback.is_loopback());
        assert_eq!(loopback.to_string(), "::1");

        let zoned = loopback.with_zone(Zone::new("eth0").expect("non-empty"));
        assert!(zoned.is_loopback());
        assert_eq!(zoned.zone().expect("zoned").as_str(), "eth0");
        assert_eq!(zoned.to_string(), "::1%eth0");

        // the sequential range drops the zone
        let range = zoned.to_seq_range();
        assert_eq!(range.lower().value_u128(), 1);
        assert_eq!(range.count(), SetSize::ONE);
    }

    #[test]
    fn zone_survives_mask_and_or() {
        let zoned = Ipv6Addr::from_u64_pair(0xfe80_0000_0000_0000, 0x1234)
            .with_zone(Zone::new("lo").expect("non-empty"));
        let mask = Ipv6Addr::from_u64_pair(u64::MAX, 0);
        let masked = zoned.mask(&mask).expect("mask applies");
        assert_eq!(masked.zone().expect("kept").as_str(), "lo");
        assert_eq!(masked.value(), 0xfe80_0000_0000_0000_0000_0000_0000_0000);
        let ored = zoned.bitwise_or(&mask).expect("or applies");
        assert!(ored.has_zone());
    }

    #[test]
    fn u64_pair_round_trip() {
        let addr = Ipv6Addr::from_u64_pair(0x2001_0db8_0000_0000, 0xdead_beef);
        assert_eq!(addr.value_u64_pair(), (0x2001_0db8_0000_0000, 0xdead_beef));
        assert_eq!(addr.to_string(), "2001:db8::dead:beef");
    }

    #[test]
    fn prefix_blocks() {
        let block = Ipv6Addr::from_prefixed_u128(0x2001_0db8_u128 << 96, 32).expect("valid");
        assert!(block.section().is_prefix_block());
        assert_eq!(block.count(), SetSize::of_free_bits(96));
        assert_eq!(block.to_string(), "2001:db8::/32");
    }

    #[test]
    fn eui64_link_local_from_mac() {
        let mac = MacAddr::from_bytes(&[0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]).expect("valid");
        let addr = Ipv6Addr::from_mac(&mac).expect("singles join");
        assert_eq!(addr.to_string(), "fe80::21b:44ff:fe11:3ab7/64");
        assert!(addr.is_link_local());
        assert_eq!(addr.prefix_len(), Some(64));
    }

    #[test]
    fn ipv4_mapping_round_trip() {
        let v4 = Ipv4Addr::from_octets([1, 2, 3, 4]);
        let mapped = Ipv6Addr::from_ipv4_mapped(&v4).expect("singles join");
        assert!(mapped.is_ipv4_mapped());
        assert_eq!(mapped.to_string(), "::ffff:102:304");
        let back = mapped.to_ipv4_mapped().expect("splits");
        assert_eq!(back, v4);
    }

    #[test]
    fn full_space_count() {
        let everything = Ipv6Addr::from_vals(|_| 0, Some(&|_| 0xffff), None).expect("valid");
        assert_eq!(everything.count(), SetSize::Ipv6MaxAddrs);
    }

    #[test]
    fn zoned_block_iteration() {
        let block = Ipv6Addr::from_prefixed_u128(0x2001_0db8_u128 << 96, 32)
            .expect("valid")
            .with_zone(Zone::new("eth0").expect("non-empty"));

        let sub_blocks: Vec<Ipv6Addr> = block.prefix_block_iter_len(34).collect();
        assert_eq!(sub_blocks.len(), 4);
        assert!(sub_blocks.iter().all(Ipv6Addr::has_zone));
        assert_eq!(sub_blocks[0].prefix_len(), Some(34));
        assert_eq!(sub_blocks[3].value(), 0x2001_0db8_u128 << 96 | 3u128 << 94);

        let sequential: Vec<Ipv6Addr> = block.sequential_block_iter().collect();
        assert_eq!(sequential.len(), 1);
        assert!(sequential[0].has_zone());

        let prefixes: Vec<Ipv6Addr> = block.prefix_iter().collect();
        assert_eq!(prefixes.len(), 1);

        let adjusted = block.adjust_prefix_len(-16);
        assert_eq!(adjusted.prefix_len(), Some(16));
        assert!(adjusted.has_zone());
    }
}
