// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address family constants.

use std::fmt::{Display, Formatter};

/// The address families understood by this crate.
///
/// A family fixes the segment geometry of an address: how many segments a
/// full address has, how wide each segment is, and how the address is
/// conventionally written.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Family {
    /// 32-bit IPv4, four 8-bit segments.
    Ipv4,
    /// 128-bit IPv6, eight 16-bit segments.
    Ipv6,
    /// 48-bit MAC, six 8-bit segments.
    Mac48,
    /// 64-bit EUI-64 MAC, eight 8-bit segments.
    Mac64,
}

impl Family {
    /// Total bit count of a full address of this family.
    #[must_use]
    pub const fn bit_count(self) -> u8 {
        match self {
            Family::Ipv4 => 32,
            Family::Ipv6 => 128,
            Family::Mac48 => 48,
            Family::Mac64 => 64,
        }
    }

    /// Total byte count of a full address of this family.
    #[must_use]
    pub const fn byte_count(self) -> usize {
        self.bit_count() as usize / 8
    }

    /// Number of segments in a full address of this family.
    #[must_use]
    pub const fn seg_count(self) -> usize {
        match self {
            Family::Ipv4 => 4,
            Family::Ipv6 => 8,
            Family::Mac48 => 6,
            Family::Mac64 => 8,
        }
    }

    /// Bit width of one segment.
    #[must_use]
    pub const fn bits_per_seg(self) -> u8 {
        match self {
            Family::Ipv6 => 16,
            Family::Ipv4 | Family::Mac48 | Family::Mac64 => 8,
        }
    }

    /// Byte width of one segment.
    #[must_use]
    pub const fn bytes_per_seg(self) -> usize {
        self.bits_per_seg() as usize / 8
    }

    /// Largest value one segment can hold.
    #[must_use]
    pub const fn max_seg_value(self) -> u16 {
        match self {
            Family::Ipv6 => 0xffff,
            Family::Ipv4 | Family::Mac48 | Family::Mac64 => 0xff,
        }
    }

    /// Radix used when segments are written as text.
    #[must_use]
    pub const fn text_radix(self) -> u32 {
        match self {
            Family::Ipv4 => 10,
            Family::Ipv6 | Family::Mac48 | Family::Mac64 => 16,
        }
    }

    /// Canonical separator between written segments.
    #[must_use]
    pub const fn separator(self) -> char {
        match self {
            Family::Ipv4 => '.',
            Family::Ipv6 | Family::Mac48 | Family::Mac64 => ':',
        }
    }

    /// True for the two IP families.
    #[must_use]
    pub const fn is_ip(self) -> bool {
        matches!(self, Family::Ipv4 | Family::Ipv6)
    }

    /// True for the two MAC families.
    #[must_use]
    pub const fn is_mac(self) -> bool {
        matches!(self, Family::Mac48 | Family::Mac64)
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Ipv4 => write!(f, "IPv4"),
            Family::Ipv6 => write!(f, "IPv6"),
            Family::Mac48 => write!(f, "MAC-48"),
            Family::Mac64 => write!(f, "MAC-64"),
        }
    }
}
