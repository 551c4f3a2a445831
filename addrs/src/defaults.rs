// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Network defaults: well-known constants and mask factories, pure
//! functions of the family.

use crate::addr::Addr;
use crate::family::Family;
use crate::ipv4::Ipv4Addr;
use crate::ipv6::Ipv6Addr;
use crate::mac::MacAddr;
use crate::section::Section;

/// The loopback address of an IP family: `127.0.0.1` or `::1`. MAC
/// families have none and yield the zero address.
#[must_use]
pub fn loopback(family: Family) -> Addr {
    match family {
        Family::Ipv4 => Addr::Ipv4(Ipv4Addr::from_u32(0x7f00_0001)),
        Family::Ipv6 => Addr::Ipv6(Ipv6Addr::from_u128(1)),
        Family::Mac48 | Family::Mac64 => any(family),
    }
}

/// The all-zeros "any" address of a family, unprefixed.
#[must_use]
pub fn any(family: Family) -> Addr {
    match family {
        Family::Ipv4 => Addr::Ipv4(Ipv4Addr::from_u32(0)),
        Family::Ipv6 => Addr::Ipv6(Ipv6Addr::from_u128(0)),
        Family::Mac48 => Addr::Mac(MacAddr::from_u64(0)),
        Family::Mac64 => Addr::Mac(MacAddr::from_u64_extended(0)),
    }
}

/// The full address space of a family: every address, as the zero-length
/// prefix block.
#[must_use]
pub fn full_space(family: Family) -> Addr {
    let section = Section::from_value_u128(family, 0, family.seg_count(), 0, Some(0), false);
    Addr::new(section).expect("a full-length section")
}

/// The network mask of `prefix_len` ones followed by zeros, unprefixed.
/// Lengths beyond the family width are clamped.
#[must_use]
pub fn network_mask(family: Family, prefix_len: u8) -> Addr {
    let total = family.bit_count();
    let p = u32::from(prefix_len.min(total));
    let max = if total >= 128 {
        u128::MAX
    } else {
        (1u128 << total) - 1
    };
    let value = if p == 0 {
        0
    } else if p >= 128 {
        max
    } else {
        max & !(max >> p)
    };
    let section = Section::from_value_u128(family, 0, family.seg_count(), value, None, false);
    Addr::new(section).expect("a full-length section")
}

/// The host mask complementing [`network_mask`]: zeros then ones.
#[must_use]
pub fn host_mask(family: Family, prefix_len: u8) -> Addr {
    let total = family.bit_count();
    let p = u32::from(prefix_len.min(total));
    let max = if total >= 128 {
        u128::MAX
    } else {
        (1u128 << total) - 1
    };
    let value = if p >= 128 { 0 } else { max >> p };
    let section = Section::from_value_u128(family, 0, family.seg_count(), value, None, false);
    Addr::new(section).expect("a full-length section")
}
