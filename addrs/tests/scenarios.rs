// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! End-to-end behavior over the public API: prefix blocks, mask algebra,
//! range algebra and zones working together.

use addrs::count::SetSize;
use addrs::defaults;
use addrs::errors::AddrError;
use addrs::family::Family;
use addrs::ipv4::Ipv4Addr;
use addrs::ipv6::{Ipv6Addr, Zone};

#[test]
fn prefixed_single_and_its_block() {
    // 1.2.3.4/24 is one address carrying a prefix
    let addr = Ipv4Addr::from_prefixed_u32(0x0102_0304, 24).expect("valid prefix");
    assert_eq!(addr.prefix_len(), Some(24));
    assert!(!addr.section().is_prefix_block());
    assert_eq!(addr.count(), SetSize::ONE);

    // its block is 1.2.3.0/24 with 256 addresses
    let block = addr.to_prefix_block();
    assert_eq!(block.to_string(), "1.2.3.0/24");
    assert_eq!(block.count(), SetSize::U128(256));
    assert!(block.section().is_prefix_block());
}

#[test]
fn block_iteration_at_a_longer_prefix() {
    // 1.2.0.0/16 is a prefix block; its /24 sub-blocks number 256
    let block = Ipv4Addr::from_prefixed_u32(0x0102_0000, 16).expect("valid prefix");
    assert!(block.section().is_prefix_block());

    let sub_blocks: Vec<Ipv4Addr> = block.prefix_block_iter_len(24).collect();
    assert_eq!(sub_blocks.len(), 256);
    assert_eq!(sub_blocks[0].to_string(), "1.2.0.0/24");
    assert_eq!(sub_blocks[255].to_string(), "1.2.255.0/24");
    assert!(sub_blocks.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn mask_compatibility() {
    // masking 1.2.3.4-200 with 255.255.255.240 tears
    let subnet = Ipv4Addr::from_vals(
        |i| [1u16, 2, 3, 4][i],
        Some(&|i: usize| [1u16, 2, 3, 200][i]),
        None,
    )
    .expect("valid subnet");
    let mask = Ipv4Addr::from_octets([255, 255, 255, 240]);
    let err = subnet.mask(&mask).expect_err("discontiguous mask");
    assert!(matches!(
        err,
        AddrError::MaskRangeIncompatible { segment: 3, .. }
    ));

    // masking 1.2.3.0-255 with 255.255.255.0 gives 1.2.3.0
    let subnet = Ipv4Addr::from_vals(
        |i| [1u16, 2, 3, 0][i],
        Some(&|i: usize| [1u16, 2, 3, 255][i]),
        None,
    )
    .expect("valid subnet");
    let mask = Ipv4Addr::from_octets([255, 255, 255, 0]);
    let masked = subnet.mask(&mask).expect("compatible mask");
    assert!(!masked.is_multiple());
    assert_eq!(masked.to_string(), "1.2.3.0");
}

#[test]
fn subtraction_into_minimal_blocks() {
    let whole = Ipv4Addr::from_prefixed_u32(0x0102_0000, 16).expect("valid prefix");
    let hole = Ipv4Addr::from_prefixed_u32(0x0102_0300, 24).expect("valid prefix");
    let remainder = whole.subtract(&hole);

    // the remainder covers 1.2.0.0-1.2.2.255 and 1.2.4.0-1.2.255.255
    let total: SetSize = remainder.iter().map(Ipv4Addr::count).sum();
    assert_eq!(total, SetSize::U128((1 << 16) - 256));
    assert!(remainder.windows(2).all(|w| w[0] < w[1]));
    assert!(remainder.iter().all(|piece| piece.section().is_prefix_block()));
    assert!(remainder.iter().all(|piece| whole.contains(piece)));
    assert!(remainder.iter().all(|piece| piece.intersect(&hole).is_none()));

    // subtract/intersect partition the original set
    let overlap = whole.intersect(&hole).expect("hole is inside");
    assert_eq!(total + overlap.count(), whole.count());
}

#[test]
fn merging_adjacent_blocks() {
    let a = Ipv4Addr::from_prefixed_u32(0x0102_0300, 24).expect("valid prefix");
    let b = Ipv4Addr::from_prefixed_u32(0x0102_0200, 24).expect("valid prefix");
    let merged = Ipv4Addr::merge_to_prefix_blocks(&[a, b]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].to_string(), "1.2.2.0/23");
}

#[test]
fn zones_across_operations() {
    let loopback = Ipv6Addr::from_u128(1);
    assert!(loopback.is_loopback());

    let zoned = loopback.with_zone(Zone::new("eth0").expect("non-empty zone"));
    assert!(zoned.is_loopback());
    assert_eq!(zoned.zone().expect("zoned").as_str(), "eth0");
    assert_eq!(zoned.to_string(), "::1%eth0");

    // zone survives masking
    let mask = Ipv6Addr::from_vals(|_| 0xffff, None, None).expect("valid mask");
    let masked = zoned.mask(&mask).expect("identity mask");
    assert!(masked.has_zone());

    // conversion to a sequential range strips the zone
    let range = zoned.to_seq_range();
    assert_eq!(range.lower().value_u128(), 1);
    assert_eq!(range.count(), SetSize::ONE);
}

#[test]
fn span_minimality_on_exact_blocks() {
    let block = Ipv4Addr::from_prefixed_u32(0x0a00_0000, 8).expect("valid prefix");
    let spanned = block.span_with_prefix_blocks(&block);
    assert_eq!(spanned.len(), 1);
    assert_eq!(spanned[0].to_string(), "10.0.0.0/8");
}

#[test]
fn prefix_boundaries() {
    // prefix 0: the whole space
    let everything = Ipv4Addr::from_prefixed_u32(0, 0).expect("valid prefix");
    assert_eq!(everything.count(), SetSize::U128(1 << 32));
    assert_eq!(everything.lower().value(), 0);
    assert_eq!(everything.upper().value(), u32::MAX);

    // prefix = bit count: a single address that is its own block
    let single = Ipv4Addr::from_prefixed_u32(0x0102_0304, 32).expect("valid prefix");
    assert_eq!(single.count(), SetSize::ONE);
    assert!(single.section().is_prefix_block());

    // out of range
    assert!(matches!(
        Ipv4Addr::from_prefixed_u32(0, 33),
        Err(AddrError::PrefixLenOutOfRange { len: 33, .. })
    ));
}

#[test]
fn byte_round_trip_law() {
    for bytes in [[1u8, 2, 3, 4], [0, 0, 0, 0], [255, 255, 255, 255], [127, 0, 0, 1]] {
        let addr = Ipv4Addr::from_bytes(&bytes).expect("valid bytes");
        assert_eq!(addr.section().bytes(), &bytes);
    }
    let bytes: Vec<u8> = (1..=16).collect();
    let addr = Ipv6Addr::from_bytes(&bytes).expect("valid bytes");
    assert_eq!(addr.section().bytes(), bytes.as_slice());
}

#[test]
fn increment_walks_the_subnet() {
    let block = Ipv4Addr::from_prefixed_u32(0x0102_0300, 24).expect("valid prefix");
    let block = block.to_prefix_block();
    let tenth = block.increment(10).expect("in range");
    assert_eq!(tenth.lower().value(), 0x0102_030a);
    let past = block.increment(256).expect("just past the top");
    assert_eq!(past.lower().value(), 0x0102_0400);
    let below = block.increment(-1).expect("just below");
    assert_eq!(below.lower().value(), 0x0102_02ff);
}

#[test]
fn sequential_range_prints_canonical_notation() {
    let lo = Ipv4Addr::from_u32(0x0102_0000);
    let hi = Ipv4Addr::from_u32(0x0102_02ff);
    let range = addrs::SeqRange::new(lo.section(), hi.section()).expect("same sizes");
    assert_eq!(range.to_string(), "1.2.0.0-1.2.2.255");

    let block = Ipv4Addr::from_prefixed_u32(0x0102_0300, 24).expect("valid prefix");
    let range = block.to_prefix_block().to_seq_range();
    assert_eq!(range.to_string(), "1.2.3.0-1.2.3.255");
}

#[test]
fn sequential_range_to_blocks() {
    let lo = Ipv4Addr::from_u32(0x0102_0304);
    let hi = Ipv4Addr::from_u32(0x0102_0506);
    let range = lo.to_seq_range().join(&hi.to_seq_range());
    assert!(range.is_none()); // disjoint singles do not join

    let spanned = lo.span_with_prefix_blocks(&hi);
    let total: SetSize = spanned.iter().map(Ipv4Addr::count).sum();
    assert_eq!(total, SetSize::U128(0x0102_0506 - 0x0102_0304 + 1));
    assert!(spanned.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn network_defaults_compose_with_masking() {
    let addr = Ipv4Addr::from_u32(0x0102_0304);
    let mask = defaults::network_mask(Family::Ipv4, 16);
    let masked = addr
        .mask(mask.to_ipv4().expect("v4 mask"))
        .expect("mask applies");
    assert_eq!(masked.to_string(), "1.2.0.0");

    let host = defaults::host_mask(Family::Ipv4, 16);
    let ored = addr
        .bitwise_or(host.to_ipv4().expect("v4 mask"))
        .expect("or applies");
    assert_eq!(ored.to_string(), "1.2.255.255");
}

#[test]
fn full_space_subnet() {
    let space = defaults::full_space(Family::Ipv4);
    let space4 = space.to_ipv4().expect("v4");
    assert!(space4.is_multiple());
    assert_eq!(space4.count(), SetSize::U128(1 << 32));
    // subtracting everything leaves nothing
    assert!(space4.subtract(space4).is_empty());
}
