// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Sequentiality proofs for masking a value range.
//!
//! Masking or or-ing a contiguous range `[lo, up]` with a bit pattern does
//! not always yield a contiguous result. The functions here decide whether
//! it does, and when so, compute the exact result bounds.
//!
//! The AND case: let `h` be the highest bit on which `lo` and `up` differ.
//! Mask bits above `h` apply to a fixed prefix and never tear. Let `t` be
//! the highest set mask bit at or below `h`; every mask bit below `t` must
//! also be set, otherwise the surviving variable bits leave holes. When `t`
//! sits strictly below `h`, the low `t+1` bits of the range wrap, so the
//! range must additionally cover every residue modulo `2^(t+1)` for the
//! masked image to close up into one run. The OR case is the mirror image
//! through the complement of the mask.

/// Result of masking a range: whether the image is one contiguous run, and
/// its bounds when it is. The bounds are meaningless when `sequential` is
/// false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Masked {
    pub(crate) sequential: bool,
    pub(crate) low: u32,
    pub(crate) upper: u32,
}

const fn seq(low: u32, upper: u32) -> Masked {
    Masked {
        sequential: true,
        low,
        upper,
    }
}

const fn torn(low: u32, upper: u32) -> Masked {
    Masked {
        sequential: false,
        low,
        upper,
    }
}

fn top_bit(value: u32) -> u32 {
    debug_assert!(value != 0);
    31 - value.leading_zeros()
}

/// Image of `{x & mask : x in [lo, up]}`.
pub(crate) fn mask_range(lo: u32, up: u32, mask: u32, max: u32) -> Masked {
    debug_assert!(lo <= up && up <= max);
    let mask = mask & max;
    if lo == up || mask == max {
        return seq(lo & mask, up & mask);
    }
    if mask == 0 {
        return seq(0, 0);
    }
    if lo == 0 && up == max {
        // a full range takes the coarse path: every mask bit is free
        return seq(0, mask);
    }
    let h = top_bit(lo ^ up);
    let region = (1u32 << (h + 1)) - 1;
    let differing = mask & region;
    if differing == 0 {
        // every variable bit is cleared, the image is a single value
        return seq(lo & mask, lo & mask);
    }
    let t = top_bit(differing);
    let below = (1u32 << t) - 1;
    if mask & below != below {
        return torn(lo & mask, up & mask);
    }
    if t == h {
        return seq(lo & mask, up & mask);
    }
    // wrap case: bits (t, h] are cleared by the mask, the surviving low bits
    // must cycle through every residue of the modulus
    let modulus = 1u32 << (t + 1);
    let span = up - lo + 1;
    if span >= modulus || (lo % modulus) <= (up % modulus) + 1 {
        let floor = lo & mask & !(modulus - 1);
        return seq(floor, floor | (modulus - 1));
    }
    torn(lo & mask, up & mask)
}

/// Image of `{x | mask : x in [lo, up]}`.
pub(crate) fn or_range(lo: u32, up: u32, mask: u32, max: u32) -> Masked {
    debug_assert!(lo <= up && up <= max);
    let mask = mask & max;
    if lo == up || mask == 0 {
        return seq(lo | mask, up | mask);
    }
    if mask == max {
        return seq(max, max);
    }
    if lo == 0 && up == max {
        return seq(mask, max);
    }
    let complement = !mask & max;
    let h = top_bit(lo ^ up);
    let region = (1u32 << (h + 1)) - 1;
    let differing = complement & region;
    if differing == 0 {
        // every variable bit is forced to one
        return seq(lo | mask, lo | mask);
    }
    let t = top_bit(differing);
    let below = (1u32 << t) - 1;
    if complement & below != below {
        return torn(lo | mask, up | mask);
    }
    if t == h {
        return seq(lo | mask, up | mask);
    }
    let modulus = 1u32 << (t + 1);
    let span = up - lo + 1;
    if span >= modulus || (lo % modulus) <= (up % modulus) + 1 {
        // mask bits at and below t are zero, so the wrapped residues survive
        let floor = (lo | mask) & !(modulus - 1);
        return seq(floor, floor | (modulus - 1));
    }
    torn(lo | mask, up | mask)
}
