// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Cardinality of address sets.
//!
//! Every set this crate can represent fits in a `u128` except the full IPv6
//! space, which holds exactly 2^128 addresses. `SetSize` keeps that one case
//! explicit instead of silently wrapping.

use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, MulAssign};

/// Number of addresses (or blocks) in a set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum SetSize {
    /// An exact count.
    U128(u128),
    /// 2^128, the size of the full IPv6 address space.
    Ipv6MaxAddrs,
}

impl SetSize {
    /// The empty count.
    pub const ZERO: SetSize = SetSize::U128(0);
    /// The count of a single address.
    pub const ONE: SetSize = SetSize::U128(1);

    /// `2^free_bits`, the size of a prefix block with that many host bits.
    #[must_use]
    pub fn of_free_bits(free_bits: u8) -> SetSize {
        if free_bits >= 128 {
            SetSize::Ipv6MaxAddrs
        } else {
            SetSize::U128(1u128 << free_bits)
        }
    }

    /// The exact count, or `None` for the full IPv6 space.
    #[must_use]
    pub fn as_u128(self) -> Option<u128> {
        match self {
            SetSize::U128(size) => Some(size),
            SetSize::Ipv6MaxAddrs => None,
        }
    }

    /// True iff the count is exactly one.
    #[must_use]
    pub fn is_one(self) -> bool {
        self == SetSize::ONE
    }
}

impl From<u128> for SetSize {
    fn from(size: u128) -> Self {
        SetSize::U128(size)
    }
}

impl Add for SetSize {
    type Output = SetSize;

    fn add(self, other: SetSize) -> SetSize {
        match (self, other) {
            (SetSize::U128(size), SetSize::U128(other_size)) => match size.checked_add(other_size) {
                Some(sum) => SetSize::U128(sum),
                // the only representable overflow target is the full space
                None => SetSize::Ipv6MaxAddrs,
            },
            _ => SetSize::Ipv6MaxAddrs,
        }
    }
}

impl AddAssign for SetSize {
    fn add_assign(&mut self, other: SetSize) {
        *self = *self + other;
    }
}

impl Mul for SetSize {
    type Output = SetSize;

    fn mul(self, other: SetSize) -> SetSize {
        match (self, other) {
            (SetSize::U128(0), _) | (_, SetSize::U128(0)) => SetSize::ZERO,
            (SetSize::U128(size), SetSize::U128(other_size)) => match size.checked_mul(other_size) {
                Some(product) => SetSize::U128(product),
                None => SetSize::Ipv6MaxAddrs,
            },
            _ => SetSize::Ipv6MaxAddrs,
        }
    }
}

impl MulAssign for SetSize {
    fn mul_assign(&mut self, other: SetSize) {
        *self = *self * other;
    }
}

impl Sum for SetSize {
    fn sum<I: Iterator<Item = SetSize>>(iter: I) -> SetSize {
        iter.fold(SetSize::ZERO, Add::add)
    }
}

impl Display for SetSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetSize::U128(size) => write!(f, "{size}"),
            SetSize::Ipv6MaxAddrs => write!(f, "2^128"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_puts_full_space_last() {
        assert!(SetSize::U128(u128::MAX) < SetSize::Ipv6MaxAddrs);
        assert!(SetSize::ZERO < SetSize::ONE);
    }

    #[test]
    fn multiplication_saturates_to_full_space() {
        let half = SetSize::of_free_bits(127);
        assert_eq!(half * SetSize::U128(2), SetSize::Ipv6MaxAddrs);
        assert_eq!(half * SetSize::ZERO, SetSize::ZERO);
        assert_eq!(SetSize::of_free_bits(128), SetSize::Ipv6MaxAddrs);
    }

    #[test]
    fn sums_accumulate() {
        let total: SetSize = [SetSize::U128(3), SetSize::U128(4)].into_iter().sum();
        assert_eq!(total, SetSize::U128(7));
    }
}
