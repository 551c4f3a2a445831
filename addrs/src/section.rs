// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address sections.
//!
//! A [`Section`] is an ordered run of same-width segments belonging to one
//! family, optionally carrying a section-level prefix length. A section may
//! be a full address or a slice of one (`start_index` records the offset of
//! its first segment within the full address).
//!
//! Sections are immutable; every operation returns a new section. Derived
//! data (byte forms, counts, mask classification) is memoized in atomic
//! publication slots: a reader either sees an empty slot or a fully built
//! value, and racing writers publish equal values, so whichever lands first
//! wins.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use arrayvec::ArrayVec;

use crate::count::SetSize;
use crate::errors::AddrError;
use crate::family::Family;
use crate::seg::{Seg, SegInt};

pub mod iter;
mod mask;
mod prefix;

pub use iter::{BlockIter, PrefixBlockIter, PrefixIter, SectionIter};

/// Largest segment count of any family (IPv6 and MAC-64).
pub const MAX_SEGS: usize = 8;

pub(crate) type Segs = ArrayVec<Seg, MAX_SEGS>;

/// Byte images of a section's lower and upper bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionBytes {
    pub(crate) lower: ArrayVec<u8, 16>,
    pub(crate) upper: ArrayVec<u8, 16>,
}

/// Memoized mask classification of a section (§ network and host mask
/// prefix lengths).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MaskLens {
    pub(crate) network: Option<u8>,
    pub(crate) host: Option<u8>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Cache {
    bytes: OnceLock<SectionBytes>,
    count: OnceLock<SetSize>,
    prefix_count: OnceLock<SetSize>,
    mask_lens: OnceLock<MaskLens>,
}

/// Race-friendly memoization: compute outside any lock, publish, and read
/// back whichever equal value landed first.
pub(crate) fn publish<T>(slot: &OnceLock<T>, compute: impl FnOnce() -> T) -> &T {
    if let Some(cached) = slot.get() {
        return cached;
    }
    let fresh = compute();
    let _ = slot.set(fresh);
    slot.get().expect("slot was just filled")
}

/// An ordered run of same-width segments of one family.
#[derive(Debug, Clone)]
pub struct Section {
    family: Family,
    start: u8,
    segs: Segs,
    prefix: Option<u8>,
    multiple: bool,
    cache: Cache,
}

impl Section {
    /// Builds a section from segments, applying prefix assignment.
    ///
    /// When `single_only` is set the section never re-forms into a prefix
    /// block even if the segments would qualify: `(low, upper)` are kept
    /// exactly as supplied.
    ///
    /// # Errors
    ///
    /// Returns [`AddrError::AddressValueInvalid`] for a segment count or
    /// width outside the family, and [`AddrError::PrefixLenOutOfRange`] for
    /// a prefix beyond the section's bit count.
    pub fn new(
        family: Family,
        segs: &[Seg],
        prefix: Option<u16>,
        single_only: bool,
    ) -> Result<Section, AddrError> {
        Section::new_at(family, 0, segs, prefix, single_only)
    }

    /// [`Section::new`] for a slice starting at segment `start` of the full
    /// address.
    pub(crate) fn new_at(
        family: Family,
        start: u8,
        segs: &[Seg],
        prefix: Option<u16>,
        single_only: bool,
    ) -> Result<Section, AddrError> {
        if segs.len() > family.seg_count() {
            return Err(AddrError::invalid(
                family,
                format!(
                    "{} segments exceed the {} limit of {}",
                    segs.len(),
                    family,
                    family.seg_count()
                ),
            ));
        }
        for seg in segs {
            if seg.bit_count() != family.bits_per_seg() {
                return Err(AddrError::invalid(
                    family,
                    format!(
                        "segment width {} does not match the family width {}",
                        seg.bit_count(),
                        family.bits_per_seg()
                    ),
                ));
            }
        }
        let total_bits = Self::bits_of(family, segs.len());
        let prefix = match prefix {
            Some(len) => {
                if len > u16::from(total_bits) {
                    return Err(AddrError::PrefixLenOutOfRange {
                        family,
                        len,
                        max: total_bits,
                    });
                }
                #[allow(clippy::cast_possible_truncation)]
                let len = len as u8;
                Some(len)
            }
            None => None,
        };
        let segs: Segs = segs.iter().copied().collect();
        Ok(prefix::assign(family, start, segs, prefix, single_only))
    }

    /// Internal constructor for segments whose geometry is already valid.
    pub(crate) fn from_parts(
        family: Family,
        start: u8,
        segs: Segs,
        prefix: Option<u8>,
    ) -> Section {
        let multiple = segs.iter().any(Seg::is_multiple);
        Section {
            family,
            start,
            segs,
            prefix,
            multiple,
            cache: Cache::default(),
        }
    }

    /// A section of the same shape with new segments, re-running prefix
    /// assignment.
    pub(crate) fn derive_prefixed(
        &self,
        segs: Segs,
        prefix: Option<u8>,
        single_only: bool,
    ) -> Section {
        prefix::assign(self.family, self.start, segs, prefix, single_only)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn bits_of(family: Family, seg_count: usize) -> u8 {
        (seg_count * usize::from(family.bits_per_seg())) as u8
    }

    /// The family of the section.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// Offset of the first segment within a full address of the family.
    #[must_use]
    pub const fn start_index(&self) -> u8 {
        self.start
    }

    /// Number of segments in the section.
    #[must_use]
    pub fn seg_count(&self) -> usize {
        self.segs.len()
    }

    /// Total bit count over all segments.
    #[must_use]
    pub fn bit_count(&self) -> u8 {
        Self::bits_of(self.family, self.segs.len())
    }

    /// Bit width of one segment.
    #[must_use]
    pub const fn bits_per_seg(&self) -> u8 {
        self.family.bits_per_seg()
    }

    /// The segment at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of bounds, as slice indexing does.
    #[must_use]
    pub fn seg(&self, index: usize) -> &Seg {
        &self.segs[index]
    }

    /// All segments in order.
    #[must_use]
    pub fn segs(&self) -> &[Seg] {
        &self.segs
    }

    /// The section-level prefix length, if any.
    #[must_use]
    pub const fn prefix_len(&self) -> Option<u8> {
        self.prefix
    }

    /// True iff any segment holds more than one value.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// True iff every segment's range is `[0, max]`.
    #[must_use]
    pub fn is_full_range(&self) -> bool {
        self.segs.iter().all(Seg::is_full_range)
    }

    /// True iff the lower bound is the all-zeros value.
    #[must_use]
    pub fn includes_zero(&self) -> bool {
        self.segs.iter().all(Seg::includes_zero)
    }

    /// True iff the upper bound is the all-ones value.
    #[must_use]
    pub fn includes_max(&self) -> bool {
        self.segs.iter().all(Seg::includes_max)
    }

    /// True iff the section is exactly the all-zeros single value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        !self.multiple && self.includes_zero()
    }

    /// True iff the section is exactly the all-ones single value.
    #[must_use]
    pub fn is_max(&self) -> bool {
        !self.multiple && self.includes_max()
    }

    /// True iff the section's values form one contiguous numeric run: after
    /// the first multi-valued segment every further segment is full-range.
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        match self.segs.iter().position(Seg::is_multiple) {
            None => true,
            Some(first) => self.segs[first + 1..].iter().all(Seg::is_full_range),
        }
    }

    /// Number of addresses covered by the section.
    #[must_use]
    pub fn count(&self) -> SetSize {
        *publish(&self.cache.count, || {
            self.segs
                .iter()
                .map(|seg| SetSize::U128(u128::from(seg.count())))
                .fold(SetSize::ONE, |acc, c| acc * c)
        })
    }

    /// Number of distinct prefixes in the section, per the section prefix.
    /// Without a prefix this equals [`Section::count`].
    #[must_use]
    pub fn prefix_count(&self) -> SetSize {
        *publish(&self.cache.prefix_count, || match self.prefix {
            None => self.count(),
            Some(p) => self.prefix_count_len(p),
        })
    }

    /// Number of distinct prefixes of length `prefix_len` in the section.
    #[must_use]
    pub fn prefix_count_len(&self, prefix_len: u8) -> SetSize {
        let p = u16::from(prefix_len.min(self.bit_count()));
        let bits = self.bits_per_seg();
        let mut total = SetSize::ONE;
        for (i, seg) in self.segs.iter().enumerate() {
            let seg_start = u16::from(Self::bits_of(self.family, i));
            if p <= seg_start {
                break;
            }
            #[allow(clippy::cast_possible_truncation)]
            let net_bits = ((p - seg_start) as u8).min(bits);
            let shift = bits - net_bits;
            let values = u128::from(seg.upper() >> shift) - u128::from(seg.low() >> shift) + 1;
            total *= SetSize::U128(values);
        }
        total
    }

    /// Number of distinct leading-`seg_count`-segment combinations.
    #[must_use]
    pub fn block_count(&self, seg_count: usize) -> SetSize {
        self.segs
            .iter()
            .take(seg_count)
            .map(|seg| SetSize::U128(u128::from(seg.count())))
            .fold(SetSize::ONE, |acc, c| acc * c)
    }

    /// The lowest single value of the section, with bounds kept exact.
    #[must_use]
    pub fn lower(&self) -> Section {
        let segs: Segs = self
            .segs
            .iter()
            .map(|seg| seg.derive(seg.low(), seg.low(), seg.seg_prefix()))
            .collect();
        self.derive_single(segs)
    }

    /// The highest single value of the section, with bounds kept exact.
    #[must_use]
    pub fn upper(&self) -> Section {
        let segs: Segs = self
            .segs
            .iter()
            .map(|seg| seg.derive(seg.upper(), seg.upper(), seg.seg_prefix()))
            .collect();
        self.derive_single(segs)
    }

    fn derive_single(&self, segs: Segs) -> Section {
        if !self.multiple {
            return self.clone();
        }
        prefix::assign(self.family, self.start, segs, self.prefix, true)
    }

    /// The lower bound as a big-endian integer.
    #[must_use]
    pub fn value_u128(&self) -> u128 {
        self.segs.iter().fold(0u128, |acc, seg| {
            acc << self.bits_per_seg() | u128::from(seg.low())
        })
    }

    /// The upper bound as a big-endian integer.
    #[must_use]
    pub fn upper_value_u128(&self) -> u128 {
        self.segs.iter().fold(0u128, |acc, seg| {
            acc << self.bits_per_seg() | u128::from(seg.upper())
        })
    }

    /// Rebuilds a single-valued section of this shape from an integer.
    pub(crate) fn from_value_u128(
        family: Family,
        start: u8,
        seg_count: usize,
        value: u128,
        prefix: Option<u8>,
        single_only: bool,
    ) -> Section {
        let bits = family.bits_per_seg();
        let mut segs = Segs::new();
        for i in 0..seg_count {
            let shift = (seg_count - 1 - i) * usize::from(bits);
            #[allow(clippy::cast_possible_truncation)]
            let v = ((value >> shift) as u32 & ((1u32 << bits) - 1)) as SegInt;
            segs.push(Seg::ranged(bits, v, v, None));
        }
        prefix::assign(family, start, segs, prefix, single_only)
    }

    /// The lower bound as big-endian bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &publish(&self.cache.bytes, || self.calc_bytes()).lower
    }

    /// The upper bound as big-endian bytes.
    #[must_use]
    pub fn upper_bytes(&self) -> &[u8] {
        &publish(&self.cache.bytes, || self.calc_bytes()).upper
    }

    fn calc_bytes(&self) -> SectionBytes {
        let mut lower = ArrayVec::new();
        let mut upper = ArrayVec::new();
        for seg in &self.segs {
            #[allow(clippy::cast_possible_truncation)]
            if self.bits_per_seg() == 16 {
                lower.push((seg.low() >> 8) as u8);
                lower.push(seg.low() as u8);
                upper.push((seg.upper() >> 8) as u8);
                upper.push(seg.upper() as u8);
            } else {
                lower.push(seg.low() as u8);
                upper.push(seg.upper() as u8);
            }
        }
        SectionBytes { lower, upper }
    }

    /// True iff every address of `other` lies in this section.
    ///
    /// Containment is segment-wise: both sections must have the same family
    /// and segment count.
    #[must_use]
    pub fn contains(&self, other: &Section) -> bool {
        self.family == other.family
            && self.segs.len() == other.segs.len()
            && self
                .segs
                .iter()
                .zip(other.segs.iter())
                .all(|(mine, theirs)| mine.contains(theirs))
    }

    /// True iff the two sections share at least one address.
    #[must_use]
    pub fn overlaps(&self, other: &Section) -> bool {
        self.family == other.family
            && self.segs.len() == other.segs.len()
            && self
                .segs
                .iter()
                .zip(other.segs.iter())
                .all(|(mine, theirs)| {
                    mine.low().max(theirs.low()) <= mine.upper().min(theirs.upper())
                })
    }

    /// True iff every address in this section agrees with `other` after
    /// masking both with `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`AddrError::SizeMismatch`] for mismatched segment counts.
    pub fn matches_with_mask(&self, other: &Section, mask: &Section) -> Result<bool, AddrError> {
        self.check_counts(other)?;
        self.check_counts(mask)?;
        for i in 0..self.segs.len() {
            let m = mask.segs[i].low();
            let want = other.segs[i].low() & m;
            if self.segs[i].low() & m != want || self.segs[i].upper() & m != want {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn check_counts(&self, other: &Section) -> Result<(), AddrError> {
        if self.family != other.family || self.segs.len() != other.segs.len() {
            return Err(AddrError::SizeMismatch {
                family: self.family,
                left: self.segs.len(),
                right: other.segs.len(),
            });
        }
        Ok(())
    }

    /// True iff `other` agrees with this section on every network bit of
    /// this section's prefix. Without a prefix the values must be equal.
    #[must_use]
    pub fn prefix_equals(&self, other: &Section) -> bool {
        if self.family != other.family || self.segs.len() != other.segs.len() {
            return false;
        }
        let mask = self.network_value_mask();
        self.value_u128() & mask == other.value_u128() & mask
            && self.upper_value_u128() & mask == other.upper_value_u128() & mask
    }

    /// True iff every network-bit value of `other` falls within this
    /// section's network-bit range, per this section's prefix.
    #[must_use]
    pub fn prefix_contains(&self, other: &Section) -> bool {
        if self.family != other.family || self.segs.len() != other.segs.len() {
            return false;
        }
        let mask = self.network_value_mask();
        self.value_u128() & mask <= other.value_u128() & mask
            && other.upper_value_u128() & mask <= self.upper_value_u128() & mask
    }

    fn network_value_mask(&self) -> u128 {
        let total = u32::from(self.bit_count());
        let p = u32::from(self.prefix.unwrap_or(self.bit_count()));
        let width_mask = if total >= 128 {
            u128::MAX
        } else {
            (1u128 << total) - 1
        };
        if p == 0 {
            0
        } else if p >= 128 {
            width_mask
        } else {
            width_mask & !(width_mask >> p)
        }
    }

    /// The leading slice holding the network bits of this section's prefix;
    /// the whole section when no prefix is present.
    #[must_use]
    pub fn network_section(&self) -> Section {
        self.network_section_len(self.prefix.unwrap_or(self.bit_count()))
    }

    /// The leading slice holding the first `prefix_len` bits: every segment
    /// the boundary touches is included.
    #[must_use]
    pub fn network_section_len(&self, prefix_len: u8) -> Section {
        let p = usize::from(prefix_len.min(self.bit_count()));
        let bits = usize::from(self.bits_per_seg());
        let seg_count = p.div_ceil(bits);
        self.sub_section(0, seg_count)
    }

    /// The trailing slice holding the host bits of this section's prefix;
    /// the whole section when no prefix is present.
    #[must_use]
    pub fn host_section(&self) -> Section {
        self.host_section_len(self.prefix.unwrap_or(0))
    }

    /// The trailing slice beginning at the first segment holding host bits
    /// beyond `prefix_len`.
    #[must_use]
    pub fn host_section_len(&self, prefix_len: u8) -> Section {
        let p = usize::from(prefix_len.min(self.bit_count()));
        let bits = usize::from(self.bits_per_seg());
        self.trailing_section(p / bits)
    }

    /// The trailing slice of the section starting at segment `index`.
    #[must_use]
    pub fn trailing_section(&self, index: usize) -> Section {
        self.sub_section(index, self.segs.len())
    }

    /// The slice of segments `[index, end_index)` as its own section.
    ///
    /// The slice keeps the per-segment prefixes it inherits, so a slice of a
    /// prefixed section is itself prefixed where the boundary falls inside
    /// it.
    ///
    /// # Panics
    ///
    /// Panics when the bounds are out of range or reversed.
    #[must_use]
    pub fn sub_section(&self, index: usize, end_index: usize) -> Section {
        assert!(index <= end_index && end_index <= self.segs.len());
        let segs: Segs = self.segs[index..end_index].iter().copied().collect();
        let prefix = self.prefix.and_then(|p| {
            let cut = u16::from(Self::bits_of(self.family, index));
            let width = u16::from(Self::bits_of(self.family, end_index - index));
            #[allow(clippy::cast_possible_truncation)]
            let local = u16::from(p).saturating_sub(cut).min(width) as u8;
            (u16::from(p) <= cut + width).then_some(local)
        });
        #[allow(clippy::cast_possible_truncation)]
        let start = self.start + index as u8;
        Section::from_parts(self.family, start, segs, prefix)
    }

    /// Total order: family, then segment count, then lower value, then upper
    /// value, then prefix length with longer prefixes first.
    #[must_use]
    pub fn compare(&self, other: &Section) -> Ordering {
        self.family
            .cmp(&other.family)
            .then_with(|| self.segs.len().cmp(&other.segs.len()))
            .then_with(|| self.value_u128().cmp(&other.value_u128()))
            .then_with(|| self.upper_value_u128().cmp(&other.upper_value_u128()))
            .then_with(|| {
                let mine = self.prefix.unwrap_or(self.bit_count());
                let theirs = other.prefix.unwrap_or(other.bit_count());
                theirs.cmp(&mine)
            })
    }

    pub(crate) fn cache_mask_lens(&self) -> MaskLens {
        *publish(&self.cache.mask_lens, || prefix::check_for_prefix_mask(self))
    }

    /// The section with segment order and the bits inside each segment
    /// reversed (per byte when `per_byte` is set). The prefix is dropped.
    ///
    /// # Errors
    ///
    /// [`AddrError::ReverseRangeIncompatible`] naming the first segment
    /// whose range cannot be bit-reversed.
    pub fn reverse_bits(&self, per_byte: bool) -> Result<Section, AddrError> {
        let mut segs = Segs::new();
        for (i, seg) in self.segs.iter().enumerate().rev() {
            let reversed = seg.reverse_bits(per_byte, self.family).map_err(|_| {
                AddrError::ReverseRangeIncompatible {
                    family: self.family,
                    segment: i,
                }
            })?;
            segs.push(reversed);
        }
        Ok(Section::from_parts(self.family, self.start, segs, None))
    }

    /// The section with its bytes reversed: segment order flipped, and for
    /// 16-bit segments the two bytes of each segment swapped. The prefix is
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`AddrError::ReverseRangeIncompatible`] naming the first segment
    /// whose range cannot be byte-swapped.
    pub fn reverse_bytes(&self) -> Result<Section, AddrError> {
        let mut segs = Segs::new();
        for (i, seg) in self.segs.iter().enumerate().rev() {
            let reversed = seg.reverse_bytes(self.family).map_err(|_| {
                AddrError::ReverseRangeIncompatible {
                    family: self.family,
                    segment: i,
                }
            })?;
            segs.push(reversed);
        }
        Ok(Section::from_parts(self.family, self.start, segs, None))
    }

    /// The section with segment order reversed and segment contents kept.
    /// The prefix is dropped.
    #[must_use]
    pub fn reverse_segments(&self) -> Section {
        let segs: Segs = self
            .segs
            .iter()
            .rev()
            .map(|seg| seg.with_seg_prefix(None))
            .collect();
        Section::from_parts(self.family, self.start, segs, None)
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Section) -> bool {
        self.family == other.family
            && self.start == other.start
            && self.prefix == other.prefix
            && self.segs == other.segs
    }
}

impl Eq for Section {}

impl Hash for Section {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family.hash(state);
        self.start.hash(state);
        self.prefix.hash(state);
        self.segs.hash(state);
    }
}

impl PartialOrd for Section {
    fn partial_cmp(&self, other: &Section) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Section {
    fn cmp(&self, other: &Section) -> Ordering {
        self.compare(other)
    }
}

impl Display for Section {
    /// Canonical text form: family separator between segments, `a-b` for a
    /// ranged segment, `*` for a full-range segment, `/p` when prefixed. A
    /// prefix block prints its network value alone, e.g. `1.2.0.0/16`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let as_block = self.is_prefix_block();
        if self.family == Family::Ipv6 {
            self.fmt_ipv6(f, as_block)?;
        } else {
            let radix = self.family.text_radix();
            for (i, seg) in self.segs.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", self.family.separator())?;
                }
                fmt_seg(f, seg, radix, as_block)?;
            }
        }
        if let Some(p) = self.prefix {
            write!(f, "/{p}")?;
        }
        Ok(())
    }
}

impl Section {
    fn fmt_ipv6(&self, f: &mut Formatter<'_>, as_block: bool) -> std::fmt::Result {
        // longest run of segments printing as zero compresses to ::
        let prints_zero =
            |seg: &Seg| seg.matches(0) || (as_block && seg.low() == 0 && seg.is_full_range());
        let mut best_start = 0usize;
        let mut best_len = 0usize;
        let mut run_start = 0usize;
        let mut run_len = 0usize;
        for (i, seg) in self.segs.iter().enumerate() {
            if prints_zero(seg) {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len > best_len {
                    best_start = run_start;
                    best_len = run_len;
                }
            } else {
                run_len = 0;
            }
        }
        if best_len < 2 {
            for (i, seg) in self.segs.iter().enumerate() {
                if i > 0 {
                    write!(f, ":")?;
                }
                fmt_seg(f, seg, 16, as_block)?;
            }
            return Ok(());
        }
        for (i, seg) in self.segs.iter().enumerate().take(best_start) {
            if i > 0 {
                write!(f, ":")?;
            }
            fmt_seg(f, seg, 16, as_block)?;
        }
        write!(f, "::")?;
        for (i, seg) in self.segs.iter().enumerate().skip(best_start + best_len) {
            if i > best_start + best_len {
                write!(f, ":")?;
            }
            fmt_seg(f, seg, 16, as_block)?;
        }
        Ok(())
    }
}

fn fmt_seg(f: &mut Formatter<'_>, seg: &Seg, radix: u32, as_block: bool) -> std::fmt::Result {
    let one = |f: &mut Formatter<'_>, v: SegInt| {
        if radix == 16 {
            write!(f, "{v:x}")
        } else {
            write!(f, "{v}")
        }
    };
    // inside a prefix block the host span of a single network value is
    // implied by the prefix, so only the network value prints
    if as_block {
        if let Some(r) = seg.seg_prefix() {
            let shift = seg.bit_count() - r;
            if u32::from(seg.low()) >> shift == u32::from(seg.upper()) >> shift {
                return one(f, seg.low());
            }
        }
    }
    if seg.is_full_range() {
        return write!(f, "*");
    }
    one(f, seg.low())?;
    if seg.is_multiple() {
        write!(f, "-")?;
        one(f, seg.upper())?;
    }
    Ok(())
}

impl serde::Serialize for Section {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Section", 4)?;
        s.serialize_field("family", &self.family)?;
        let lows: Vec<SegInt> = self.segs.iter().map(Seg::low).collect();
        let uppers: Vec<SegInt> = self.segs.iter().map(Seg::upper).collect();
        s.serialize_field("low", &lows)?;
        s.serialize_field("upper", &uppers)?;
        s.serialize_field("prefix", &self.prefix)?;
        s.end()
    }
}

impl<'de> serde::Deserialize<'de> for Section {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct SectionSerialized {
            family: Family,
            low: Vec<SegInt>,
            upper: Vec<SegInt>,
            prefix: Option<u8>,
        }

        let raw = SectionSerialized::deserialize(deserializer)?;
        if raw.low.len() != raw.upper.len() {
            return Err(serde::de::Error::custom("low/upper length mismatch"));
        }
        let segs: Result<Vec<Seg>, AddrError> = raw
            .low
            .iter()
            .zip(raw.upper.iter())
            .map(|(&lo, &up)| Seg::new(raw.family, lo, up, None))
            .collect();
        let segs = segs.map_err(serde::de::Error::custom)?;
        // a serialized single stays single: prefix re-assignment must not
        // re-expand it into a block
        let single_only = raw.low == raw.upper;
        Section::new(raw.family, &segs, raw.prefix.map(u16::from), single_only)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv4_section(values: [(SegInt, SegInt); 4], prefix: Option<u16>) -> Section {
        let segs: Vec<Seg> = values
            .iter()
            .map(|&(lo, up)| Seg::new(Family::Ipv4, lo, up, None).expect("valid segment"))
            .collect();
        Section::new(Family::Ipv4, &segs, prefix, false).expect("valid section")
    }

    #[test]
    fn multiple_flag_tracks_segments() {
        let single = ipv4_section([(1, 1), (2, 2), (3, 3), (4, 4)], None);
        assert!(!single.is_multiple());
        assert_eq!(single.count(), SetSize::ONE);

        let ranged = ipv4_section([(1, 1), (2, 2), (3, 3), (0, 255)], None);
        assert!(ranged.is_multiple());
        assert_eq!(ranged.count(), SetSize::U128(256));
    }

    #[test]
    fn full_space_count_saturates() {
        let segs: Vec<Seg> = (0..8)
            .map(|_| Seg::new(Family::Ipv6, 0, 0xffff, None).expect("valid segment"))
            .collect();
        let section = Section::new(Family::Ipv6, &segs, None, false).expect("valid section");
        assert_eq!(section.count(), SetSize::Ipv6MaxAddrs);
    }

    #[test]
    fn byte_round_trip() {
        let section = ipv4_section([(1, 1), (2, 2), (3, 3), (4, 4)], None);
        assert_eq!(section.bytes(), &[1, 2, 3, 4]);
        assert_eq!(section.upper_bytes(), &[1, 2, 3, 4]);
        assert_eq!(section.value_u128(), 0x0102_0304);
    }

    #[test]
    fn ordering_is_by_value_then_prefix() {
        let a = ipv4_section([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let b = ipv4_section([(1, 1), (2, 2), (0, 0), (0, 0)], Some(24));
        let c = ipv4_section([(1, 1), (2, 2), (0, 0), (1, 1)], None);
        // a is the whole /16 block, b the /24 block: same lower value, a has
        // the larger upper value
        assert!(b < a);
        // single 1.2.0.1 sorts above both blocks, which start at 1.2.0.0
        assert!(b < c && a < c);
        assert_eq!(a.compare(&a), Ordering::Equal);
    }

    #[test]
    fn sequential_detection() {
        assert!(ipv4_section([(1, 1), (2, 2), (3, 3), (0, 255)], None).is_sequential());
        assert!(ipv4_section([(1, 1), (2, 2), (3, 7), (0, 255)], None).is_sequential());
        assert!(!ipv4_section([(1, 1), (2, 5), (3, 3), (0, 255)], None).is_sequential());
        assert!(ipv4_section([(1, 1), (2, 2), (3, 3), (4, 4)], None).is_sequential());
    }

    #[test]
    fn sub_sections_keep_the_boundary() {
        let section = ipv4_section([(1, 1), (2, 2), (0, 255), (0, 255)], Some(16));
        let tail = section.trailing_section(2);
        assert_eq!(tail.seg_count(), 2);
        assert_eq!(tail.start_index(), 2);
        assert_eq!(tail.prefix_len(), Some(0));
        let head = section.sub_section(0, 2);
        assert_eq!(head.prefix_len(), Some(16));
    }

    #[test]
    fn network_and_host_slices() {
        let section = ipv4_section([(1, 1), (2, 2), (0, 255), (0, 255)], Some(16));
        let network = section.network_section();
        assert_eq!(network.seg_count(), 2);
        assert_eq!(network.bytes(), &[1, 2]);
        let host = section.host_section();
        assert_eq!(host.seg_count(), 2);
        assert_eq!(host.start_index(), 2);

        // a mid-segment boundary keeps the boundary segment on both sides
        let network = section.network_section_len(12);
        assert_eq!(network.seg_count(), 2);
        let host = section.host_section_len(12);
        assert_eq!(host.seg_count(), 3);
    }

    #[test]
    fn prefix_matching_across_sections() {
        let block = ipv4_section([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let inside = ipv4_section([(1, 1), (2, 2), (9, 9), (9, 9)], None);
        let outside = ipv4_section([(1, 1), (3, 3), (9, 9), (9, 9)], None);
        assert!(block.prefix_equals(&inside));
        assert!(!block.prefix_equals(&outside));
        assert!(block.prefix_contains(&inside));
        assert!(!block.prefix_contains(&outside));
    }

    #[test]
    fn reversal_round_trips() {
        let section = ipv4_section([(1, 1), (2, 2), (3, 3), (4, 4)], None);
        let reversed = section.reverse_bytes().expect("singles reverse");
        assert_eq!(reversed.bytes(), &[4, 3, 2, 1]);
        let back = reversed.reverse_bytes().expect("singles reverse");
        assert_eq!(back, section);

        let bitwise = section.reverse_bits(false).expect("singles reverse");
        assert_eq!(bitwise.bytes(), &[0x20, 0xc0, 0x40, 0x80]);
        let back = bitwise.reverse_bits(false).expect("singles reverse");
        assert_eq!(back, section);

        // full-range segments reverse, arbitrary ranges do not
        let ranged = ipv4_section([(1, 1), (2, 2), (0, 255), (4, 4)], None);
        let reversed = ranged.reverse_bits(false).expect("full range reverses");
        assert!(reversed.seg(1).is_full_range());
        let torn = ipv4_section([(1, 1), (2, 2), (3, 9), (4, 4)], None);
        let err = torn.reverse_bits(false).expect_err("partial range tears");
        assert_eq!(
            err,
            AddrError::ReverseRangeIncompatible {
                family: Family::Ipv4,
                segment: 2
            }
        );
    }

    #[test]
    fn serde_round_trip() {
        let section = ipv4_section([(1, 1), (2, 2), (0, 255), (0, 255)], Some(16));
        let yaml = serde_yml::to_string(&section).expect("serializes");
        let back: Section = serde_yml::from_str(&yaml).expect("deserializes");
        assert_eq!(section, back);
    }
}
