// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Range algebra: subtract, intersect, span, merge, cover and increment,
//! plus the sequential range type.
//!
//! Sections are product sets (one value range per segment); sequential
//! ranges are contiguous runs between two single values. The algebra moves
//! between the two representations: product sets decompose into sequential
//! blocks, contiguous runs decompose into prefix blocks or sequential
//! blocks.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use tracing::trace;

use crate::bytes::segs_from_u128;
use crate::count::SetSize;
use crate::errors::AddrError;
use crate::family::Family;
use crate::section::{Section, Segs};
use crate::seg::{Seg, SegInt};

/// Largest value expressible in `total_bits`.
fn max_total(total_bits: u8) -> u128 {
    if total_bits >= 128 {
        u128::MAX
    } else {
        (1u128 << total_bits) - 1
    }
}

/// Decomposes `[lo, hi]` into the minimal ascending run of prefix blocks:
/// at every step the largest aligned block starting at `lo` that stays
/// within `hi`.
fn span_blocks(mut lo: u128, hi: u128, total_bits: u8) -> Vec<(u128, u8)> {
    debug_assert!(lo <= hi);
    let mut out = Vec::new();
    loop {
        let align = if lo == 0 {
            u32::from(total_bits)
        } else {
            lo.trailing_zeros().min(u32::from(total_bits))
        };
        let remaining = hi - lo;
        let fit = if remaining == u128::MAX {
            128
        } else {
            127 - (remaining + 1).leading_zeros()
        };
        let k = align.min(fit);
        #[allow(clippy::cast_possible_truncation)]
        out.push((lo, total_bits - k as u8));
        if k >= 128 {
            break;
        }
        match lo.checked_add(1u128 << k) {
            Some(next) if next <= hi => lo = next,
            _ => break,
        }
    }
    out
}

/// Builds the prefix-block section for `(value, prefix)`.
fn block_section(template: &Section, value: u128, prefix: u8) -> Section {
    Section::from_value_u128(
        template.family(),
        template.start_index(),
        template.seg_count(),
        value,
        Some(prefix),
        false,
    )
}

/// Splits the segment digits of `[lo, hi]` into maximal sequential blocks:
/// fixed leading segments, one ranged segment, full-range tail.
fn seq_block_split(
    family: Family,
    lo: &[SegInt],
    hi: &[SegInt],
    idx: usize,
    fixed: &mut Segs,
    out: &mut Vec<Section>,
) {
    let bits = family.bits_per_seg();
    let max = family.max_seg_value();
    let count = lo.len();
    if idx == count {
        out.push(Section::from_parts(family, 0, fixed.clone(), None));
        return;
    }
    if lo[idx] == hi[idx] {
        fixed.push(Seg::ranged(bits, lo[idx], lo[idx], None));
        seq_block_split(family, lo, hi, idx + 1, fixed, out);
        fixed.pop();
        return;
    }
    let lo_tail_zero = lo[idx + 1..].iter().all(|&v| v == 0);
    let hi_tail_max = hi[idx + 1..].iter().all(|&v| v == max);
    let mut start = lo[idx];
    let mut end = hi[idx];
    if !lo_tail_zero {
        // the ragged low edge: fix this digit, span its tail to the top
        let maxes: Vec<SegInt> = (idx + 1..count).map(|_| max).collect();
        fixed.push(Seg::ranged(bits, lo[idx], lo[idx], None));
        seq_block_split(family, &lo[idx + 1..], &maxes, 0, fixed, out);
        fixed.pop();
        start += 1;
    }
    if !hi_tail_max {
        end -= 1;
    }
    if start <= end {
        let mut segs = fixed.clone();
        segs.push(Seg::ranged(bits, start, end, None));
        for _ in idx + 1..count {
            segs.push(Seg::ranged(bits, 0, max, None));
        }
        out.push(Section::from_parts(family, 0, segs, None));
    }
    if !hi_tail_max {
        // the ragged high edge: fix this digit, span its tail from zero
        let zeros: Vec<SegInt> = (idx + 1..count).map(|_| 0).collect();
        fixed.push(Seg::ranged(bits, hi[idx], hi[idx], None));
        seq_block_split(family, &zeros, &hi[idx + 1..], 0, fixed, out);
        fixed.pop();
    }
}

fn seq_sections(template: &Section, lo: u128, hi: u128) -> Vec<Section> {
    let family = template.family();
    let lo_segs = segs_from_u128(family, lo);
    let hi_segs = segs_from_u128(family, hi);
    let lo_vals: Vec<SegInt> = lo_segs.iter().map(Seg::low).collect();
    let hi_vals: Vec<SegInt> = hi_segs.iter().map(Seg::low).collect();
    let mut out = Vec::new();
    let mut fixed = Segs::new();
    seq_block_split(family, &lo_vals, &hi_vals, 0, &mut fixed, &mut out);
    out
}

/// The contiguous value runs of a section, ascending.
fn value_runs(section: &Section) -> Vec<(u128, u128)> {
    section
        .sequential_block_iter()
        .map(|block| (block.value_u128(), block.upper_value_u128()))
        .collect()
}

/// Sorts and coalesces overlapping or adjacent runs.
fn coalesce(mut runs: Vec<(u128, u128)>) -> Vec<(u128, u128)> {
    runs.sort_unstable();
    let mut out: Vec<(u128, u128)> = Vec::with_capacity(runs.len());
    for (lo, hi) in runs {
        match out.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => out.push((lo, hi)),
        }
    }
    out
}

impl Section {
    /// The sections covering every address of `self` not in `other`,
    /// expressed as minimal prefix blocks, sorted ascending and
    /// non-overlapping. When the two sets are disjoint the result is
    /// `[self]` unchanged.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for operands of different families or
    /// segment counts.
    pub fn subtract(&self, other: &Section) -> Result<Vec<Section>, AddrError> {
        self.check_counts(other)?;
        let Some(intersection) = self.intersect(other)? else {
            return Ok(vec![self.clone()]);
        };
        trace!(minuend = %self, subtrahend = %other, "subtracting sections");
        let mut pieces: Vec<Section> = Vec::new();
        let n = self.seg_count();
        for i in 0..n {
            let mine = self.seg(i);
            let cut = intersection.seg(i);
            let mut push_piece = |lo: SegInt, hi: SegInt| {
                let mut segs = Segs::new();
                for j in 0..i {
                    let s = intersection.seg(j);
                    segs.push(s.derive(s.low(), s.upper(), None));
                }
                segs.push(mine.derive(lo, hi, None));
                for j in i + 1..n {
                    let s = self.seg(j);
                    segs.push(s.derive(s.low(), s.upper(), None));
                }
                pieces.push(Section::from_parts(self.family(), self.start_index(), segs, None));
            };
            if mine.low() < cut.low() {
                push_piece(mine.low(), cut.low() - 1);
            }
            if cut.upper() < mine.upper() {
                push_piece(cut.upper() + 1, mine.upper());
            }
        }
        let mut blocks: Vec<Section> = Vec::new();
        for piece in &pieces {
            for (lo, hi) in value_runs(piece) {
                for (value, prefix) in span_blocks(lo, hi, self.bit_count()) {
                    blocks.push(block_section(self, value, prefix));
                }
            }
        }
        blocks.sort_unstable_by(Section::compare);
        Ok(blocks)
    }

    /// The section covering the addresses in both operands, or `None` when
    /// they are disjoint. The result carries no prefix.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for operands of different families or
    /// segment counts.
    pub fn intersect(&self, other: &Section) -> Result<Option<Section>, AddrError> {
        self.check_counts(other)?;
        let mut segs = Segs::new();
        for (mine, theirs) in self.segs().iter().zip(other.segs().iter()) {
            let lo = mine.low().max(theirs.low());
            let hi = mine.upper().min(theirs.upper());
            if lo > hi {
                return Ok(None);
            }
            segs.push(mine.derive(lo, hi, None));
        }
        Ok(Some(Section::from_parts(
            self.family(),
            self.start_index(),
            segs,
            None,
        )))
    }

    /// The minimal ascending run of prefix blocks covering everything from
    /// the lower bound of `self` to the upper bound of `other` (operands in
    /// either order).
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for operands of different families or
    /// segment counts.
    pub fn span_with_prefix_blocks(&self, other: &Section) -> Result<Vec<Section>, AddrError> {
        self.check_counts(other)?;
        let lo = self.value_u128().min(other.value_u128());
        let hi = self.upper_value_u128().max(other.upper_value_u128());
        Ok(span_blocks(lo, hi, self.bit_count())
            .into_iter()
            .map(|(value, prefix)| block_section(self, value, prefix))
            .collect())
    }

    /// The minimal ascending run of sequential blocks covering everything
    /// from the lower bound of `self` to the upper bound of `other`.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for operands of different families or
    /// segment counts.
    pub fn span_with_sequential_blocks(&self, other: &Section) -> Result<Vec<Section>, AddrError> {
        self.check_counts(other)?;
        let lo = self.value_u128().min(other.value_u128());
        let hi = self.upper_value_u128().max(other.upper_value_u128());
        Ok(seq_sections(self, lo, hi))
    }

    /// The smallest single prefix block containing both operands.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for operands of different families or
    /// segment counts.
    pub fn cover_with_prefix_block(&self, other: &Section) -> Result<Section, AddrError> {
        self.check_counts(other)?;
        let lo = self.value_u128().min(other.value_u128());
        let hi = self.upper_value_u128().max(other.upper_value_u128());
        let total = self.bit_count();
        let differing = lo ^ hi;
        #[allow(clippy::cast_possible_truncation)]
        let common = if differing == 0 {
            total
        } else {
            let significant = 128 - differing.leading_zeros();
            total.saturating_sub(significant as u8)
        };
        let network = if common >= 128 {
            lo
        } else {
            lo & !(max_total(total) >> common)
        };
        Ok(block_section(self, network, common))
    }

    /// Merges sections into the minimal ascending run of prefix blocks
    /// covering their union.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] when the sections disagree on family or
    /// segment count.
    pub fn merge_to_prefix_blocks(sections: &[Section]) -> Result<Vec<Section>, AddrError> {
        let Some(first) = sections.first() else {
            return Ok(Vec::new());
        };
        let runs = Self::merged_runs(first, sections)?;
        let mut out = Vec::new();
        for (lo, hi) in runs {
            for (value, prefix) in span_blocks(lo, hi, first.bit_count()) {
                out.push(block_section(first, value, prefix));
            }
        }
        Ok(out)
    }

    /// Merges sections into the minimal ascending run of sequential blocks
    /// covering their union.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] when the sections disagree on family or
    /// segment count.
    pub fn merge_to_sequential_blocks(sections: &[Section]) -> Result<Vec<Section>, AddrError> {
        let Some(first) = sections.first() else {
            return Ok(Vec::new());
        };
        let runs = Self::merged_runs(first, sections)?;
        let mut out = Vec::new();
        for (lo, hi) in runs {
            out.extend(seq_sections(first, lo, hi));
        }
        Ok(out)
    }

    fn merged_runs(
        first: &Section,
        sections: &[Section],
    ) -> Result<Vec<(u128, u128)>, AddrError> {
        let mut runs = Vec::new();
        for section in sections {
            first.check_counts(section)?;
            runs.extend(value_runs(section));
        }
        Ok(coalesce(runs))
    }

    /// The address `increment` steps into the subnet: counting through the
    /// subnet's iteration order while in range, continuing numerically past
    /// the upper bound, and stepping back numerically from the lower bound
    /// for negative increments. `None` when the result leaves the family's
    /// value space.
    #[must_use]
    pub fn increment(&self, increment: i64) -> Option<Section> {
        if increment == 0 && !self.is_multiple() {
            return Some(self.clone());
        }
        let target = if increment < 0 {
            self.value_u128()
                .checked_sub(u128::from(increment.unsigned_abs()))?
        } else {
            let up = u128::from(increment.unsigned_abs());
            match self.count().as_u128() {
                // the full space: every index is in range
                None => return Some(self.element_at(up)),
                Some(count) if up < count => return Some(self.element_at(up)),
                // past the top: continue numerically from the upper bound
                Some(count) => self.upper_value_u128().checked_add(up - count + 1)?,
            }
        };
        (target <= max_total(self.bit_count())).then(|| self.single_at(target))
    }

    /// The address `increment` steps beyond the range boundary: numerically
    /// past the upper bound for positive increments, below the lower bound
    /// for negative. Zero returns the section unchanged.
    #[must_use]
    pub fn increment_boundary(&self, increment: i64) -> Option<Section> {
        match increment.cmp(&0) {
            Ordering::Equal => Some(self.clone()),
            Ordering::Greater => {
                let target = self
                    .upper_value_u128()
                    .checked_add(increment.unsigned_abs().into())?;
                (target <= max_total(self.bit_count())).then(|| self.single_at(target))
            }
            Ordering::Less => {
                let target = self
                    .value_u128()
                    .checked_sub(increment.unsigned_abs().into())?;
                Some(self.single_at(target))
            }
        }
    }

    fn single_at(&self, value: u128) -> Section {
        Section::from_value_u128(
            self.family(),
            self.start_index(),
            self.seg_count(),
            value,
            self.prefix_len(),
            true,
        )
    }

    /// The `index`-th single value in iteration order.
    fn element_at(&self, index: u128) -> Section {
        let mut digits = [0u128; crate::section::MAX_SEGS];
        let mut rest = index;
        for (i, seg) in self.segs().iter().enumerate().rev() {
            let radix = u128::from(seg.count());
            digits[i] = rest % radix;
            rest /= radix;
        }
        let mut segs = Segs::new();
        for (i, seg) in self.segs().iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let v = seg.low() + digits[i] as SegInt;
            segs.push(seg.derive(v, v, seg.seg_prefix()));
        }
        Section::from_parts(self.family(), self.start_index(), segs, self.prefix_len())
    }
}

/// A contiguous run of addresses between two single-valued endpoints.
///
/// The range carries no prefix length: endpoints are stripped of prefixes
/// (and, at the address layer, zones) on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SeqRange {
    lower: Section,
    upper: Section,
}

impl SeqRange {
    /// The range spanning both operands, endpoints normalized into order.
    ///
    /// # Errors
    ///
    /// [`AddrError::SizeMismatch`] for operands of different families or
    /// segment counts.
    pub fn new(a: &Section, b: &Section) -> Result<SeqRange, AddrError> {
        a.check_counts(b)?;
        let lo = a.value_u128().min(b.value_u128());
        let hi = a.upper_value_u128().max(b.upper_value_u128());
        Ok(SeqRange {
            lower: Section::from_value_u128(a.family(), a.start_index(), a.seg_count(), lo, None, true),
            upper: Section::from_value_u128(a.family(), a.start_index(), a.seg_count(), hi, None, true),
        })
    }

    /// The lower endpoint.
    #[must_use]
    pub const fn lower(&self) -> &Section {
        &self.lower
    }

    /// The upper endpoint.
    #[must_use]
    pub const fn upper(&self) -> &Section {
        &self.upper
    }

    /// The family of both endpoints.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.lower.family()
    }

    /// Number of addresses in the range.
    #[must_use]
    pub fn count(&self) -> SetSize {
        let span = self.upper.value_u128() - self.lower.value_u128();
        SetSize::U128(span) + SetSize::ONE
    }

    /// True iff `section`'s values all lie within the range.
    #[must_use]
    pub fn contains(&self, section: &Section) -> bool {
        self.family() == section.family()
            && self.lower.seg_count() == section.seg_count()
            && self.lower.value_u128() <= section.value_u128()
            && section.upper_value_u128() <= self.upper.value_u128()
    }

    /// True iff the two ranges share at least one address.
    #[must_use]
    pub fn overlaps(&self, other: &SeqRange) -> bool {
        self.family() == other.family()
            && self.lower.value_u128() <= other.upper.value_u128()
            && other.lower.value_u128() <= self.upper.value_u128()
    }

    /// The overlap of two ranges, or `None` when they are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &SeqRange) -> Option<SeqRange> {
        if !self.overlaps(other) {
            return None;
        }
        let lo = self.lower.value_u128().max(other.lower.value_u128());
        let hi = self.upper.value_u128().min(other.upper.value_u128());
        Some(self.with_bounds(lo, hi))
    }

    /// The union of two overlapping or adjacent ranges, or `None` when a
    /// gap separates them.
    #[must_use]
    pub fn join(&self, other: &SeqRange) -> Option<SeqRange> {
        if self.family() != other.family() {
            return None;
        }
        let adjacent = |a: &SeqRange, b: &SeqRange| {
            a.upper.value_u128().checked_add(1) == Some(b.lower.value_u128())
        };
        if !(self.overlaps(other) || adjacent(self, other) || adjacent(other, self)) {
            return None;
        }
        let lo = self.lower.value_u128().min(other.lower.value_u128());
        let hi = self.upper.value_u128().max(other.upper.value_u128());
        Some(self.with_bounds(lo, hi))
    }

    fn with_bounds(&self, lo: u128, hi: u128) -> SeqRange {
        SeqRange {
            lower: self.lower.single_at(lo),
            upper: self.lower.single_at(hi),
        }
    }

    /// The range as a minimal ascending run of prefix blocks.
    #[must_use]
    pub fn span_with_prefix_blocks(&self) -> Vec<Section> {
        span_blocks(
            self.lower.value_u128(),
            self.upper.value_u128(),
            self.lower.bit_count(),
        )
        .into_iter()
        .map(|(value, prefix)| block_section(&self.lower, value, prefix))
        .collect()
    }

    /// The range as a minimal ascending run of sequential blocks.
    #[must_use]
    pub fn span_with_sequential_blocks(&self) -> Vec<Section> {
        seq_sections(&self.lower, self.lower.value_u128(), self.upper.value_u128())
    }

    /// Lazy ascending iterator over the single addresses of the range.
    #[must_use]
    pub fn iter(&self) -> SeqRangeIter {
        SeqRangeIter {
            template: self.lower.clone(),
            next: self.lower.value_u128(),
            end: self.upper.value_u128(),
            done: false,
        }
    }
}

impl PartialOrd for SeqRange {
    fn partial_cmp(&self, other: &SeqRange) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeqRange {
    fn cmp(&self, other: &SeqRange) -> Ordering {
        self.lower
            .cmp(&other.lower)
            .then_with(|| self.upper.cmp(&other.upper))
    }
}

impl Display for SeqRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

/// Iterator over the single addresses of a [`SeqRange`].
#[derive(Debug, Clone)]
pub struct SeqRangeIter {
    template: Section,
    next: u128,
    end: u128,
    done: bool,
}

impl Iterator for SeqRangeIter {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        if self.done {
            return None;
        }
        let value = self.next;
        if self.next == self.end {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some(self.template.single_at(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv4(values: [(SegInt, SegInt); 4], prefix: Option<u16>) -> Section {
        let segs: Vec<Seg> = values
            .iter()
            .map(|&(lo, up)| Seg::new(Family::Ipv4, lo, up, None).expect("valid segment"))
            .collect();
        Section::new(Family::Ipv4, &segs, prefix, false).expect("valid section")
    }

    fn single(values: [SegInt; 4]) -> Section {
        ipv4(
            [
                (values[0], values[0]),
                (values[1], values[1]),
                (values[2], values[2]),
                (values[3], values[3]),
            ],
            None,
        )
    }

    #[test]
    fn subtract_a_block_from_a_block() {
        let whole = ipv4([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let hole = ipv4([(1, 1), (2, 2), (3, 3), (0, 0)], Some(24));
        let remainder = whole.subtract(&hole).expect("same sizes");
        // 1.2.0.0/16 minus 1.2.3.0/24: 1.2.0.0-1.2.2.255 and
        // 1.2.4.0-1.2.255.255 as minimal blocks
        let rendered: Vec<String> = remainder.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "1.2.0.0/23", "1.2.2.0/24", "1.2.4.0/22", "1.2.8.0/21", "1.2.16.0/20",
                "1.2.32.0/19", "1.2.64.0/18", "1.2.128.0/17",
            ]
        );
        assert!(remainder.windows(2).all(|w| w[0] < w[1]));
        let total: SetSize = remainder.iter().map(Section::count).sum();
        assert_eq!(total, SetSize::U128((1 << 16) - 256));
    }

    #[test]
    fn subtract_of_disjoint_returns_identity() {
        let a = ipv4([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let b = ipv4([(9, 9), (9, 9), (0, 0), (0, 0)], Some(16));
        let result = a.subtract(&b).expect("same sizes");
        assert_eq!(result, vec![a]);
    }

    #[test]
    fn subtract_union_intersect_partition() {
        let a = ipv4([(10, 10), (0, 0), (0, 3), (0, 255)], None);
        let b = ipv4([(10, 10), (0, 0), (2, 5), (0, 255)], None);
        let difference = a.subtract(&b).expect("same sizes");
        let intersection = a.intersect(&b).expect("same sizes").expect("overlap");
        let diff_count: SetSize = difference.iter().map(Section::count).sum();
        assert_eq!(diff_count + intersection.count(), a.count());
        for piece in &difference {
            assert!(piece.intersect(&b).expect("same sizes").is_none());
            assert!(a.contains(piece));
        }
    }

    #[test]
    fn intersect_is_segment_wise() {
        let a = ipv4([(1, 2), (0, 255), (5, 9), (0, 0)], None);
        let b = ipv4([(2, 3), (7, 7), (0, 6), (0, 255)], None);
        let both = a.intersect(&b).expect("same sizes").expect("overlap");
        assert_eq!(both.seg(0).low(), 2);
        assert_eq!(both.seg(0).upper(), 2);
        assert_eq!(both.seg(1).low(), 7);
        assert_eq!((both.seg(2).low(), both.seg(2).upper()), (5, 6));
        assert_eq!(both.seg(3).low(), 0);

        let disjoint = ipv4([(9, 9), (0, 0), (0, 0), (0, 0)], None);
        assert!(a.intersect(&disjoint).expect("same sizes").is_none());
    }

    #[test]
    fn span_with_prefix_blocks_is_minimal() {
        // a single prefix block spans as itself
        let block = ipv4([(1, 1), (2, 2), (0, 0), (0, 0)], Some(16));
        let spanned = block
            .span_with_prefix_blocks(&block)
            .expect("same sizes");
        assert_eq!(spanned.len(), 1);
        assert_eq!(spanned[0].to_string(), "1.2.0.0/16");

        // 1.2.3.4 through 1.2.3.6 needs two blocks
        let spanned = single([1, 2, 3, 4])
            .span_with_prefix_blocks(&single([1, 2, 3, 6]))
            .expect("same sizes");
        let rendered: Vec<String> = spanned.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1.2.3.4/31", "1.2.3.6/32"]);
    }

    #[test]
    fn span_with_sequential_blocks() {
        let spanned = single([1, 2, 3, 4])
            .span_with_sequential_blocks(&single([1, 2, 5, 6]))
            .expect("same sizes");
        let rendered: Vec<String> = spanned.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1.2.3.4-255", "1.2.4.*", "1.2.5.0-6"]);
        // blocks partition the run
        let total: SetSize = spanned.iter().map(Section::count).sum();
        assert_eq!(total, SetSize::U128(252 + 256 + 7));
        assert!(spanned.iter().all(Section::is_sequential));
    }

    #[test]
    fn merge_to_prefix_blocks_coalesces_siblings() {
        let a = ipv4([(1, 1), (2, 2), (3, 3), (0, 0)], Some(24));
        let b = ipv4([(1, 1), (2, 2), (2, 2), (0, 0)], Some(24));
        let merged = Section::merge_to_prefix_blocks(&[a, b]).expect("same sizes");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].to_string(), "1.2.2.0/23");
    }

    #[test]
    fn merge_to_sequential_blocks() {
        let a = ipv4([(1, 1), (2, 2), (3, 3), (10, 20)], None);
        let b = ipv4([(1, 1), (2, 2), (3, 3), (21, 40)], None);
        let c = ipv4([(1, 1), (2, 2), (9, 9), (0, 0)], None);
        let merged =
            Section::merge_to_sequential_blocks(&[a, b, c]).expect("same sizes");
        let rendered: Vec<String> = merged.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1.2.3.10-40", "1.2.9.0"]);
    }

    #[test]
    fn cover_with_prefix_block() {
        let covered = single([1, 2, 3, 4])
            .cover_with_prefix_block(&single([1, 2, 3, 6]))
            .expect("same sizes");
        assert_eq!(covered.to_string(), "1.2.3.4/30");

        let covered = single([0, 0, 0, 0])
            .cover_with_prefix_block(&single([255, 255, 255, 255]))
            .expect("same sizes");
        assert_eq!(covered.prefix_len(), Some(0));
    }

    #[test]
    fn increment_within_and_past_the_subnet() {
        let subnet = ipv4([(1, 1), (2, 2), (3, 4), (0, 255)], None);
        // on a subnet, increment 0 is the first address
        let first = subnet.increment(0).expect("in range");
        assert_eq!(first.bytes(), &[1, 2, 3, 0]);
        assert!(!first.is_multiple());
        let tenth = subnet.increment(10).expect("in range");
        assert_eq!(tenth.bytes(), &[1, 2, 3, 10]);
        // count is 512; increment 512 is one past the top
        let past = subnet.increment(512).expect("in range");
        assert_eq!(past.bytes(), &[1, 2, 5, 0]);
        let before = subnet.increment(-1).expect("in range");
        assert_eq!(before.bytes(), &[1, 2, 2, 255]);
    }

    #[test]
    fn increment_overflow_is_none() {
        let top = single([255, 255, 255, 255]);
        assert!(top.increment(1).is_none());
        let bottom = single([0, 0, 0, 0]);
        assert!(bottom.increment(-1).is_none());
        assert!(bottom.increment_boundary(-1).is_none());
    }

    #[test]
    fn increment_boundary_moves_from_the_edges() {
        let subnet = ipv4([(1, 1), (2, 2), (3, 4), (0, 255)], None);
        let above = subnet.increment_boundary(2).expect("in range");
        assert_eq!(above.bytes(), &[1, 2, 5, 1]);
        let below = subnet.increment_boundary(-2).expect("in range");
        assert_eq!(below.bytes(), &[1, 2, 2, 254]);
        assert_eq!(subnet.increment_boundary(0).expect("same"), subnet);
    }

    #[test]
    fn seq_range_normalizes_and_iterates() {
        let range = SeqRange::new(&single([1, 2, 3, 6]), &single([1, 2, 3, 4]))
            .expect("same sizes");
        assert_eq!(range.lower().bytes(), &[1, 2, 3, 4]);
        assert_eq!(range.upper().bytes(), &[1, 2, 3, 6]);
        assert_eq!(range.count(), SetSize::U128(3));
        let values: Vec<Section> = range.iter().collect();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1].bytes(), &[1, 2, 3, 5]);
        assert_eq!(range.to_string(), "1.2.3.4-1.2.3.6");
    }

    #[test]
    fn seq_range_strips_prefixes() {
        let block = ipv4([(1, 1), (2, 2), (3, 3), (0, 0)], Some(24));
        let range = SeqRange::new(&block, &block).expect("same sizes");
        assert_eq!(range.lower().prefix_len(), None);
        assert_eq!(range.upper().prefix_len(), None);
        assert_eq!(range.count(), SetSize::U128(256));
        let blocks = range.span_with_prefix_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].to_string(), "1.2.3.0/24");
    }

    #[test]
    fn seq_range_set_operations() {
        let a = SeqRange::new(&single([1, 2, 3, 0]), &single([1, 2, 3, 100]))
            .expect("same sizes");
        let b = SeqRange::new(&single([1, 2, 3, 50]), &single([1, 2, 3, 200]))
            .expect("same sizes");
        let both = a.intersect(&b).expect("overlap");
        assert_eq!(both.lower().bytes(), &[1, 2, 3, 50]);
        assert_eq!(both.upper().bytes(), &[1, 2, 3, 100]);
        let joined = a.join(&b).expect("overlap joins");
        assert_eq!(joined.upper().bytes(), &[1, 2, 3, 200]);

        let c = SeqRange::new(&single([1, 2, 3, 101]), &single([1, 2, 3, 150]))
            .expect("same sizes");
        assert!(a.join(&c).is_some()); // adjacency joins
        let d = SeqRange::new(&single([1, 2, 3, 120]), &single([1, 2, 3, 150]))
            .expect("same sizes");
        assert!(a.intersect(&d).is_none());
        assert!(a.join(&d).is_none());
    }
}
