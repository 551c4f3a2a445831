// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lazy enumeration of sections.
//!
//! All iterators walk in strict ascending numeric order and are finite. An
//! iterator yields each element exactly once; restarting means re-invoking
//! the producer on the source section.

use arrayvec::ArrayVec;

use super::{MAX_SEGS, Section, Segs, prefix};
use crate::seg::{Seg, SegInt};

/// Odometer over per-segment value ranges, most significant segment first.
#[derive(Debug, Clone)]
struct Odometer {
    ranges: ArrayVec<(u32, u32), MAX_SEGS>,
    current: ArrayVec<u32, MAX_SEGS>,
    started: bool,
    done: bool,
}

impl Odometer {
    fn new(ranges: ArrayVec<(u32, u32), MAX_SEGS>) -> Odometer {
        let current = ranges.iter().map(|&(lo, _)| lo).collect();
        Odometer {
            ranges,
            current,
            started: false,
            done: false,
        }
    }

    fn advance(&mut self) -> Option<&[u32]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.current);
        }
        for i in (0..self.ranges.len()).rev() {
            if self.current[i] < self.ranges[i].1 {
                self.current[i] += 1;
                for j in i + 1..self.ranges.len() {
                    self.current[j] = self.ranges[j].0;
                }
                return Some(&self.current);
            }
        }
        self.done = true;
        None
    }
}

/// The shared shape of emitted sections.
#[derive(Debug, Clone)]
struct Shape {
    template: Section,
    seg_prefixes: ArrayVec<Option<u8>, MAX_SEGS>,
}

impl Shape {
    fn of(section: &Section) -> Shape {
        let bits = section.bits_per_seg();
        let seg_prefixes = match section.prefix_len() {
            None => (0..section.seg_count()).map(|_| None).collect(),
            Some(p) => (0..section.seg_count())
                .map(|i| prefix::seg_prefix_at(bits, p, i))
                .collect(),
        };
        Shape {
            template: section.clone(),
            seg_prefixes,
        }
    }

    /// Network bit count of segment `i` under the section prefix.
    fn net_bits(&self, i: usize) -> u8 {
        let bits = self.template.bits_per_seg();
        match self.seg_prefixes[i] {
            None => bits,
            Some(r) => r,
        }
    }

    fn emit(&self, segs: Segs) -> Section {
        Section::from_parts(
            self.template.family(),
            self.template.start_index(),
            segs,
            self.template.prefix_len(),
        )
    }
}

#[allow(clippy::cast_possible_truncation)]
fn seg_single(seg: &Seg, value: u32, seg_prefix: Option<u8>) -> Seg {
    seg.derive(value as SegInt, value as SegInt, seg_prefix)
}

/// Iterator over every single-valued section in the source's range.
#[derive(Debug, Clone)]
pub struct SectionIter {
    shape: Shape,
    odometer: Odometer,
}

impl SectionIter {
    pub(crate) fn new(section: &Section) -> SectionIter {
        let ranges = section
            .segs()
            .iter()
            .map(|seg| (u32::from(seg.low()), u32::from(seg.upper())))
            .collect();
        SectionIter {
            shape: Shape::of(section),
            odometer: Odometer::new(ranges),
        }
    }
}

impl Iterator for SectionIter {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        let values = self.odometer.advance()?;
        let segs: Segs = self
            .shape
            .template
            .segs()
            .iter()
            .zip(values.iter())
            .enumerate()
            .map(|(i, (seg, &v))| seg_single(seg, v, self.shape.seg_prefixes[i]))
            .collect();
        Some(self.shape.emit(segs))
    }
}

/// Iterator over the distinct prefixes of a section, each paired with the
/// sub-range of values it covers within the section.
#[derive(Debug, Clone)]
pub struct PrefixIter {
    shape: Shape,
    odometer: Odometer,
    blocks: bool,
}

impl PrefixIter {
    pub(crate) fn new(section: &Section, blocks: bool) -> PrefixIter {
        let shape = Shape::of(section);
        let ranges = section
            .segs()
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let shift = seg.bit_count() - shape.net_bits(i);
                (
                    u32::from(seg.low()) >> shift,
                    u32::from(seg.upper()) >> shift,
                )
            })
            .collect();
        PrefixIter {
            shape,
            odometer: Odometer::new(ranges),
            blocks,
        }
    }
}

impl Iterator for PrefixIter {
    type Item = Section;

    #[allow(clippy::cast_possible_truncation)]
    fn next(&mut self) -> Option<Section> {
        let blocks = self.blocks;
        let shape = &self.shape;
        let values = self.odometer.advance()?;
        let segs: Segs = shape
            .template
            .segs()
            .iter()
            .zip(values.iter())
            .enumerate()
            .map(|(i, (seg, &net))| {
                let bits = seg.bit_count();
                let net_bits = shape.net_bits(i);
                let seg_prefix = shape.seg_prefixes[i];
                if net_bits == bits {
                    return seg_single(seg, net, seg_prefix);
                }
                let shift = bits - net_bits;
                let floor = (net << shift) as SegInt;
                let ceil = floor | seg.host_mask(net_bits);
                if blocks {
                    seg.derive(floor, ceil, Some(net_bits))
                } else {
                    // clip to the source range: only the edge prefixes can
                    // lose part of the host span
                    seg.derive(seg.low().max(floor), seg.upper().min(ceil), Some(net_bits))
                }
            })
            .collect();
        Some(shape.emit(segs))
    }
}

/// Iterator over the distinct leading-`k`-segment combinations, the trailing
/// segments kept as they are.
#[derive(Debug, Clone)]
pub struct BlockIter {
    shape: Shape,
    odometer: Odometer,
    lead: usize,
}

impl BlockIter {
    pub(crate) fn new(section: &Section, lead: usize) -> BlockIter {
        let lead = lead.min(section.seg_count());
        let ranges = section
            .segs()
            .iter()
            .take(lead)
            .map(|seg| (u32::from(seg.low()), u32::from(seg.upper())))
            .collect();
        BlockIter {
            shape: Shape::of(section),
            odometer: Odometer::new(ranges),
            lead,
        }
    }
}

impl Iterator for BlockIter {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        let lead = self.lead;
        let shape = &self.shape;
        let values = self.odometer.advance()?;
        let segs: Segs = shape
            .template
            .segs()
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                if i < lead {
                    seg_single(seg, values[i], shape.seg_prefixes[i])
                } else {
                    seg.with_seg_prefix(shape.seg_prefixes[i])
                }
            })
            .collect();
        Some(shape.emit(segs))
    }
}

/// Marker for the prefix-block iterator type.
pub type PrefixBlockIter = PrefixIter;

impl Section {
    /// Iterates every single-valued section in this section's range.
    #[must_use]
    pub fn iter(&self) -> SectionIter {
        SectionIter::new(self)
    }

    /// Iterates the distinct prefixes, each clipped to the sub-range the
    /// section actually covers. Without a prefix this equals
    /// [`Section::iter`].
    #[must_use]
    pub fn prefix_iter(&self) -> PrefixIter {
        PrefixIter::new(self, false)
    }

    /// Iterates the distinct prefixes as full prefix blocks.
    #[must_use]
    pub fn prefix_block_iter(&self) -> PrefixBlockIter {
        PrefixIter::new(self, true)
    }

    /// Iterates blocks of the given prefix length by re-prefixing first;
    /// convenience for walking sub-blocks of a larger block.
    #[must_use]
    pub fn prefix_block_iter_len(&self, prefix_len: u8) -> PrefixBlockIter {
        PrefixIter::new(&self.set_prefix_len(prefix_len), true)
    }

    /// Iterates the distinct leading-`seg_count`-segment combinations.
    #[must_use]
    pub fn block_iter(&self, seg_count: usize) -> BlockIter {
        BlockIter::new(self, seg_count)
    }

    /// The smallest leading segment count whose combinations split the
    /// section into sequential blocks.
    #[must_use]
    pub fn sequential_block_index(&self) -> usize {
        self.segs()
            .iter()
            .rposition(|seg| !seg.is_full_range())
            .unwrap_or(0)
    }

    /// Iterates maximal sequential blocks: one per distinct combination of
    /// the leading non-sequential segments.
    #[must_use]
    pub fn sequential_block_iter(&self) -> BlockIter {
        BlockIter::new(self, self.sequential_block_index())
    }

    /// Number of blocks [`Section::sequential_block_iter`] yields.
    #[must_use]
    pub fn sequential_block_count(&self) -> crate::count::SetSize {
        self.block_count(self.sequential_block_index())
    }
}
