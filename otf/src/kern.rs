// fontchain/otf/src/kern.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The legacy kerning table, in both the Microsoft (version 0) and Apple (version 1) layouts.

use crate::error::FontError;
use crate::gpos::GlyphPairAdjustments;
use crate::view::ByteView;
use crate::GlyphId;
use std::cmp;
use std::mem;

const APPLE_VERSION: u32 = 0x0001_0000;

const MICROSOFT_SUBTABLE_HEADER_SIZE: usize = 6;
const APPLE_SUBTABLE_HEADER_SIZE: usize = 8;
const FORMAT_0_HEADER_SIZE: usize = 8;

bitflags! {
    /// Coverage flags of a version 0 subtable. The high byte holds the subtable format.
    pub struct Coverage: u16 {
        const HORIZONTAL = 1 << 0;
        const MINIMUM = 1 << 1;
        const CROSS_STREAM = 1 << 2;
        const OVERRIDE = 1 << 3;
    }
}

bitflags! {
    /// Coverage flags of a version 1 subtable. The low byte holds the subtable format.
    pub struct AppleCoverage: u16 {
        const VERTICAL = 0x8000;
        const CROSS_STREAM = 0x4000;
        const VARIATION = 0x2000;
    }
}

/// How a subtable's value combines with what earlier subtables produced for the same pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Accumulation {
    /// Values add up.
    Additive,
    /// The value is a floor: the larger of the two is kept.
    Minimum,
    /// The value replaces whatever was accumulated.
    Override,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum KernVersion {
    Microsoft,
    Apple,
}

/// One subtable, with its header decoded. `data` begins at the subtable header.
#[derive(Clone, Copy, Debug)]
pub struct KernSubtable<'a> {
    pub format: u8,
    pub accumulation: Accumulation,
    /// True if the subtable adjusts horizontal advances and is not cross-stream or vertical.
    pub applies_to_advance: bool,
    pub tuple_index: u16,
    data: ByteView<'a>,
    header_size: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct KernTable<'a> {
    table: ByteView<'a>,
    version: KernVersion,
}

impl<'a> KernTable<'a> {
    pub fn new(table: ByteView<'a>) -> Option<KernTable<'a>> {
        let version = match (table.read_u16_at(0), table.read_u32_at(0)) {
            (Ok(0), _) => KernVersion::Microsoft,
            (_, Ok(APPLE_VERSION)) => KernVersion::Apple,
            (Ok(version), _) => {
                warn!("unsupported kern table version {}", version);
                return None
            }
            (Err(_), _) => return None,
        };
        Some(KernTable { table, version })
    }

    pub fn subtables(&self) -> Result<Vec<KernSubtable<'a>>, FontError> {
        let mut subtables = vec![];
        match self.version {
            KernVersion::Microsoft => {
                let n_tables = self.table.read_u16_at(2)? as usize;
                let mut offset = mem::size_of::<u16>() * 2;
                for _ in 0..n_tables {
                    let data = self.table.subview(offset)?;
                    let length = data.read_u16_at(2)? as usize;
                    let coverage = data.read_u16_at(4)?;
                    let flags = Coverage::from_bits_truncate(coverage);
                    let format = (coverage >> 8) as u8;

                    let accumulation = if flags.contains(Coverage::OVERRIDE) {
                        Accumulation::Override
                    } else if flags.contains(Coverage::MINIMUM) {
                        Accumulation::Minimum
                    } else {
                        Accumulation::Additive
                    };

                    subtables.push(KernSubtable {
                        format,
                        accumulation,
                        applies_to_advance: flags.contains(Coverage::HORIZONTAL) &&
                            !flags.contains(Coverage::CROSS_STREAM),
                        tuple_index: 0,
                        data,
                        header_size: MICROSOFT_SUBTABLE_HEADER_SIZE,
                    });

                    // The 16-bit length overflows for big format 0 subtables, so trust the pair
                    // count instead when we can.
                    let length = if format == 0 {
                        let n_pairs = data.read_u16_at(MICROSOFT_SUBTABLE_HEADER_SIZE)? as usize;
                        MICROSOFT_SUBTABLE_HEADER_SIZE + FORMAT_0_HEADER_SIZE + n_pairs * 6
                    } else {
                        length
                    };
                    offset += cmp::max(length, MICROSOFT_SUBTABLE_HEADER_SIZE);
                }
            }
            KernVersion::Apple => {
                let n_tables = self.table.read_u32_at(4)? as usize;
                let mut offset = mem::size_of::<u32>() * 2;
                for _ in 0..n_tables {
                    let data = self.table.subview(offset)?;
                    let length = data.read_u32_at(0)? as usize;
                    let coverage = data.read_u16_at(4)?;
                    let tuple_index = data.read_u16_at(6)?;
                    let flags = AppleCoverage::from_bits_truncate(coverage);

                    subtables.push(KernSubtable {
                        format: (coverage & 0xff) as u8,
                        accumulation: Accumulation::Additive,
                        applies_to_advance: !flags.contains(AppleCoverage::VERTICAL) &&
                            !flags.contains(AppleCoverage::CROSS_STREAM),
                        tuple_index,
                        data,
                        header_size: APPLE_SUBTABLE_HEADER_SIZE,
                    });

                    offset += cmp::max(length, APPLE_SUBTABLE_HEADER_SIZE);
                }
            }
        }
        Ok(subtables)
    }

    fn advance_subtables(&self) -> Result<Vec<KernSubtable<'a>>, FontError> {
        let mut subtables = self.subtables()?;
        subtables.retain(|subtable| {
            subtable.applies_to_advance && subtable.tuple_index == 0 &&
                (subtable.format == 0 || subtable.format == 2)
        });

        // Overrides apply after everything else, so they win regardless of subtable order.
        subtables.sort_by_key(|subtable| subtable.accumulation == Accumulation::Override);
        Ok(subtables)
    }

    /// Accumulates every horizontal pair into one map. A malformed table yields an empty map.
    pub fn pairs(&self) -> GlyphPairAdjustments {
        match self.collect_pairs() {
            Ok(pairs) => pairs,
            Err(error) => {
                warn!("kern table is malformed ({}); ignoring it", error);
                GlyphPairAdjustments::default()
            }
        }
    }

    fn collect_pairs(&self) -> Result<GlyphPairAdjustments, FontError> {
        let mut pairs = GlyphPairAdjustments::default();
        for subtable in self.advance_subtables()? {
            let accumulation = subtable.accumulation;
            subtable.for_each_pair(|left, right, value| {
                accumulate(&mut pairs, (left, right), value, accumulation)
            })?;
        }
        pairs.retain(|_, value| *value != 0);
        Ok(pairs)
    }

    /// Looks up a single pair without building the whole map.
    pub fn kerning_for_glyph_pair(&self, left_glyph_id: GlyphId, right_glyph_id: GlyphId)
                                  -> i16 {
        let subtables = match self.advance_subtables() {
            Ok(subtables) => subtables,
            Err(_) => return 0,
        };

        let mut total: Option<i16> = None;
        for subtable in subtables {
            let value = match subtable.lookup(left_glyph_id, right_glyph_id) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(_) => return 0,
            };
            total = Some(match (total, subtable.accumulation) {
                (None, _) | (Some(_), Accumulation::Override) => value,
                (Some(current), Accumulation::Additive) => current.saturating_add(value),
                (Some(current), Accumulation::Minimum) => cmp::max(current, value),
            });
        }
        total.unwrap_or(0)
    }
}

fn accumulate(pairs: &mut GlyphPairAdjustments,
              pair: (GlyphId, GlyphId),
              value: i16,
              accumulation: Accumulation) {
    match pairs.get_mut(&pair) {
        None => {
            pairs.insert(pair, value);
        }
        Some(current) => {
            *current = match accumulation {
                Accumulation::Override => value,
                Accumulation::Additive => current.saturating_add(value),
                Accumulation::Minimum => cmp::max(*current, value),
            }
        }
    }
}

impl<'a> KernSubtable<'a> {
    pub fn for_each_pair<F>(&self, mut f: F) -> Result<(), FontError>
                            where F: FnMut(GlyphId, GlyphId, i16) {
        match self.format {
            0 => {
                let pairs = self.data.subview(self.header_size)?;
                let n_pairs = pairs.read_u16_at(0)? as usize;
                for index in 0..n_pairs {
                    let record = FORMAT_0_HEADER_SIZE + index * 6;
                    f(pairs.read_u16_at(record)?,
                      pairs.read_u16_at(record + 2)?,
                      pairs.read_i16_at(record + 4)?);
                }
            }
            2 => {
                let (left_classes, right_classes) = self.class_tables()?;
                for (left, left_offset) in class_entries(left_classes)? {
                    for (right, right_offset) in class_entries(right_classes)? {
                        let value = self.data.read_i16_at(left_offset + right_offset)?;
                        if value != 0 {
                            f(left, right, value);
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn lookup(&self, left_glyph_id: GlyphId, right_glyph_id: GlyphId)
                  -> Result<Option<i16>, FontError> {
        match self.format {
            0 => {
                let pairs = self.data.subview(self.header_size)?;
                let n_pairs = pairs.read_u16_at(0)? as u32;

                let (mut low, mut high) = (0, n_pairs);
                while low < high {
                    let mid = (low + high) / 2;
                    let record = FORMAT_0_HEADER_SIZE + mid as usize * 6;
                    let left = pairs.read_u16_at(record)?;
                    let right = pairs.read_u16_at(record + 2)?;

                    if left_glyph_id < left || (left_glyph_id == left && right_glyph_id < right) {
                        high = mid
                    } else if left_glyph_id > left ||
                            (left_glyph_id == left && right_glyph_id > right) {
                        low = mid + 1
                    } else {
                        return pairs.read_i16_at(record + 4).map(Some)
                    }
                }
                Ok(None)
            }
            2 => {
                let (left_classes, right_classes) = self.class_tables()?;
                let left_offset = class_offset(left_classes, left_glyph_id)?;
                let right_offset = class_offset(right_classes, right_glyph_id)?;
                match (left_offset, right_offset) {
                    (Some(left_offset), Some(right_offset)) => {
                        self.data.read_i16_at(left_offset + right_offset).map(Some)
                    }
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    // Format 2 offsets are relative to the start of the subtable, header included.
    fn class_tables(&self) -> Result<(ByteView<'a>, ByteView<'a>), FontError> {
        let header = self.header_size;
        let left_offset = self.data.read_u16_at(header + 2)? as usize;
        let right_offset = self.data.read_u16_at(header + 4)? as usize;
        Ok((self.data.subview(left_offset)?, self.data.subview(right_offset)?))
    }
}

fn class_offset(class_table: ByteView, glyph: GlyphId) -> Result<Option<usize>, FontError> {
    let first_glyph = class_table.read_u16_at(0)?;
    let n_glyphs = class_table.read_u16_at(2)?;
    if glyph < first_glyph || glyph - first_glyph >= n_glyphs {
        return Ok(None)
    }
    class_table.read_u16_at(4 + (glyph - first_glyph) as usize * 2).map(|offset| {
        Some(offset as usize)
    })
}

fn class_entries(class_table: ByteView) -> Result<Vec<(GlyphId, usize)>, FontError> {
    let first_glyph = class_table.read_u16_at(0)?;
    let n_glyphs = class_table.read_u16_at(2)?;
    let mut entries = Vec::with_capacity(n_glyphs as usize);
    for index in 0..n_glyphs {
        let offset = class_table.read_u16_at(4 + index as usize * 2)? as usize;
        entries.push((first_glyph.wrapping_add(index), offset));
    }
    Ok(entries)
}
