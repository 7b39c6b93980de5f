// fontchain/otf/src/gpos.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pair adjustment positioning from the glyph positioning table.
//!
//! Only the X advance of the first glyph's value record is extracted. Everything else GPOS can
//! express (mark attachment, cursive attachment, contextual positioning) is out of scope.

use crate::classdef::ClassDefTable;
use crate::coverage::CoverageTable;
use crate::error::FontError;
use crate::view::ByteView;
use crate::GlyphId;
use fxhash::FxHashMap;

const LOOKUP_TYPE_PAIR_ADJUSTMENT: u16 = 2;
const LOOKUP_TYPE_EXTENSION_POSITIONING: u16 = 9;

bitflags! {
    /// Which fields a value record carries.
    pub struct ValueFormat: u16 {
        const X_PLACEMENT = 0x0001;
        const Y_PLACEMENT = 0x0002;
        const X_ADVANCE = 0x0004;
        const Y_ADVANCE = 0x0008;
        const X_PLACEMENT_DEVICE = 0x0010;
        const Y_PLACEMENT_DEVICE = 0x0020;
        const X_ADVANCE_DEVICE = 0x0040;
        const Y_ADVANCE_DEVICE = 0x0080;
    }
}

impl ValueFormat {
    /// The size of a value record in this format, in bytes.
    #[inline]
    pub fn record_size(self) -> usize {
        self.bits().count_ones() as usize * 2
    }

    /// The byte offset of the X advance within a value record, if present.
    #[inline]
    pub fn x_advance_offset(self) -> Option<usize> {
        if !self.contains(ValueFormat::X_ADVANCE) {
            return None
        }
        let preceding = self & (ValueFormat::X_PLACEMENT | ValueFormat::Y_PLACEMENT);
        Some(preceding.bits().count_ones() as usize * 2)
    }
}

/// Adjustments keyed by `(left glyph, right glyph)`, in font design units.
pub type GlyphPairAdjustments = FxHashMap<(GlyphId, GlyphId), i16>;

#[derive(Clone, Copy, Debug)]
pub struct GposTable<'a> {
    table: ByteView<'a>,
}

impl<'a> GposTable<'a> {
    pub fn new(table: ByteView<'a>) -> Option<GposTable<'a>> {
        match table.read_u16_at(0) {
            Ok(1) => Some(GposTable { table }),
            Ok(major_version) => {
                warn!("unsupported GPOS major version {}", major_version);
                None
            }
            Err(_) => None,
        }
    }

    /// Extracts the pair adjustments among `glyphs`, which must be sorted.
    ///
    /// Class-based subtables can only be expanded relative to a known glyph set, which is why the
    /// caller supplies one; glyphs outside it contribute nothing. A malformed table yields an empty
    /// map.
    pub fn pair_adjustments(&self, glyphs: &[GlyphId]) -> GlyphPairAdjustments {
        match self.collect_pair_adjustments(glyphs) {
            Ok(adjustments) => adjustments,
            Err(error) => {
                warn!("GPOS table is malformed ({}); ignoring its pair adjustments", error);
                GlyphPairAdjustments::default()
            }
        }
    }

    fn collect_pair_adjustments(&self, glyphs: &[GlyphId])
                                -> Result<GlyphPairAdjustments, FontError> {
        let lookup_list = self.table.subview(self.table.read_u16_at(8)? as usize)?;
        let lookup_count = lookup_list.read_u16_at(0)? as usize;

        let mut adjustments = GlyphPairAdjustments::default();
        for lookup_index in 0..lookup_count {
            let lookup_offset = lookup_list.read_u16_at(2 + lookup_index * 2)? as usize;
            let lookup = lookup_list.subview(lookup_offset)?;
            let lookup_type = lookup.read_u16_at(0)?;
            let subtable_count = lookup.read_u16_at(4)? as usize;

            // Within a lookup, the first subtable that covers a pair wins.
            let mut lookup_adjustments = GlyphPairAdjustments::default();
            for subtable_index in 0..subtable_count {
                let subtable_offset = lookup.read_u16_at(6 + subtable_index * 2)? as usize;
                let mut subtable = lookup.subview(subtable_offset)?;
                let mut subtable_type = lookup_type;

                if subtable_type == LOOKUP_TYPE_EXTENSION_POSITIONING {
                    subtable_type = subtable.read_u16_at(2)?;
                    let extension_offset = subtable.read_u32_at(4)? as usize;
                    subtable = subtable.subview(extension_offset)?;
                }
                if subtable_type != LOOKUP_TYPE_PAIR_ADJUSTMENT {
                    continue
                }

                match subtable.read_u16_at(0)? {
                    1 => read_pair_pos_format_1(subtable, glyphs, &mut lookup_adjustments)?,
                    2 => read_pair_pos_format_2(subtable, glyphs, &mut lookup_adjustments)?,
                    format => debug!("skipping unknown PairPos format {}", format),
                }
            }

            // Across lookups, adjustments accumulate.
            for (pair, value) in lookup_adjustments {
                let total = adjustments.entry(pair).or_insert(0);
                *total = total.saturating_add(value);
            }
        }

        Ok(adjustments)
    }
}

#[inline]
fn contains(glyphs: &[GlyphId], glyph: GlyphId) -> bool {
    glyphs.binary_search(&glyph).is_ok()
}

// Format 1: an explicit list of second glyphs for every covered first glyph.
fn read_pair_pos_format_1(subtable: ByteView,
                          glyphs: &[GlyphId],
                          adjustments: &mut GlyphPairAdjustments)
                          -> Result<(), FontError> {
    let coverage = CoverageTable::new(subtable.subview(subtable.read_u16_at(2)? as usize)?)?;
    let value_format_1 = ValueFormat::from_bits_truncate(subtable.read_u16_at(4)?);
    let value_format_2 = ValueFormat::from_bits_truncate(subtable.read_u16_at(6)?);
    let pair_set_count = subtable.read_u16_at(8)?;

    let x_advance_offset = match value_format_1.x_advance_offset() {
        None => return Ok(()),
        Some(offset) => offset,
    };
    let record_size = 2 + value_format_1.record_size() + value_format_2.record_size();

    let mut covered = vec![];
    coverage.for_each_glyph(|first_glyph, coverage_index| {
        if coverage_index < pair_set_count && contains(glyphs, first_glyph) {
            covered.push((first_glyph, coverage_index))
        }
    })?;

    for (first_glyph, coverage_index) in covered {
        let pair_set_offset = subtable.read_u16_at(10 + coverage_index as usize * 2)?;
        let pair_set = subtable.subview(pair_set_offset as usize)?;
        let pair_value_count = pair_set.read_u16_at(0)? as usize;
        for pair_index in 0..pair_value_count {
            let record = 2 + pair_index * record_size;
            let second_glyph = pair_set.read_u16_at(record)?;
            if !contains(glyphs, second_glyph) {
                continue
            }
            let value = pair_set.read_i16_at(record + 2 + x_advance_offset)?;
            if value != 0 {
                adjustments.entry((first_glyph, second_glyph)).or_insert(value);
            }
        }
    }
    Ok(())
}

// Format 2: a class × class grid of value records.
fn read_pair_pos_format_2(subtable: ByteView,
                          glyphs: &[GlyphId],
                          adjustments: &mut GlyphPairAdjustments)
                          -> Result<(), FontError> {
    let coverage = CoverageTable::new(subtable.subview(subtable.read_u16_at(2)? as usize)?)?;
    let value_format_1 = ValueFormat::from_bits_truncate(subtable.read_u16_at(4)?);
    let value_format_2 = ValueFormat::from_bits_truncate(subtable.read_u16_at(6)?);
    let class_def_1 = ClassDefTable::new(subtable.subview(subtable.read_u16_at(8)? as usize)?)?;
    let class_def_2 = ClassDefTable::new(subtable.subview(subtable.read_u16_at(10)? as usize)?)?;
    let class_1_count = subtable.read_u16_at(12)? as usize;
    let class_2_count = subtable.read_u16_at(14)? as usize;

    let x_advance_offset = match value_format_1.x_advance_offset() {
        None => return Ok(()),
        Some(offset) => offset,
    };
    let record_size = value_format_1.record_size() + value_format_2.record_size();

    // Group the candidate second glyphs by class so that each nonzero cell is expanded once.
    let mut second_glyphs_by_class: Vec<Vec<GlyphId>> = vec![vec![]; class_2_count];
    for &glyph in glyphs {
        let class = class_def_2.lookup(glyph)? as usize;
        if class < class_2_count {
            second_glyphs_by_class[class].push(glyph);
        }
    }

    for &first_glyph in glyphs {
        if coverage.lookup(first_glyph)?.is_none() {
            continue
        }
        let class_1 = class_def_1.lookup(first_glyph)? as usize;
        if class_1 >= class_1_count {
            continue
        }
        for (class_2, second_glyphs) in second_glyphs_by_class.iter().enumerate() {
            if second_glyphs.is_empty() {
                continue
            }
            let record = 16 + (class_1 * class_2_count + class_2) * record_size;
            let value = subtable.read_i16_at(record + x_advance_offset)?;
            if value == 0 {
                continue
            }
            for &second_glyph in second_glyphs {
                adjustments.entry((first_glyph, second_glyph)).or_insert(value);
            }
        }
    }
    Ok(())
}
