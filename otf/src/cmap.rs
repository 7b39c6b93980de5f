// fontchain/otf/src/cmap.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The character to glyph index mapping table.

use crate::error::FontError;
use crate::view::ByteView;
use crate::{GlyphId, MISSING_GLYPH};
use fxhash::FxHashMap;
use smallvec::SmallVec;
use std::u16;

const PLATFORM_ID_UNICODE: u16 = 0;
const PLATFORM_ID_MICROSOFT: u16 = 3;

const UNICODE_ENCODING_ID_2_0_BMP: u16 = 3;
const UNICODE_ENCODING_ID_2_0_FULL: u16 = 4;
const UNICODE_ENCODING_ID_FULL_REPERTOIRE: u16 = 6;

const MICROSOFT_ENCODING_ID_UNICODE_BMP: u16 = 1;
const MICROSOFT_ENCODING_ID_UNICODE_UCS4: u16 = 10;

/// Encoding records we accept, best first.
const ENCODING_PRIORITY: [(u16, u16); 5] = [
    (PLATFORM_ID_UNICODE, UNICODE_ENCODING_ID_2_0_FULL),
    (PLATFORM_ID_UNICODE, UNICODE_ENCODING_ID_2_0_BMP),
    (PLATFORM_ID_UNICODE, UNICODE_ENCODING_ID_FULL_REPERTOIRE),
    (PLATFORM_ID_MICROSOFT, MICROSOFT_ENCODING_ID_UNICODE_BMP),
    (PLATFORM_ID_MICROSOFT, MICROSOFT_ENCODING_ID_UNICODE_UCS4),
];

const ENCODING_RECORD_SIZE: usize = 8;
const SEQUENTIAL_MAP_GROUP_SIZE: usize = 12;
const FORMAT_2_SUB_HEADER_SIZE: usize = 8;
const FORMAT_8_IS32_SIZE: usize = 8192;

const MAX_CODEPOINT: u32 = 0x10ffff;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub offset: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct CmapTable<'a> {
    table: ByteView<'a>,
}

impl<'a> CmapTable<'a> {
    #[inline]
    pub fn new(table: ByteView<'a>) -> CmapTable<'a> {
        CmapTable { table }
    }

    pub fn encoding_records(&self) -> Result<Vec<EncodingRecord>, FontError> {
        // Check version.
        if self.table.read_u16_at(0)? != 0 {
            return Err(FontError::UnsupportedVersion)
        }

        let num_tables = self.table.read_u16_at(2)? as usize;
        let mut records = Vec::with_capacity(num_tables);
        for index in 0..num_tables {
            let offset = 4 + index * ENCODING_RECORD_SIZE;
            records.push(EncodingRecord {
                platform_id: self.table.read_u16_at(offset)?,
                encoding_id: self.table.read_u16_at(offset + 2)?,
                offset: self.table.read_u32_at(offset + 4)?,
            });
        }
        Ok(records)
    }

    /// Picks the best Unicode subtable: Unicode 2.0 full/BMP, then Unicode full repertoire, then
    /// Windows BMP, then Windows full repertoire. A record whose subtable has an unsupported format
    /// is skipped in favor of the next one.
    pub fn unicode_subtable(&self) -> Result<CmapSubtable<'a>, FontError> {
        let records = self.encoding_records()?;
        let mut last_error = FontError::UnsupportedCmapEncoding;
        for &(platform_id, encoding_id) in &ENCODING_PRIORITY {
            let record = match records.iter().find(|record| {
                record.platform_id == platform_id && record.encoding_id == encoding_id
            }) {
                None => continue,
                Some(record) => record,
            };
            match self.table.subview(record.offset as usize).and_then(CmapSubtable::new) {
                Ok(subtable) => return Ok(subtable),
                Err(error) => {
                    debug!("cmap record ({}, {}) unusable: {}", platform_id, encoding_id, error);
                    last_error = error
                }
            }
        }
        Err(last_error)
    }

    /// Maps a codepoint to a glyph, returning glyph 0 if unmapped or if the table is unreadable.
    pub fn char_to_glyph(&self, codepoint: u32) -> GlyphId {
        match self.unicode_subtable() {
            Ok(subtable) => subtable.char_to_glyph(codepoint),
            Err(_) => MISSING_GLYPH,
        }
    }

    /// Every `(codepoint, glyph)` pair of the chosen subtable, in ascending codepoint order.
    pub fn mappings(&self) -> Vec<(u32, GlyphId)> {
        match self.unicode_subtable() {
            Ok(subtable) => subtable.mappings(),
            Err(error) => {
                warn!("cmap table unusable: {}", error);
                vec![]
            }
        }
    }

    /// Builds the reverse map. A glyph shared by several codepoints lists all of them.
    pub fn glyph_to_codepoints(&self) -> FxHashMap<GlyphId, SmallVec<[u32; 2]>> {
        let mut reverse: FxHashMap<GlyphId, SmallVec<[u32; 2]>> = FxHashMap::default();
        for (codepoint, glyph) in self.mappings() {
            reverse.entry(glyph).or_insert_with(SmallVec::new).push(codepoint);
        }
        reverse
    }
}

/// One character mapping subtable, dispatched on its 16-bit format.
#[derive(Clone, Copy, Debug)]
pub enum CmapSubtable<'a> {
    /// Byte encoding table.
    Format0(ByteView<'a>),
    /// High-byte mapping through table.
    Format2(ByteView<'a>),
    /// Segment mapping to delta values.
    Format4(ByteView<'a>),
    /// Trimmed table mapping.
    Format6(ByteView<'a>),
    /// Mixed 16-bit and 32-bit coverage.
    Format8(ByteView<'a>),
    /// Trimmed array.
    Format10(ByteView<'a>),
    /// Segmented coverage (format 12), or many-to-one range mappings (format 13).
    Format12 { data: ByteView<'a>, many_to_one: bool },
}

impl<'a> CmapSubtable<'a> {
    pub fn new(data: ByteView<'a>) -> Result<CmapSubtable<'a>, FontError> {
        match data.read_u16_at(0)? {
            0 => Ok(CmapSubtable::Format0(data)),
            2 => Ok(CmapSubtable::Format2(data)),
            4 => Ok(CmapSubtable::Format4(data)),
            6 => Ok(CmapSubtable::Format6(data)),
            8 => Ok(CmapSubtable::Format8(data)),
            10 => Ok(CmapSubtable::Format10(data)),
            12 => Ok(CmapSubtable::Format12 { data, many_to_one: false }),
            13 => Ok(CmapSubtable::Format12 { data, many_to_one: true }),
            _ => Err(FontError::UnsupportedCmapFormat),
        }
    }

    pub fn format(&self) -> u16 {
        match *self {
            CmapSubtable::Format0(_) => 0,
            CmapSubtable::Format2(_) => 2,
            CmapSubtable::Format4(_) => 4,
            CmapSubtable::Format6(_) => 6,
            CmapSubtable::Format8(_) => 8,
            CmapSubtable::Format10(_) => 10,
            CmapSubtable::Format12 { many_to_one: false, .. } => 12,
            CmapSubtable::Format12 { many_to_one: true, .. } => 13,
        }
    }

    /// Maps a codepoint to a glyph. Glyph 0 means "not mapped" in every format, and so does a
    /// structurally broken subtable.
    #[inline]
    pub fn char_to_glyph(&self, codepoint: u32) -> GlyphId {
        self.lookup(codepoint).unwrap_or(MISSING_GLYPH)
    }

    pub fn lookup(&self, codepoint: u32) -> Result<GlyphId, FontError> {
        match *self {
            CmapSubtable::Format0(data) => lookup_format_0(data, codepoint),
            CmapSubtable::Format2(data) => lookup_format_2(data, codepoint),
            CmapSubtable::Format4(data) => lookup_format_4(data, codepoint),
            CmapSubtable::Format6(data) => lookup_format_6(data, codepoint),
            CmapSubtable::Format8(data) => {
                let num_groups = data.read_u32_at(12 + FORMAT_8_IS32_SIZE)?;
                lookup_groups(data, 16 + FORMAT_8_IS32_SIZE, num_groups, false, codepoint)
            }
            CmapSubtable::Format10(data) => lookup_format_10(data, codepoint),
            CmapSubtable::Format12 { data, many_to_one } => {
                let num_groups = data.read_u32_at(12)?;
                lookup_groups(data, 16, num_groups, many_to_one, codepoint)
            }
        }
    }

    /// Visits every mapped `(codepoint, glyph)` pair in ascending codepoint order.
    pub fn for_each_mapping<F>(&self, mut f: F) -> Result<(), FontError>
                               where F: FnMut(u32, GlyphId) {
        let mut emit = |codepoint: u32, glyph: GlyphId| {
            if glyph != MISSING_GLYPH {
                f(codepoint, glyph)
            }
        };

        match *self {
            CmapSubtable::Format0(data) => {
                for codepoint in 0..256 {
                    emit(codepoint, lookup_format_0(data, codepoint)?);
                }
            }
            CmapSubtable::Format2(data) => {
                // Single-byte codes first, then every lead byte's range.
                for byte in 0..256 {
                    if data.read_u16_at(6 + byte * 2)? == 0 {
                        emit(byte as u32, lookup_format_2(data, byte as u32)?);
                    }
                }
                for high in 1..256 {
                    let key = data.read_u16_at(6 + high * 2)? as usize;
                    if key == 0 {
                        continue
                    }
                    let sub_header = 518 + key / FORMAT_2_SUB_HEADER_SIZE *
                        FORMAT_2_SUB_HEADER_SIZE;
                    let first_code = data.read_u16_at(sub_header)? as u32;
                    let entry_count = data.read_u16_at(sub_header + 2)? as u32;
                    let end = (first_code + entry_count).min(256);
                    for low in first_code..end {
                        let codepoint = ((high as u32) << 8) | low;
                        emit(codepoint, lookup_format_2(data, codepoint)?);
                    }
                }
            }
            CmapSubtable::Format4(data) => {
                let seg_count = data.read_u16_at(6)? as usize / 2;
                for segment in 0..seg_count {
                    let end_code = data.read_u16_at(14 + segment * 2)? as u32;
                    let start_code = data.read_u16_at(16 + seg_count * 2 + segment * 2)? as u32;
                    for codepoint in start_code..(end_code + 1) {
                        emit(codepoint, format_4_glyph(data, seg_count, segment, codepoint)?);
                    }
                }
            }
            CmapSubtable::Format6(data) => {
                let first_code = data.read_u16_at(6)? as u32;
                let entry_count = data.read_u16_at(8)? as u32;
                for index in 0..entry_count {
                    emit(first_code + index, data.read_u16_at(10 + index as usize * 2)?);
                }
            }
            CmapSubtable::Format8(data) => {
                let num_groups = data.read_u32_at(12 + FORMAT_8_IS32_SIZE)?;
                for_each_group(data, 16 + FORMAT_8_IS32_SIZE, num_groups, false, &mut emit)?;
            }
            CmapSubtable::Format10(data) => {
                let start_char_code = data.read_u32_at(12)?;
                let num_chars = data.read_u32_at(16)?;
                if num_chars > MAX_CODEPOINT + 1 {
                    return Err(FontError::UnknownFormat)
                }
                for index in 0..num_chars {
                    let codepoint = start_char_code.checked_add(index)
                                                   .ok_or(FontError::UnknownFormat)?;
                    emit(codepoint, data.read_u16_at(20 + index as usize * 2)?);
                }
            }
            CmapSubtable::Format12 { data, many_to_one } => {
                let num_groups = data.read_u32_at(12)?;
                for_each_group(data, 16, num_groups, many_to_one, &mut emit)?;
            }
        }
        Ok(())
    }

    /// Collects every mapping. A subtable that turns out to be broken contributes nothing.
    pub fn mappings(&self) -> Vec<(u32, GlyphId)> {
        let mut mappings = vec![];
        match self.for_each_mapping(|codepoint, glyph| mappings.push((codepoint, glyph))) {
            Ok(()) => mappings,
            Err(error) => {
                warn!("cmap format {} subtable is malformed: {}", self.format(), error);
                vec![]
            }
        }
    }
}

fn lookup_format_0(data: ByteView, codepoint: u32) -> Result<GlyphId, FontError> {
    if codepoint > 0xff {
        return Ok(MISSING_GLYPH)
    }
    data.read_u8_at(6 + codepoint as usize).map(|glyph| glyph as GlyphId)
}

fn lookup_format_2(data: ByteView, codepoint: u32) -> Result<GlyphId, FontError> {
    if codepoint > 0xffff {
        return Ok(MISSING_GLYPH)
    }

    let (high, low) = ((codepoint >> 8) as usize, codepoint & 0xff);
    let sub_header_index = if high == 0 {
        // A byte that starts a two-byte sequence is not a character by itself.
        if data.read_u16_at(6 + low as usize * 2)? != 0 {
            return Ok(MISSING_GLYPH)
        }
        0
    } else {
        let key = data.read_u16_at(6 + high * 2)? as usize;
        if key == 0 {
            return Ok(MISSING_GLYPH)
        }
        key / FORMAT_2_SUB_HEADER_SIZE
    };

    let sub_header = 518 + sub_header_index * FORMAT_2_SUB_HEADER_SIZE;
    let first_code = data.read_u16_at(sub_header)? as u32;
    let entry_count = data.read_u16_at(sub_header + 2)? as u32;
    let id_delta = data.read_i16_at(sub_header + 4)?;
    let id_range_offset = data.read_u16_at(sub_header + 6)? as usize;
    if low < first_code || low >= first_code + entry_count {
        return Ok(MISSING_GLYPH)
    }

    // `idRangeOffset` counts from the position of the `idRangeOffset` field itself.
    let glyph_offset = sub_header + 6 + id_range_offset + (low - first_code) as usize * 2;
    let glyph = data.read_u16_at(glyph_offset)?;
    if glyph == MISSING_GLYPH {
        return Ok(MISSING_GLYPH)
    }
    Ok((glyph as i16).wrapping_add(id_delta) as u16)
}

fn lookup_format_4(data: ByteView, codepoint: u32) -> Result<GlyphId, FontError> {
    if codepoint > u16::MAX as u32 {
        return Ok(MISSING_GLYPH)
    }

    // NB: the OpenType documentation calls `startCode` and `endCode` `startCount` and `endCount`
    // in a few places. `startCode` and `endCode` are the correct names.
    let seg_count = data.read_u16_at(6)? as usize / 2;

    // Binary search for the first segment whose end is at or past the key.
    let (mut low, mut high) = (0, seg_count);
    while low < high {
        let mid = (low + high) / 2;
        let end_code = data.read_u16_at(14 + mid * 2)? as u32;
        if end_code < codepoint {
            low = mid + 1
        } else {
            high = mid
        }
    }
    if low == seg_count {
        return Ok(MISSING_GLYPH)
    }

    let start_code = data.read_u16_at(16 + seg_count * 2 + low * 2)? as u32;
    if start_code > codepoint {
        return Ok(MISSING_GLYPH)
    }
    format_4_glyph(data, seg_count, low, codepoint)
}

fn format_4_glyph(data: ByteView, seg_count: usize, segment: usize, codepoint: u32)
                  -> Result<GlyphId, FontError> {
    let start_codes = 16 + seg_count * 2;
    let id_deltas = start_codes + seg_count * 2;
    let id_range_offsets = id_deltas + seg_count * 2;

    let start_code = data.read_u16_at(start_codes + segment * 2)? as u32;
    let id_delta = data.read_i16_at(id_deltas + segment * 2)?;
    let id_range_offset = data.read_u16_at(id_range_offsets + segment * 2)? as usize;

    // If we're direct-mapped (`idRangeOffset` = 0), the delta applies to the code itself.
    if id_range_offset == 0 {
        return Ok((codepoint as u16).wrapping_add(id_delta as u16))
    }

    let glyph_offset = id_range_offsets + segment * 2 + id_range_offset +
        (codepoint - start_code) as usize * 2;
    let glyph = data.read_u16_at(glyph_offset)?;
    if glyph == MISSING_GLYPH {
        return Ok(MISSING_GLYPH)
    }
    Ok(glyph.wrapping_add(id_delta as u16))
}

fn lookup_format_6(data: ByteView, codepoint: u32) -> Result<GlyphId, FontError> {
    let first_code = data.read_u16_at(6)? as u32;
    let entry_count = data.read_u16_at(8)? as u32;
    if codepoint < first_code || codepoint - first_code >= entry_count {
        return Ok(MISSING_GLYPH)
    }
    data.read_u16_at(10 + (codepoint - first_code) as usize * 2)
}

fn lookup_format_10(data: ByteView, codepoint: u32) -> Result<GlyphId, FontError> {
    let start_char_code = data.read_u32_at(12)?;
    let num_chars = data.read_u32_at(16)?;
    if codepoint < start_char_code || codepoint - start_char_code >= num_chars {
        return Ok(MISSING_GLYPH)
    }
    data.read_u16_at(20 + (codepoint - start_char_code) as usize * 2)
}

/// Looks up a codepoint in a sorted array of `(start, end, glyph)` groups, as used by formats 8,
/// 12, and 13.
fn lookup_groups(data: ByteView,
                 groups_offset: usize,
                 num_groups: u32,
                 many_to_one: bool,
                 codepoint: u32)
                 -> Result<GlyphId, FontError> {
    let num_groups = num_groups as usize;
    let (mut low, mut high) = (0, num_groups);
    while low < high {
        let mid = (low + high) / 2;
        let end_char_code = data.read_u32_at(groups_offset + mid * SEQUENTIAL_MAP_GROUP_SIZE + 4)?;
        if end_char_code < codepoint {
            low = mid + 1
        } else {
            high = mid
        }
    }
    if low == num_groups {
        return Ok(MISSING_GLYPH)
    }

    let group = groups_offset + low * SEQUENTIAL_MAP_GROUP_SIZE;
    let start_char_code = data.read_u32_at(group)?;
    if start_char_code > codepoint {
        return Ok(MISSING_GLYPH)
    }
    let start_glyph_id = data.read_u32_at(group + 8)?;
    let glyph = if many_to_one {
        start_glyph_id
    } else {
        start_glyph_id.wrapping_add(codepoint - start_char_code)
    };
    if glyph > u16::MAX as u32 {
        return Ok(MISSING_GLYPH)
    }
    Ok(glyph as GlyphId)
}

fn for_each_group<F>(data: ByteView,
                     groups_offset: usize,
                     num_groups: u32,
                     many_to_one: bool,
                     emit: &mut F)
                     -> Result<(), FontError>
                     where F: FnMut(u32, GlyphId) {
    for index in 0..num_groups as usize {
        let group = groups_offset + index * SEQUENTIAL_MAP_GROUP_SIZE;
        let start_char_code = data.read_u32_at(group)?;
        let end_char_code = data.read_u32_at(group + 4)?;
        let start_glyph_id = data.read_u32_at(group + 8)?;
        if start_char_code > end_char_code || end_char_code > MAX_CODEPOINT {
            return Err(FontError::UnknownFormat)
        }
        for codepoint in start_char_code..(end_char_code + 1) {
            let glyph = if many_to_one {
                start_glyph_id
            } else {
                start_glyph_id.wrapping_add(codepoint - start_char_code)
            };
            if glyph <= u16::MAX as u32 {
                emit(codepoint, glyph as GlyphId)
            }
        }
    }
    Ok(())
}
