// fontchain/atlas/src/native.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The host toolkit's font records.
//!
//! The layouts here are a wire format shared with the toolkit: field widths, bit positions, and
//! byte order must not change. Each record is a plain value with accessors; `write_to` and
//! `read_from` produce and consume the exact little-endian bytes.

use crate::font::PhysicalFont;
use crate::glyph::GlyphRecord;
use byteorder::{ByteOrder, LittleEndian};
use std::cmp::Ordering;

pub const GLYPH_COLORED_BIT: u32 = 0;
pub const GLYPH_VISIBLE_BIT: u32 = 1;
pub const GLYPH_TEXTURE_INDEX_SHIFT: u32 = 2;
pub const GLYPH_TEXTURE_INDEX_BITS: u32 = 9;
pub const GLYPH_CODEPOINT_SHIFT: u32 = 11;
pub const GLYPH_CODEPOINT_BITS: u32 = 21;

pub const KERNING_USE_BISECT_BIT: u32 = 0;
pub const KERNING_OFFSET_SHIFT: u32 = 1;
pub const KERNING_OFFSET_BITS: u32 = 19;
pub const KERNING_COUNT_SHIFT: u32 = 20;
pub const KERNING_COUNT_BITS: u32 = 12;

/// The most texture pages a texture index can address.
pub const MAX_TEXTURE_PAGES: usize = (1 << GLYPH_TEXTURE_INDEX_BITS) / 5;

/// Above this many pairs for one left glyph, lookups bisect instead of scanning.
const BISECT_THRESHOLD: usize = 8;
const MAX_PAIRS_PER_GLYPH: usize = (1 << KERNING_COUNT_BITS) - 1;
const MAX_PAIR_OFFSET: usize = (1 << KERNING_OFFSET_BITS) - 1;
/// Glyph indices stop short of `NO_GLYPH`.
const MAX_GLYPHS: usize = NO_GLYPH as usize;

const CODEPOINT_LIMIT: usize = 0x11_0000;
const CODEPOINTS_PER_4K_PAGE: usize = 4096;
const USED_4K_PAGES_BYTES: usize = CODEPOINT_LIMIT / CODEPOINTS_PER_4K_PAGE / 8;

/// Sentinel in the codepoint index for "no glyph".
pub const NO_GLYPH: u16 = 0xffff;

#[inline]
fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// A 40-byte glyph record.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct NativeGlyph {
    bits: u32,
    pub advance_x: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl NativeGlyph {
    pub const SIZE: usize = 40;

    pub fn from_record(record: &GlyphRecord) -> NativeGlyph {
        let mut glyph = NativeGlyph {
            bits: 0,
            advance_x: record.advance_x,
            x0: record.x0,
            y0: record.y0,
            x1: record.x1,
            y1: record.y1,
            u0: record.u0,
            v0: record.v0,
            u1: record.u1,
            v1: record.v1,
        };
        glyph.set_colored(record.colored);
        glyph.set_visible(record.visible);
        glyph.set_texture_index(record.texture_index);
        glyph.set_codepoint(record.codepoint);
        glyph
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    pub fn colored(&self) -> bool {
        (self.bits >> GLYPH_COLORED_BIT) & 1 != 0
    }

    #[inline]
    pub fn set_colored(&mut self, colored: bool) {
        self.bits = (self.bits & !(1 << GLYPH_COLORED_BIT)) |
            ((colored as u32) << GLYPH_COLORED_BIT)
    }

    #[inline]
    pub fn visible(&self) -> bool {
        (self.bits >> GLYPH_VISIBLE_BIT) & 1 != 0
    }

    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.bits = (self.bits & !(1 << GLYPH_VISIBLE_BIT)) |
            ((visible as u32) << GLYPH_VISIBLE_BIT)
    }

    #[inline]
    pub fn texture_index(&self) -> u16 {
        ((self.bits >> GLYPH_TEXTURE_INDEX_SHIFT) & mask(GLYPH_TEXTURE_INDEX_BITS)) as u16
    }

    /// Stores the low 9 bits of `index`.
    #[inline]
    pub fn set_texture_index(&mut self, index: u16) {
        let field = mask(GLYPH_TEXTURE_INDEX_BITS) << GLYPH_TEXTURE_INDEX_SHIFT;
        self.bits = (self.bits & !field) | ((index as u32) << GLYPH_TEXTURE_INDEX_SHIFT & field)
    }

    #[inline]
    pub fn codepoint(&self) -> u32 {
        (self.bits >> GLYPH_CODEPOINT_SHIFT) & mask(GLYPH_CODEPOINT_BITS)
    }

    /// Stores the low 21 bits of `codepoint`.
    #[inline]
    pub fn set_codepoint(&mut self, codepoint: u32) {
        let field = mask(GLYPH_CODEPOINT_BITS) << GLYPH_CODEPOINT_SHIFT;
        self.bits = (self.bits & !field) | (codepoint << GLYPH_CODEPOINT_SHIFT & field)
    }

    pub fn write_to(&self, bytes: &mut [u8]) {
        LittleEndian::write_u32(&mut bytes[0..4], self.bits);
        let floats = [
            self.advance_x, self.x0, self.y0, self.x1, self.y1, self.u0, self.v0, self.u1, self.v1,
        ];
        LittleEndian::write_f32_into(&floats, &mut bytes[4..Self::SIZE]);
    }

    pub fn read_from(bytes: &[u8]) -> NativeGlyph {
        let mut floats = [0.0; 9];
        LittleEndian::read_f32_into(&bytes[4..Self::SIZE], &mut floats);
        NativeGlyph {
            bits: LittleEndian::read_u32(&bytes[0..4]),
            advance_x: floats[0],
            x0: floats[1],
            y0: floats[2],
            x1: floats[3],
            y1: floats[4],
            u0: floats[5],
            v0: floats[6],
            u1: floats[7],
            v1: floats[8],
        }
    }
}

/// Per-codepoint data the toolkit touches on every character it lays out.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct NativeGlyphHotData {
    pub advance_x: f32,
    pub occupied_width: f32,
    kerning_pair_info: u32,
}

impl NativeGlyphHotData {
    pub const SIZE: usize = 12;

    #[inline]
    pub fn kerning_pair_info(&self) -> u32 {
        self.kerning_pair_info
    }

    #[inline]
    pub fn use_bisect(&self) -> bool {
        (self.kerning_pair_info >> KERNING_USE_BISECT_BIT) & 1 != 0
    }

    #[inline]
    pub fn set_use_bisect(&mut self, use_bisect: bool) {
        self.kerning_pair_info = (self.kerning_pair_info & !(1 << KERNING_USE_BISECT_BIT)) |
            ((use_bisect as u32) << KERNING_USE_BISECT_BIT)
    }

    /// Index of the first kerning pair whose left glyph is this codepoint.
    #[inline]
    pub fn pair_offset(&self) -> u32 {
        (self.kerning_pair_info >> KERNING_OFFSET_SHIFT) & mask(KERNING_OFFSET_BITS)
    }

    #[inline]
    pub fn set_pair_offset(&mut self, offset: u32) {
        let field = mask(KERNING_OFFSET_BITS) << KERNING_OFFSET_SHIFT;
        self.kerning_pair_info = (self.kerning_pair_info & !field) |
            (offset << KERNING_OFFSET_SHIFT & field)
    }

    #[inline]
    pub fn pair_count(&self) -> u32 {
        (self.kerning_pair_info >> KERNING_COUNT_SHIFT) & mask(KERNING_COUNT_BITS)
    }

    #[inline]
    pub fn set_pair_count(&mut self, count: u32) {
        let field = mask(KERNING_COUNT_BITS) << KERNING_COUNT_SHIFT;
        self.kerning_pair_info = (self.kerning_pair_info & !field) |
            (count << KERNING_COUNT_SHIFT & field)
    }

    pub fn write_to(&self, bytes: &mut [u8]) {
        LittleEndian::write_f32(&mut bytes[0..4], self.advance_x);
        LittleEndian::write_f32(&mut bytes[4..8], self.occupied_width);
        LittleEndian::write_u32(&mut bytes[8..12], self.kerning_pair_info);
    }

    pub fn read_from(bytes: &[u8]) -> NativeGlyphHotData {
        NativeGlyphHotData {
            advance_x: LittleEndian::read_f32(&bytes[0..4]),
            occupied_width: LittleEndian::read_f32(&bytes[4..8]),
            kerning_pair_info: LittleEndian::read_u32(&bytes[8..12]),
        }
    }
}

/// An 8-byte kerning pair. The toolkit only kerns within the Basic Multilingual Plane.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct NativeKerningPair {
    pub left: u16,
    pub right: u16,
    pub advance_x_adjustment: f32,
}

impl NativeKerningPair {
    pub const SIZE: usize = 8;

    pub fn write_to(&self, bytes: &mut [u8]) {
        LittleEndian::write_u16(&mut bytes[0..2], self.left);
        LittleEndian::write_u16(&mut bytes[2..4], self.right);
        LittleEndian::write_f32(&mut bytes[4..8], self.advance_x_adjustment);
    }

    pub fn read_from(bytes: &[u8]) -> NativeKerningPair {
        NativeKerningPair {
            left: LittleEndian::read_u16(&bytes[0..2]),
            right: LittleEndian::read_u16(&bytes[2..4]),
            advance_x_adjustment: LittleEndian::read_f32(&bytes[4..8]),
        }
    }
}

/// One bit per 4096-codepoint block that has at least one glyph.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Used4kPages(pub [u8; USED_4K_PAGES_BYTES]);

impl Default for Used4kPages {
    #[inline]
    fn default() -> Used4kPages {
        Used4kPages([0; USED_4K_PAGES_BYTES])
    }
}

impl Used4kPages {
    pub const SIZE: usize = USED_4K_PAGES_BYTES;

    #[inline]
    pub fn mark(&mut self, codepoint: u32) {
        let block = codepoint as usize / CODEPOINTS_PER_4K_PAGE;
        if block / 8 < USED_4K_PAGES_BYTES {
            self.0[block / 8] |= 1 << (block % 8)
        }
    }

    #[inline]
    pub fn contains(&self, codepoint: u32) -> bool {
        let block = codepoint as usize / CODEPOINTS_PER_4K_PAGE;
        block / 8 < USED_4K_PAGES_BYTES && self.0[block / 8] & (1 << (block % 8)) != 0
    }
}

/// A font in the toolkit's layout, built from an adapter's loaded glyphs.
#[derive(Clone, Debug, Default)]
pub struct NativeFont {
    pub font_size: f32,
    pub ascent: f32,
    pub descent: f32,
    pub glyphs: Vec<NativeGlyph>,
    /// Glyph index by codepoint, `NO_GLYPH` where there is none.
    pub index_lookup: Vec<u16>,
    /// Indexed by codepoint, like `index_lookup`.
    pub hot_data: Vec<NativeGlyphHotData>,
    /// Sorted by `(left, right)`.
    pub kerning_pairs: Vec<NativeKerningPair>,
    pub used_4k_pages: Used4kPages,
}

impl NativeFont {
    pub fn from_font(font: &dyn PhysicalFont) -> NativeFont {
        let metrics = font.metrics();
        let mut records = font.loaded_glyphs();
        records.sort_by_key(|record| record.codepoint);
        if records.len() > MAX_GLYPHS {
            warn!("only the first {} of {} glyphs fit a native font", MAX_GLYPHS, records.len());
            records.truncate(MAX_GLYPHS);
        }

        let lookup_len = records.last().map(|record| record.codepoint as usize + 1).unwrap_or(0);
        let mut native = NativeFont {
            font_size: metrics.size_px,
            ascent: metrics.ascent,
            descent: metrics.descent,
            glyphs: Vec::with_capacity(records.len()),
            index_lookup: vec![NO_GLYPH; lookup_len],
            hot_data: vec![NativeGlyphHotData::default(); lookup_len],
            kerning_pairs: vec![],
            used_4k_pages: Used4kPages::default(),
        };

        for record in &records {
            let codepoint = record.codepoint as usize;
            native.index_lookup[codepoint] = native.glyphs.len() as u16;
            native.glyphs.push(NativeGlyph::from_record(record));
            native.hot_data[codepoint].advance_x = record.advance_x;
            native.hot_data[codepoint].occupied_width = record.x1.max(record.advance_x);
            native.used_4k_pages.mark(record.codepoint);
        }

        let mut pairs: Vec<NativeKerningPair> =
            font.kerning_pairs()
                .into_iter()
                .filter(|&(left, right, _)| {
                    left <= 0xffff && right <= 0xffff &&
                        native.find_glyph(left).is_some() && native.find_glyph(right).is_some()
                })
                .map(|(left, right, adjustment)| {
                    NativeKerningPair {
                        left: left as u16,
                        right: right as u16,
                        advance_x_adjustment: adjustment,
                    }
                })
                .collect();
        pairs.sort_by_key(|pair| (pair.left, pair.right));

        let mut kept = Vec::with_capacity(pairs.len());
        let mut start = 0;
        while start < pairs.len() {
            let left = pairs[start].left;
            let count = pairs[start..].iter().take_while(|pair| pair.left == left).count();
            let group = &pairs[start..start + count];
            start += count;

            if kept.len() > MAX_PAIR_OFFSET {
                warn!("kerning pairs past offset {} do not fit a native font", MAX_PAIR_OFFSET);
                break
            }
            if count > MAX_PAIRS_PER_GLYPH {
                warn!("U+{:04X} has {} kerning pairs; keeping {}",
                      left,
                      count,
                      MAX_PAIRS_PER_GLYPH);
            }
            let group = &group[..count.min(MAX_PAIRS_PER_GLYPH)];
            let hot = &mut native.hot_data[left as usize];
            hot.set_pair_offset(kept.len() as u32);
            hot.set_pair_count(group.len() as u32);
            hot.set_use_bisect(group.len() > BISECT_THRESHOLD);
            kept.extend_from_slice(group);
        }
        native.kerning_pairs = kept;
        native
    }

    pub fn find_glyph(&self, codepoint: u32) -> Option<&NativeGlyph> {
        match self.index_lookup.get(codepoint as usize) {
            Some(&index) if index != NO_GLYPH => self.glyphs.get(index as usize),
            _ => None,
        }
    }

    /// Looks up a pair the way the toolkit does: through the left glyph's hot data.
    pub fn kerning(&self, left: u32, right: u32) -> f32 {
        let hot = match self.hot_data.get(left as usize) {
            Some(hot) if hot.pair_count() != 0 => hot,
            _ => return 0.0,
        };
        let start = hot.pair_offset() as usize;
        let pairs = match self.kerning_pairs.get(start..start + hot.pair_count() as usize) {
            Some(pairs) => pairs,
            None => return 0.0,
        };

        let found = if hot.use_bisect() {
            pairs.binary_search_by(|pair| {
                if (pair.right as u32) < right {
                    Ordering::Less
                } else if pair.right as u32 > right {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }).ok().map(|index| &pairs[index])
        } else {
            pairs.iter().find(|pair| pair.right as u32 == right)
        };
        found.map(|pair| pair.advance_x_adjustment).unwrap_or(0.0)
    }
}
