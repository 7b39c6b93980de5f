// fontchain/otf/src/classdef.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! OpenType Layout class definition tables.

use crate::coverage;
use crate::error::FontError;
use crate::view::ByteView;
use crate::GlyphId;

/// Glyphs not mentioned by a class definition table belong to this class.
pub const DEFAULT_CLASS: u16 = 0;

#[derive(Clone, Copy, Debug)]
pub enum ClassDefTable<'a> {
    /// An implicit class array over a contiguous glyph range.
    Array(ByteView<'a>),
    /// Sorted `(start, end, class)` ranges.
    Ranges(ByteView<'a>),
}

impl<'a> ClassDefTable<'a> {
    pub fn new(data: ByteView<'a>) -> Result<ClassDefTable<'a>, FontError> {
        match data.read_u16_at(0)? {
            1 => Ok(ClassDefTable::Array(data)),
            2 => Ok(ClassDefTable::Ranges(data)),
            _ => Err(FontError::UnknownFormat),
        }
    }

    /// Returns the class of `glyph`. Unlisted glyphs, and all glyphs of a malformed table, are
    /// in class 0.
    #[inline]
    pub fn class_of(&self, glyph: GlyphId) -> u16 {
        self.lookup(glyph).unwrap_or(DEFAULT_CLASS)
    }

    pub fn lookup(&self, glyph: GlyphId) -> Result<u16, FontError> {
        match *self {
            ClassDefTable::Array(data) => {
                let start_glyph = data.read_u16_at(2)?;
                let glyph_count = data.read_u16_at(4)?;
                if glyph < start_glyph || glyph - start_glyph >= glyph_count {
                    return Ok(DEFAULT_CLASS)
                }
                data.read_u16_at(6 + (glyph - start_glyph) as usize * 2)
            }
            ClassDefTable::Ranges(data) => {
                let count = data.read_u16_at(2)? as usize;
                match coverage::find_range(data, 4, count, glyph)? {
                    None => Ok(DEFAULT_CLASS),
                    Some(index) => data.read_u16_at(4 + index * 6 + 4),
                }
            }
        }
    }
}
