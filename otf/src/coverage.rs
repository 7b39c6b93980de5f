// fontchain/otf/src/coverage.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! OpenType Layout coverage tables.

use crate::error::FontError;
use crate::view::ByteView;
use crate::GlyphId;

const RANGE_RECORD_SIZE: usize = 6;

/// Maps a subset of glyph IDs to sequential coverage indices.
#[derive(Clone, Copy, Debug)]
pub enum CoverageTable<'a> {
    /// A sorted list of glyph IDs; the coverage index is the position in the list.
    Glyphs(ByteView<'a>),
    /// Sorted, non-overlapping glyph ranges, each with the coverage index of its first glyph.
    Ranges(ByteView<'a>),
}

impl<'a> CoverageTable<'a> {
    pub fn new(data: ByteView<'a>) -> Result<CoverageTable<'a>, FontError> {
        match data.read_u16_at(0)? {
            1 => Ok(CoverageTable::Glyphs(data)),
            2 => Ok(CoverageTable::Ranges(data)),
            _ => Err(FontError::UnknownFormat),
        }
    }

    /// Returns the coverage index of `glyph`, or `None` if it is not covered or the table is
    /// malformed.
    #[inline]
    pub fn coverage_index(&self, glyph: GlyphId) -> Option<u16> {
        self.lookup(glyph).ok().and_then(|index| index)
    }

    pub fn lookup(&self, glyph: GlyphId) -> Result<Option<u16>, FontError> {
        match *self {
            CoverageTable::Glyphs(data) => {
                let count = data.read_u16_at(2)? as usize;
                let (mut low, mut high) = (0, count);
                while low < high {
                    let mid = (low + high) / 2;
                    let candidate = data.read_u16_at(4 + mid * 2)?;
                    if candidate < glyph {
                        low = mid + 1
                    } else if candidate > glyph {
                        high = mid
                    } else {
                        return Ok(Some(mid as u16))
                    }
                }
                Ok(None)
            }
            CoverageTable::Ranges(data) => {
                let count = data.read_u16_at(2)? as usize;
                let index = match find_range(data, 4, count, glyph)? {
                    None => return Ok(None),
                    Some(index) => index,
                };
                let record = 4 + index * RANGE_RECORD_SIZE;
                let start = data.read_u16_at(record)?;
                let start_coverage_index = data.read_u16_at(record + 4)?;
                Ok(Some(start_coverage_index.wrapping_add(glyph - start)))
            }
        }
    }

    /// Visits every covered glyph together with its coverage index.
    pub fn for_each_glyph<F>(&self, mut f: F) -> Result<(), FontError>
                             where F: FnMut(GlyphId, u16) {
        match *self {
            CoverageTable::Glyphs(data) => {
                let count = data.read_u16_at(2)? as usize;
                for index in 0..count {
                    f(data.read_u16_at(4 + index * 2)?, index as u16);
                }
            }
            CoverageTable::Ranges(data) => {
                let count = data.read_u16_at(2)? as usize;
                for index in 0..count {
                    let record = 4 + index * RANGE_RECORD_SIZE;
                    let start = data.read_u16_at(record)?;
                    let end = data.read_u16_at(record + 2)?;
                    let start_coverage_index = data.read_u16_at(record + 4)?;
                    if start > end {
                        return Err(FontError::UnknownFormat)
                    }
                    for glyph in start..=end {
                        f(glyph, start_coverage_index.wrapping_add(glyph - start));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Binary-searches `(start, end, value)` records for the first one whose end is at or past
/// `glyph`, then checks that `start <= glyph <= end`.
///
/// Shared by coverage format 2 and class definition format 2.
pub(crate) fn find_range(data: ByteView, records_offset: usize, count: usize, glyph: GlyphId)
                         -> Result<Option<usize>, FontError> {
    let (mut low, mut high) = (0, count);
    while low < high {
        let mid = (low + high) / 2;
        let end = data.read_u16_at(records_offset + mid * RANGE_RECORD_SIZE + 2)?;
        if end < glyph {
            low = mid + 1
        } else {
            high = mid
        }
    }
    if low == count {
        return Ok(None)
    }

    let start = data.read_u16_at(records_offset + low * RANGE_RECORD_SIZE)?;
    if start <= glyph {
        Ok(Some(low))
    } else {
        Ok(None)
    }
}
