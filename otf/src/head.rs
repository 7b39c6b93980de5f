// fontchain/otf/src/head.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::FontError;
use crate::view::{ByteView, Jump};
use byteorder::{BigEndian, ReadBytesExt};
use std::mem;

const MAGIC_NUMBER: u32 = 0x5f0f3cf5;

const FLAGS_OFFSET: usize = 16;
const UNITS_PER_EM_OFFSET: usize = 18;
const X_MIN_OFFSET: usize = 36;
const MAC_STYLE_OFFSET: usize = 44;
const LOWEST_REC_PPEM_OFFSET: usize = 46;
const INDEX_TO_LOC_FORMAT_OFFSET: usize = 50;

bitflags! {
    pub struct MacStyle: u16 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const OUTLINE = 1 << 3;
        const SHADOW = 1 << 4;
        const CONDENSED = 1 << 5;
        const EXTENDED = 1 << 6;
    }
}

/// The font header. Fields are read from the table on demand; `new` only validates it.
#[derive(Clone, Copy, Debug)]
pub struct HeadTable<'a> {
    table: ByteView<'a>,
}

impl<'a> HeadTable<'a> {
    pub fn new(table: ByteView<'a>) -> Result<HeadTable<'a>, FontError> {
        let mut reader = table.bytes();

        // Check the version.
        let major_version = reader.read_u16::<BigEndian>().map_err(FontError::eof)?;
        let minor_version = reader.read_u16::<BigEndian>().map_err(FontError::eof)?;
        if (major_version, minor_version) != (1, 0) {
            return Err(FontError::UnsupportedVersion)
        }

        // Check the magic number, skipping the font revision and checksum adjustment.
        reader.jump(mem::size_of::<u32>() * 2)?;
        let magic_number = reader.read_u32::<BigEndian>().map_err(FontError::eof)?;
        if magic_number != MAGIC_NUMBER {
            return Err(FontError::BadMagicNumber)
        }

        // Make sure every field we expose is in bounds.
        table.read_i16_at(INDEX_TO_LOC_FORMAT_OFFSET)?;

        Ok(HeadTable { table })
    }

    #[inline]
    fn u16_at(&self, offset: usize) -> u16 {
        self.table.read_u16_at(offset).unwrap_or(0)
    }

    #[inline]
    fn i16_at(&self, offset: usize) -> i16 {
        self.table.read_i16_at(offset).unwrap_or(0)
    }

    #[inline]
    pub fn flags(&self) -> u16 {
        self.u16_at(FLAGS_OFFSET)
    }

    #[inline]
    pub fn units_per_em(&self) -> u16 {
        self.u16_at(UNITS_PER_EM_OFFSET)
    }

    #[inline]
    pub fn x_min(&self) -> i16 {
        self.i16_at(X_MIN_OFFSET)
    }

    #[inline]
    pub fn y_min(&self) -> i16 {
        self.i16_at(X_MIN_OFFSET + 2)
    }

    #[inline]
    pub fn x_max(&self) -> i16 {
        self.i16_at(X_MIN_OFFSET + 4)
    }

    #[inline]
    pub fn y_max(&self) -> i16 {
        self.i16_at(X_MIN_OFFSET + 6)
    }

    #[inline]
    pub fn mac_style(&self) -> MacStyle {
        MacStyle::from_bits_truncate(self.u16_at(MAC_STYLE_OFFSET))
    }

    /// Smallest readable size in pixels.
    #[inline]
    pub fn lowest_rec_ppem(&self) -> u16 {
        self.u16_at(LOWEST_REC_PPEM_OFFSET)
    }

    /// 0 for short `loca` offsets, 1 for long ones.
    #[inline]
    pub fn index_to_loc_format(&self) -> i16 {
        self.i16_at(INDEX_TO_LOC_FORMAT_OFFSET)
    }
}
