// fontchain/otf/src/sfnt.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The sfnt table directory, including TrueType collections.

use crate::cmap::CmapTable;
use crate::error::FontError;
use crate::gpos::GposTable;
use crate::head::HeadTable;
use crate::kern::KernTable;
use crate::name::NameTable;
use crate::tag::Tag;
use crate::view::{ByteView, Jump};
use byteorder::{BigEndian, ReadBytesExt};
use smallvec::SmallVec;
use std::mem;

const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
const SFNT_VERSION_APPLE_TRUE: Tag = Tag::new(b"true");
const SFNT_VERSION_CFF: Tag = Tag::new(b"OTTO");
const TTC_TAG: Tag = Tag::new(b"ttcf");

#[derive(Clone, Copy, Debug)]
struct TableRecord {
    tag: Tag,
    offset: u32,
    length: u32,
}

/// One face of a font file, with its table directory read.
#[derive(Clone, Debug)]
pub struct FontFile<'a> {
    bytes: &'a [u8],
    tables: SmallVec<[TableRecord; 24]>,
}

impl<'a> FontFile<'a> {
    /// Reads the table directory of face `index` in `bytes`.
    ///
    /// Plain `.ttf`/`.otf` files only have face 0.
    pub fn new(bytes: &'a [u8], index: u32) -> Result<FontFile<'a>, FontError> {
        let mut reader = bytes;
        let magic = reader.read_u32::<BigEndian>().map_err(FontError::eof)?;

        let directory_offset = if magic == TTC_TAG.0 {
            // Skip the major and minor version.
            reader.jump(mem::size_of::<u16>() * 2)?;
            let face_count = reader.read_u32::<BigEndian>().map_err(FontError::eof)?;
            if index >= face_count {
                return Err(FontError::FontIndexOutOfBounds)
            }
            reader.jump(index as usize * mem::size_of::<u32>())?;
            reader.read_u32::<BigEndian>().map_err(FontError::eof)? as usize
        } else if index != 0 {
            return Err(FontError::FontIndexOutOfBounds)
        } else {
            0
        };

        let mut reader = ByteView::new(bytes).reader_at(directory_offset)?;
        let sfnt_version = reader.read_u32::<BigEndian>().map_err(FontError::eof)?;
        if sfnt_version != SFNT_VERSION_TRUETYPE && sfnt_version != SFNT_VERSION_APPLE_TRUE.0 &&
                sfnt_version != SFNT_VERSION_CFF.0 {
            return Err(FontError::UnknownFormat)
        }

        let num_tables = reader.read_u16::<BigEndian>().map_err(FontError::eof)?;
        // Skip the binary search hints.
        reader.jump(mem::size_of::<u16>() * 3)?;

        let mut tables: SmallVec<[TableRecord; 24]> = SmallVec::new();
        for _ in 0..num_tables {
            let tag = Tag(reader.read_u32::<BigEndian>().map_err(FontError::eof)?);

            // Skip over the checksum.
            reader.jump(mem::size_of::<u32>())?;

            let offset = reader.read_u32::<BigEndian>().map_err(FontError::eof)?;
            let length = reader.read_u32::<BigEndian>().map_err(FontError::eof)?;

            // Make sure there isn't more than one copy of the table.
            if tables.iter().any(|record| record.tag == tag) {
                return Err(FontError::UnknownFormat)
            }
            tables.push(TableRecord { tag, offset, length });
        }

        Ok(FontFile { bytes, tables })
    }

    /// Returns the number of faces in `bytes`: the collection size for `.ttc` files, else 1.
    pub fn face_count(bytes: &[u8]) -> Result<u32, FontError> {
        let view = ByteView::new(bytes);
        if view.read_u32_at(0)? == TTC_TAG.0 {
            view.read_u32_at(8)
        } else {
            Ok(1)
        }
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tables.iter().map(|record| record.tag)
    }

    /// Returns the raw data of the table with the given tag.
    ///
    /// A directory entry pointing outside the file reads as absent.
    pub fn table(&self, tag: Tag) -> Option<ByteView<'a>> {
        let record = self.tables.iter().find(|record| record.tag == tag)?;
        match ByteView::new(self.bytes).slice(record.offset as usize, record.length as usize) {
            Ok(view) => Some(view),
            Err(_) => {
                warn!("table {} lies outside the font data ({}+{} > {}); ignoring",
                      tag,
                      record.offset,
                      record.length,
                      self.bytes.len());
                None
            }
        }
    }

    #[inline]
    pub fn cmap(&self) -> Option<CmapTable<'a>> {
        self.table(Tag::CMAP).map(CmapTable::new)
    }

    #[inline]
    pub fn kern(&self) -> Option<KernTable<'a>> {
        self.table(Tag::KERN).and_then(KernTable::new)
    }

    #[inline]
    pub fn gpos(&self) -> Option<GposTable<'a>> {
        self.table(Tag::GPOS).and_then(GposTable::new)
    }

    #[inline]
    pub fn head(&self) -> Option<HeadTable<'a>> {
        self.table(Tag::HEAD).and_then(|table| HeadTable::new(table).ok())
    }

    #[inline]
    pub fn name(&self) -> Option<NameTable<'a>> {
        self.table(Tag::NAME).and_then(NameTable::new)
    }
}
