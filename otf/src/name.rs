// fontchain/otf/src/name.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The naming table.

use crate::error::FontError;
use crate::view::ByteView;
use std::char;

pub const PLATFORM_UNICODE: u16 = 0;
pub const PLATFORM_MACINTOSH: u16 = 1;
pub const PLATFORM_WINDOWS: u16 = 3;

const MACINTOSH_ENCODING_ROMAN: u16 = 0;
const WINDOWS_LANGUAGE_EN_US: u16 = 0x0409;

const NAME_RECORD_SIZE: usize = 12;
const HEADER_SIZE: usize = 6;

pub const NAME_ID_FAMILY: u16 = 1;
pub const NAME_ID_SUBFAMILY: u16 = 2;
pub const NAME_ID_FULL_NAME: u16 = 4;
pub const NAME_ID_POSTSCRIPT_NAME: u16 = 6;
pub const NAME_ID_TYPOGRAPHIC_FAMILY: u16 = 16;

#[rustfmt::skip]
static MAC_ROMAN_HIGH_HALF: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è',
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü',
    '†', '°', '¢', '£', '§', '•', '¶', 'ß', '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø',
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑', '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø',
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«', '»', '…', '\u{a0}', 'À', 'Ã', 'Õ', 'Œ', 'œ',
    '–', '—', '“', '”', '‘', '’', '÷', '◊', 'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ',
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô',
    '\u{f8ff}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜', '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

/// One entry of the naming table's record array.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    length: u16,
    offset: u16,
}

impl NameRecord {
    fn is_unicode(&self) -> bool {
        self.platform_id == PLATFORM_UNICODE || self.platform_id == PLATFORM_WINDOWS
    }

    fn is_mac_roman(&self) -> bool {
        self.platform_id == PLATFORM_MACINTOSH && self.encoding_id == MACINTOSH_ENCODING_ROMAN
    }
}

#[derive(Clone, Copy, Debug)]
pub struct NameTable<'a> {
    table: ByteView<'a>,
}

impl<'a> NameTable<'a> {
    pub fn new(table: ByteView<'a>) -> Option<NameTable<'a>> {
        match table.read_u16_at(0) {
            Ok(0) | Ok(1) => Some(NameTable { table }),
            Ok(format) => {
                warn!("unsupported name table format {}", format);
                None
            }
            Err(_) => None,
        }
    }

    /// All records in the table. A truncated record array yields the records before the cut.
    pub fn records(&self) -> Vec<NameRecord> {
        let count = self.table.read_u16_at(2).unwrap_or(0) as usize;
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            match self.read_record(index) {
                Ok(record) => records.push(record),
                Err(_) => break,
            }
        }
        records
    }

    fn read_record(&self, index: usize) -> Result<NameRecord, FontError> {
        let offset = HEADER_SIZE + index * NAME_RECORD_SIZE;
        Ok(NameRecord {
            platform_id: self.table.read_u16_at(offset)?,
            encoding_id: self.table.read_u16_at(offset + 2)?,
            language_id: self.table.read_u16_at(offset + 4)?,
            name_id: self.table.read_u16_at(offset + 6)?,
            length: self.table.read_u16_at(offset + 8)?,
            offset: self.table.read_u16_at(offset + 10)?,
        })
    }

    /// Decodes the string a record points to. Returns `None` for encodings we can't decode.
    pub fn string(&self, record: &NameRecord) -> Option<String> {
        let storage_offset = self.table.read_u16_at(4).ok()? as usize;
        let data = self.table
                       .slice(storage_offset + record.offset as usize, record.length as usize)
                       .ok()?
                       .bytes();
        if record.is_unicode() {
            let units = data.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            Some(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                                          .collect())
        } else if record.is_mac_roman() {
            Some(data.iter().map(|&byte| decode_mac_roman(byte)).collect())
        } else {
            None
        }
    }

    /// Finds the best decodable string for `name_id`.
    ///
    /// Windows records in `language` (en-US when `None`) are preferred, then any Unicode or
    /// Windows record, then Macintosh Roman.
    pub fn find(&self, name_id: u16, language: Option<u16>) -> Option<String> {
        let language = language.unwrap_or(WINDOWS_LANGUAGE_EN_US);
        let records: Vec<NameRecord> =
            self.records().into_iter().filter(|record| record.name_id == name_id).collect();

        let preferred = records.iter().filter(|record| {
            record.platform_id == PLATFORM_WINDOWS && record.language_id == language
        });
        let unicode = records.iter().filter(|record| record.is_unicode());
        let mac = records.iter().filter(|record| record.is_mac_roman());

        preferred.chain(unicode)
                 .chain(mac)
                 .filter_map(|record| self.string(record))
                 .find(|string| !string.is_empty())
    }

    #[inline]
    pub fn family_name(&self) -> Option<String> {
        self.find(NAME_ID_FAMILY, None)
    }

    #[inline]
    pub fn subfamily_name(&self) -> Option<String> {
        self.find(NAME_ID_SUBFAMILY, None)
    }

    #[inline]
    pub fn full_name(&self) -> Option<String> {
        self.find(NAME_ID_FULL_NAME, None)
    }

    /// The typographic family, falling back to the legacy family name.
    #[inline]
    pub fn typographic_family_name(&self) -> Option<String> {
        self.find(NAME_ID_TYPOGRAPHIC_FAMILY, None).or_else(|| self.family_name())
    }

    #[inline]
    pub fn postscript_name(&self) -> Option<String> {
        self.find(NAME_ID_POSTSCRIPT_NAME, None)
    }
}

#[inline]
pub fn decode_mac_roman(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        MAC_ROMAN_HIGH_HALF[(byte - 0x80) as usize]
    }
}
