// fontchain/otf/src/error.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors.

use std::fmt::{self, Display, Formatter};

/// Errors that can occur when reading OpenType fonts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FontError {
    /// The table or file ended unexpectedly.
    UnexpectedEof,
    /// There is no font with this index in this font collection.
    FontIndexOutOfBounds,
    /// The file declared that it was in a version of the format we don't support.
    UnsupportedVersion,
    /// The file was of a format we don't support.
    UnknownFormat,
    /// A table carried the wrong magic number.
    BadMagicNumber,
    /// The font character map has no supported platform/encoding ID.
    UnsupportedCmapEncoding,
    /// The font character map has an unsupported subtable format.
    UnsupportedCmapFormat,
    /// A required table is missing.
    RequiredTableMissing,
}

impl FontError {
    #[doc(hidden)]
    #[inline]
    pub fn eof<T>(_: T) -> FontError {
        FontError::UnexpectedEof
    }
}

impl Display for FontError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let message = match *self {
            FontError::UnexpectedEof => "unexpected end of font data",
            FontError::FontIndexOutOfBounds => "font index out of bounds for collection",
            FontError::UnsupportedVersion => "unsupported table version",
            FontError::UnknownFormat => "unknown font format",
            FontError::BadMagicNumber => "bad magic number",
            FontError::UnsupportedCmapEncoding => "no supported cmap encoding record",
            FontError::UnsupportedCmapFormat => "unsupported cmap subtable format",
            FontError::RequiredTableMissing => "required table missing",
        };
        formatter.write_str(message)
    }
}

impl std::error::Error for FontError {}
