// fontchain/otf/src/tag.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt::{self, Debug, Display, Formatter};

/// A four-byte OpenType table tag, compared by its raw big-endian value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u32);

impl Tag {
    pub const CMAP: Tag = Tag::new(b"cmap");
    pub const GPOS: Tag = Tag::new(b"GPOS");
    pub const HEAD: Tag = Tag::new(b"head");
    pub const HHEA: Tag = Tag::new(b"hhea");
    pub const KERN: Tag = Tag::new(b"kern");
    pub const NAME: Tag = Tag::new(b"name");
    pub const OS_2: Tag = Tag::new(b"OS/2");

    #[inline]
    pub const fn new(bytes: &[u8; 4]) -> Tag {
        Tag(((bytes[0] as u32) << 24) |
            ((bytes[1] as u32) << 16) |
            ((bytes[2] as u32) << 8)  |
             (bytes[3] as u32))
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Display for Tag {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        for &byte in &self.to_bytes() {
            let ch = if byte.is_ascii_graphic() || byte == b' ' { byte as char } else { '?' };
            write!(formatter, "{}", ch)?;
        }
        Ok(())
    }
}

impl Debug for Tag {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "Tag({})", self)
    }
}
