// fontchain/otf/src/view.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bounds-checked big-endian views over borrowed font data.

use crate::error::FontError;
use byteorder::{BigEndian, ByteOrder};

/// A non-owning window into a font buffer.
///
/// Every read is checked against the window length; a read that would run past the end returns
/// `FontError::UnexpectedEof` instead of panicking.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ByteView<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteView<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> ByteView<'a> {
        ByteView { bytes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    fn window(&self, offset: usize, len: usize) -> Result<&'a [u8], FontError> {
        let end = offset.checked_add(len).ok_or(FontError::UnexpectedEof)?;
        self.bytes.get(offset..end).ok_or(FontError::UnexpectedEof)
    }

    #[inline]
    pub fn read_u8_at(&self, offset: usize) -> Result<u8, FontError> {
        self.bytes.get(offset).cloned().ok_or(FontError::UnexpectedEof)
    }

    #[inline]
    pub fn read_u16_at(&self, offset: usize) -> Result<u16, FontError> {
        Ok(BigEndian::read_u16(self.window(offset, 2)?))
    }

    #[inline]
    pub fn read_i16_at(&self, offset: usize) -> Result<i16, FontError> {
        Ok(BigEndian::read_i16(self.window(offset, 2)?))
    }

    #[inline]
    pub fn read_u32_at(&self, offset: usize) -> Result<u32, FontError> {
        Ok(BigEndian::read_u32(self.window(offset, 4)?))
    }

    #[inline]
    pub fn read_i32_at(&self, offset: usize) -> Result<i32, FontError> {
        Ok(BigEndian::read_i32(self.window(offset, 4)?))
    }

    /// Returns the view starting `offset` bytes in and running to the end.
    #[inline]
    pub fn subview(&self, offset: usize) -> Result<ByteView<'a>, FontError> {
        self.bytes.get(offset..).map(ByteView::new).ok_or(FontError::UnexpectedEof)
    }

    /// Returns the `len`-byte view starting `offset` bytes in.
    #[inline]
    pub fn slice(&self, offset: usize, len: usize) -> Result<ByteView<'a>, FontError> {
        self.window(offset, len).map(ByteView::new)
    }

    /// Returns a sequential cursor positioned at `offset`, for use with `ReadBytesExt`.
    #[inline]
    pub fn reader_at(&self, offset: usize) -> Result<&'a [u8], FontError> {
        self.bytes.get(offset..).ok_or(FontError::UnexpectedEof)
    }
}

/// A faster version of `Seek` that supports only forward motion from the current position.
pub trait Jump {
    /// Moves the pointer forward `n` bytes from the *current* position.
    fn jump(&mut self, n: usize) -> Result<(), FontError>;
}

impl<'a> Jump for &'a [u8] {
    #[inline]
    fn jump(&mut self, n: usize) -> Result<(), FontError> {
        if n <= self.len() {
            *self = &(*self)[n..];
            Ok(())
        } else {
            Err(FontError::UnexpectedEof)
        }
    }
}
