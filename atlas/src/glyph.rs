// fontchain/atlas/src/glyph.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Glyph records and the bitmaps they are made from.

use euclid::Size2D;

/// A glyph placed in the atlas.
///
/// Bounds are in pixels relative to the pen position at the top of the line; UVs are normalized
/// page coordinates. A record belongs to the font that created it; fonts that borrow a glyph
/// from another font copy and adjust it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GlyphRecord {
    pub codepoint: u32,
    pub advance_x: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    /// `page * 5 + slot`; see `page::texture_index`.
    pub texture_index: u16,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    /// True if the glyph is stored as BGRA color rather than coverage.
    pub colored: bool,
    /// False for glyphs with nothing to draw, such as spaces.
    pub visible: bool,
}

impl GlyphRecord {
    /// A glyph that only advances the pen.
    #[inline]
    pub fn blank(codepoint: u32, advance_x: f32) -> GlyphRecord {
        GlyphRecord {
            codepoint,
            advance_x,
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: 0.0,
            texture_index: 0,
            u0: 0.0,
            v0: 0.0,
            u1: 0.0,
            v1: 0.0,
            colored: false,
            visible: false,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn translated(mut self, dx: f32, dy: f32) -> GlyphRecord {
        self.x0 += dx;
        self.x1 += dx;
        self.y0 += dy;
        self.y1 += dy;
        self
    }

    /// Scales geometry and advance. UVs still point at the same pixels.
    #[inline]
    pub fn scaled(mut self, scale: f32) -> GlyphRecord {
        self.advance_x *= scale;
        self.x0 *= scale;
        self.y0 *= scale;
        self.x1 *= scale;
        self.y1 *= scale;
        self
    }

    #[inline]
    pub fn with_codepoint(mut self, codepoint: u32) -> GlyphRecord {
        self.codepoint = codepoint;
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BitmapFormat {
    /// One coverage byte per pixel.
    Alpha8,
    /// Four bytes per pixel, premultiplied BGRA.
    Bgra8,
}

impl BitmapFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            BitmapFormat::Alpha8 => 1,
            BitmapFormat::Bgra8 => 4,
        }
    }
}

/// Tightly packed rows of glyph pixels.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphBitmap {
    pub size: Size2D<u32>,
    pub format: BitmapFormat,
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    #[inline]
    pub fn new(size: Size2D<u32>, format: BitmapFormat, pixels: Vec<u8>) -> GlyphBitmap {
        GlyphBitmap { size, format, pixels }
    }

    #[inline]
    pub fn empty() -> GlyphBitmap {
        GlyphBitmap::new(Size2D::new(0, 0), BitmapFormat::Alpha8, vec![])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// True if the pixel buffer is as long as the size and format say.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() ==
            self.size.width as usize * self.size.height as usize * self.format.bytes_per_pixel()
    }
}
