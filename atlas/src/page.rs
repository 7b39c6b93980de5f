// fontchain/atlas/src/page.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Texture pages and the set of pages backing an atlas.
//!
//! Every page is a BGRA8 buffer. Color pages hand out whole pixels; alpha pages run one packer
//! per channel so that four coverage glyphs can share each pixel. A glyph's texture index is
//! `page * 5 + slot`, where slot 0 is the full BGRA page and slots 1 through 4 are its blue,
//! green, red, and alpha channels.

use crate::error::{AtlasError, AtlasResult};
use crate::gamma::GammaTable;
use crate::glyph::{BitmapFormat, GlyphBitmap};
use crate::options::AtlasOptions;
use crate::rect_packer::RectPacker;
use euclid::{Point2D, Rect, Size2D};
use smallvec::SmallVec;

pub const SLOTS_PER_PAGE: u16 = 5;
pub const COLOR_SLOT: u16 = 0;
pub const CHANNEL_COUNT: usize = 4;

#[inline]
pub fn texture_index(page: usize, slot: u16) -> u16 {
    page as u16 * SLOTS_PER_PAGE + slot
}

/// Splits a texture index into its page and slot.
#[inline]
pub fn split_texture_index(texture_index: u16) -> (usize, u16) {
    ((texture_index / SLOTS_PER_PAGE) as usize, texture_index % SLOTS_PER_PAGE)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PageKind {
    Color,
    Alpha,
}

/// Where a bitmap ended up.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Placement {
    pub texture_index: u16,
    pub rect: Rect<u32>,
    /// `[u0, v0, u1, v1]`.
    pub uv: [f32; 4],
}

pub struct TexturePage {
    kind: PageKind,
    size: Size2D<u32>,
    pixels: Vec<u8>,
    /// Empty for pages supplied from outside, which are never packed into.
    packers: SmallVec<[RectPacker; CHANNEL_COUNT]>,
    dirty: bool,
}

impl TexturePage {
    pub fn new(kind: PageKind, size: Size2D<u32>, padding: u32) -> TexturePage {
        let packer_count = match kind {
            PageKind::Color => 1,
            PageKind::Alpha => CHANNEL_COUNT,
        };
        TexturePage {
            kind,
            size,
            pixels: vec![0; size.width as usize * size.height as usize * 4],
            packers: (0..packer_count).map(|_| RectPacker::new(size, padding)).collect(),
            dirty: true,
        }
    }

    /// An alpha page whose first channel keeps its top `reserved_height` rows for content that
    /// is placed by hand.
    pub fn with_reserved_top(size: Size2D<u32>, padding: u32, reserved_height: u32)
                             -> TexturePage {
        let mut page = TexturePage::new(PageKind::Alpha, size, padding);
        page.packers[0] = RectPacker::with_reserved_top(size, padding, reserved_height);
        page
    }

    /// Wraps pixels that already hold glyphs, such as a game font texture.
    pub fn external(size: Size2D<u32>, pixels: Vec<u8>) -> AtlasResult<TexturePage> {
        if pixels.len() != size.width as usize * size.height as usize * 4 {
            return Err(AtlasError::MalformedTableData(format!("texture of {}x{} has {} bytes",
                                                              size.width,
                                                              size.height,
                                                              pixels.len())))
        }
        Ok(TexturePage {
            kind: PageKind::Alpha,
            size,
            pixels,
            packers: SmallVec::new(),
            dirty: true,
        })
    }

    #[inline]
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    #[inline]
    pub fn size(&self) -> Size2D<u32> {
        self.size
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.packers.is_empty()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false
    }

    /// Reads one BGRA pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.size.width as usize + x as usize) * 4;
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.pixels[offset..offset + 4]);
        pixel
    }

    /// Finds room for a rectangle, trying each channel in turn. Returns the slot and origin.
    pub fn allocate(&mut self, size: &Size2D<u32>) -> Option<(u16, Point2D<u32>)> {
        let kind = self.kind;
        self.packers.iter_mut().enumerate().filter_map(|(index, packer)| {
            packer.pack(size).map(|origin| {
                let slot = match kind {
                    PageKind::Color => COLOR_SLOT,
                    PageKind::Alpha => index as u16 + 1,
                };
                (slot, origin)
            })
        }).next()
    }

    /// Writes coverage into a rectangle. Slot 0 stores it as white with that alpha; slots 1
    /// through 4 store it in one channel.
    pub fn write_coverage(&mut self, slot: u16, rect: &Rect<u32>, coverage: &[u8]) {
        let width = rect.size.width as usize;
        for row in 0..rect.size.height as usize {
            let source = &coverage[row * width..(row + 1) * width];
            let y = rect.origin.y as usize + row;
            let start = (y * self.size.width as usize + rect.origin.x as usize) * 4;
            let destination = &mut self.pixels[start..start + width * 4];
            for (pixel, &value) in destination.chunks_exact_mut(4).zip(source) {
                if slot == COLOR_SLOT {
                    pixel.copy_from_slice(&[255, 255, 255, value]);
                } else {
                    pixel[slot as usize - 1] = value;
                }
            }
        }
        self.dirty = true;
    }

    /// Copies BGRA pixels into a rectangle.
    pub fn write_bgra(&mut self, rect: &Rect<u32>, bgra: &[u8]) {
        let row_bytes = rect.size.width as usize * 4;
        for row in 0..rect.size.height as usize {
            let y = rect.origin.y as usize + row;
            let start = (y * self.size.width as usize + rect.origin.x as usize) * 4;
            self.pixels[start..start + row_bytes]
                .copy_from_slice(&bgra[row * row_bytes..(row + 1) * row_bytes]);
        }
        self.dirty = true;
    }

    #[inline]
    pub fn uv_rect(&self, rect: &Rect<u32>) -> [f32; 4] {
        let (width, height) = (self.size.width as f32, self.size.height as f32);
        [
            rect.origin.x as f32 / width,
            rect.origin.y as f32 / height,
            rect.max_x() as f32 / width,
            rect.max_y() as f32 / height,
        ]
    }
}

/// All pages of one atlas.
pub struct PageSet {
    pages: Vec<TexturePage>,
    page_size: Size2D<u32>,
    padding: u32,
    max_pages: usize,
    use_alpha_channels: bool,
}

impl PageSet {
    pub fn new(options: &AtlasOptions) -> PageSet {
        PageSet {
            pages: vec![],
            page_size: Size2D::new(options.page_width, options.page_height),
            padding: options.glyph_padding,
            max_pages: options.max_pages,
            use_alpha_channels: options.use_alpha_channels,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[inline]
    pub fn page_size(&self) -> Size2D<u32> {
        self.page_size
    }

    #[inline]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TexturePage> {
        self.pages.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TexturePage> {
        self.pages.get_mut(index)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TexturePage> {
        self.pages.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TexturePage> {
        self.pages.iter_mut()
    }

    pub fn clear(&mut self) {
        self.pages.clear()
    }

    /// Appends a page, returning its index.
    pub fn push(&mut self, page: TexturePage) -> AtlasResult<usize> {
        if self.pages.len() >= self.max_pages {
            return Err(AtlasError::OutOfAtlasSpace { max_pages: self.max_pages })
        }
        self.pages.push(page);
        Ok(self.pages.len() - 1)
    }

    /// Packs a bitmap into the first page with room, adding a page if none has any, and copies
    /// the pixels in. Coverage is remapped through `gamma` on the way.
    pub fn place(&mut self, bitmap: &GlyphBitmap, gamma: &GammaTable) -> AtlasResult<Placement> {
        if !bitmap.is_well_formed() {
            return Err(AtlasError::invalid(format!("a {}x{} {:?} bitmap has {} bytes of pixels",
                                                   bitmap.size.width,
                                                   bitmap.size.height,
                                                   bitmap.format,
                                                   bitmap.pixels.len())))
        }
        let kind = if bitmap.format == BitmapFormat::Bgra8 || !self.use_alpha_channels {
            PageKind::Color
        } else {
            PageKind::Alpha
        };
        if bitmap.size.width + self.padding * 2 > self.page_size.width ||
                bitmap.size.height + self.padding * 2 > self.page_size.height {
            return Err(AtlasError::invalid(format!("a {}x{} glyph cannot fit on a {}x{} page",
                                                   bitmap.size.width,
                                                   bitmap.size.height,
                                                   self.page_size.width,
                                                   self.page_size.height)))
        }

        let mut found = None;
        for (page_index, page) in self.pages.iter_mut().enumerate() {
            if page.kind() != kind || page.is_external() {
                continue
            }
            if let Some((slot, origin)) = page.allocate(&bitmap.size) {
                found = Some((page_index, slot, origin));
                break
            }
        }

        let (page_index, slot, origin) = match found {
            Some(found) => found,
            None => {
                let page_index = self.push(TexturePage::new(kind, self.page_size, self.padding))?;
                debug!("allocated {:?} texture page {}", kind, page_index);
                let (slot, origin) = self.pages[page_index]
                                         .allocate(&bitmap.size)
                                         .ok_or(AtlasError::OutOfAtlasSpace {
                                             max_pages: self.max_pages,
                                         })?;
                (page_index, slot, origin)
            }
        };

        let rect = Rect::new(origin, bitmap.size);
        let page = &mut self.pages[page_index];
        match bitmap.format {
            BitmapFormat::Bgra8 => page.write_bgra(&rect, &bitmap.pixels),
            BitmapFormat::Alpha8 => {
                let mut coverage = bitmap.pixels.clone();
                gamma.apply_to(&mut coverage);
                page.write_coverage(slot, &rect, &coverage);
            }
        }

        let uv = page.uv_rect(&rect);
        Ok(Placement { texture_index: texture_index(page_index, slot), rect, uv })
    }

    pub fn mark_all_dirty(&mut self) {
        for page in &mut self.pages {
            page.mark_dirty();
        }
    }
}
