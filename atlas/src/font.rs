// fontchain/atlas/src/font.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The contract every physical font adapter fulfills.

use crate::chain::UnicodeRange;
use crate::error::AtlasResult;
use crate::fallback;
use crate::glyph::GlyphRecord;
use crate::manager::FontAtlas;
use fxhash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FONT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identifies a font object to the host toolkit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NativeFontHandle(pub u64);

impl NativeFontHandle {
    #[inline]
    pub fn next() -> NativeFontHandle {
        NativeFontHandle(NEXT_FONT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Vertical metrics in pixels, y pointing down from the top of the line.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct FontMetrics {
    pub size_px: f32,
    pub ascent: f32,
    /// Positive, below the baseline.
    pub descent: f32,
    pub line_height: f32,
}

impl FontMetrics {
    #[inline]
    pub fn new(size_px: f32, ascent: f32, descent: f32) -> FontMetrics {
        FontMetrics { size_px, ascent, descent, line_height: ascent + descent }
    }

    #[inline]
    pub fn scaled(&self, scale: f32) -> FontMetrics {
        FontMetrics {
            size_px: self.size_px * scale,
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            line_height: self.line_height * scale,
        }
    }
}

bitflags! {
    /// What kind of adapter a font is.
    pub struct FontFlags: u8 {
        /// Glyphs are produced on demand.
        const LAZY = 0x01;
        /// Glyphs are borrowed from another font and scaled.
        const RESCALED = 0x02;
        /// The font composes several others.
        const COMPOSITE = 0x04;
        /// The font has no visible glyphs.
        const PLACEHOLDER = 0x08;
        /// Glyphs were drawn ahead of time.
        const BAKED = 0x10;
    }
}

/// A font at one pixel size whose glyphs live in the atlas.
///
/// Loading is idempotent: a codepoint that has been attempted, whether it produced a glyph or
/// was deliberately given up on, is never loaded again.
pub trait PhysicalFont: Send + Sync {
    fn handle(&self) -> NativeFontHandle;

    fn flags(&self) -> FontFlags;

    fn metrics(&self) -> FontMetrics;

    fn is_char_available(&self, codepoint: u32) -> bool;

    /// Loads the glyphs this font has itself and returns the codepoints it lacks and has not
    /// given up on.
    fn load_glyphs_no_fallback(&self, atlas: &FontAtlas, codepoints: &[u32])
                               -> AtlasResult<Vec<u32>>;

    /// Loads glyphs, borrowing the ones this font lacks from the atlas's fallback chain.
    fn load_glyphs(&self, atlas: &FontAtlas, codepoints: &[u32]) -> AtlasResult<()> {
        let missing = self.load_glyphs_no_fallback(atlas, codepoints)?;
        fallback::substitute_missing(self, atlas, &missing)
    }

    fn load_ranges(&self, atlas: &FontAtlas, ranges: &[UnicodeRange]) -> AtlasResult<()> {
        let codepoints: Vec<u32> = ranges.iter()
                                         .flat_map(|range| range.codepoints())
                                         .filter(|&codepoint| self.is_char_available(codepoint))
                                         .collect();
        self.load_glyphs(atlas, &codepoints)
    }

    fn find_loaded_glyph_no_fallback(&self, codepoint: u32) -> Option<GlyphRecord>;

    fn is_load_attempted(&self, codepoint: u32) -> bool;

    /// Horizontal adjustment in pixels between two codepoints.
    fn kerning(&self, left: u32, right: u32) -> f32;

    fn loaded_glyphs(&self) -> Vec<GlyphRecord>;

    /// `(left, right, pixels)` for every pair whose glyphs are both loaded.
    fn kerning_pairs(&self) -> Vec<(u32, u32, f32)>;

    /// Records a glyph borrowed from another font, or with `None` that the codepoint has no glyph
    /// anywhere. Either way the codepoint counts as attempted.
    fn accept_substitute(&self, codepoint: u32, glyph: Option<GlyphRecord>);
}

/// Loaded glyphs and attempted codepoints.
#[derive(Clone, Default, Debug)]
pub struct GlyphTable {
    glyphs: FxHashMap<u32, GlyphRecord>,
    attempted: FxHashSet<u32>,
}

impl GlyphTable {
    #[inline]
    pub fn new() -> GlyphTable {
        GlyphTable::default()
    }

    #[inline]
    pub fn get(&self, codepoint: u32) -> Option<GlyphRecord> {
        self.glyphs.get(&codepoint).cloned()
    }

    #[inline]
    pub fn insert(&mut self, glyph: GlyphRecord) {
        self.attempted.insert(glyph.codepoint);
        self.glyphs.insert(glyph.codepoint, glyph);
    }

    #[inline]
    pub fn mark_attempted(&mut self, codepoint: u32) {
        self.attempted.insert(codepoint);
    }

    #[inline]
    pub fn is_attempted(&self, codepoint: u32) -> bool {
        self.attempted.contains(&codepoint)
    }

    pub fn accept(&mut self, codepoint: u32, glyph: Option<GlyphRecord>) {
        match glyph {
            Some(glyph) => self.insert(glyph.with_codepoint(codepoint)),
            None => self.mark_attempted(codepoint),
        }
    }

    #[inline]
    pub fn contains(&self, codepoint: u32) -> bool {
        self.glyphs.contains_key(&codepoint)
    }

    pub fn records(&self) -> Vec<GlyphRecord> {
        self.glyphs.values().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
