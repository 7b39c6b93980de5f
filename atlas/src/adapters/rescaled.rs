// fontchain/atlas/src/adapters/rescaled.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A font shown at a different size by scaling another font's glyphs.
//!
//! The source font does all loading, so a glyph loaded through either font is loaded for both.

use crate::error::AtlasResult;
use crate::font::{FontFlags, FontMetrics, NativeFontHandle, PhysicalFont};
use crate::glyph::GlyphRecord;
use crate::manager::FontAtlas;
use crate::task::FontHandle;

pub struct RescaledFont {
    handle: NativeFontHandle,
    source: FontHandle,
    scale: f32,
    metrics: FontMetrics,
}

impl RescaledFont {
    /// Shows `source` at `size_px`.
    pub fn new(source: FontHandle, size_px: f32) -> RescaledFont {
        let source_metrics = source.metrics();
        let scale = size_px / source_metrics.size_px;
        let mut metrics = source_metrics.scaled(scale);
        metrics.size_px = size_px;
        RescaledFont {
            handle: NativeFontHandle::next(),
            source,
            scale,
            metrics,
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn source(&self) -> &FontHandle {
        &self.source
    }
}

impl PhysicalFont for RescaledFont {
    #[inline]
    fn handle(&self) -> NativeFontHandle {
        self.handle
    }

    #[inline]
    fn flags(&self) -> FontFlags {
        self.source.flags() | FontFlags::RESCALED
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    #[inline]
    fn is_char_available(&self, codepoint: u32) -> bool {
        self.source.is_char_available(codepoint)
    }

    fn load_glyphs_no_fallback(&self, atlas: &FontAtlas, codepoints: &[u32])
                               -> AtlasResult<Vec<u32>> {
        self.source.load_glyphs_no_fallback(atlas, codepoints)
    }

    /// Fallback glyphs are borrowed by the source, so they are positioned for its metrics and
    /// shared with every other size of it.
    fn load_glyphs(&self, atlas: &FontAtlas, codepoints: &[u32]) -> AtlasResult<()> {
        self.source.load_glyphs(atlas, codepoints)
    }

    fn find_loaded_glyph_no_fallback(&self, codepoint: u32) -> Option<GlyphRecord> {
        self.source.find_loaded_glyph_no_fallback(codepoint).map(|glyph| glyph.scaled(self.scale))
    }

    fn is_load_attempted(&self, codepoint: u32) -> bool {
        self.source.is_load_attempted(codepoint)
    }

    #[inline]
    fn kerning(&self, left: u32, right: u32) -> f32 {
        self.source.kerning(left, right) * self.scale
    }

    fn loaded_glyphs(&self) -> Vec<GlyphRecord> {
        self.source
            .loaded_glyphs()
            .into_iter()
            .map(|glyph| glyph.scaled(self.scale))
            .collect()
    }

    fn kerning_pairs(&self) -> Vec<(u32, u32, f32)> {
        self.source
            .kerning_pairs()
            .into_iter()
            .map(|(left, right, value)| (left, right, value * self.scale))
            .collect()
    }

    /// The source keeps the glyph, in its own units.
    fn accept_substitute(&self, codepoint: u32, glyph: Option<GlyphRecord>) {
        let unscale = 1.0 / self.scale;
        self.source.accept_substitute(codepoint, glyph.map(|glyph| glyph.scaled(unscale)))
    }
}
