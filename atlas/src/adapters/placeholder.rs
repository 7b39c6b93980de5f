// fontchain/atlas/src/adapters/placeholder.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A font that only reserves line height.

use crate::error::AtlasResult;
use crate::font::{FontFlags, FontMetrics, NativeFontHandle, PhysicalFont};
use crate::glyph::GlyphRecord;
use crate::manager::FontAtlas;

const SPACE: u32 = 0x20;

/// Stands in for a font that failed or is still loading. Its only glyph is an invisible space
/// a quarter of the size wide.
pub struct PlaceholderFont {
    handle: NativeFontHandle,
    metrics: FontMetrics,
    space: GlyphRecord,
}

impl PlaceholderFont {
    pub fn new(size_px: f32, ascent: f32, descent: f32) -> PlaceholderFont {
        PlaceholderFont {
            handle: NativeFontHandle::next(),
            metrics: FontMetrics::new(size_px, ascent, descent),
            space: GlyphRecord::blank(SPACE, (size_px / 4.0).round()),
        }
    }
}

impl PhysicalFont for PlaceholderFont {
    #[inline]
    fn handle(&self) -> NativeFontHandle {
        self.handle
    }

    #[inline]
    fn flags(&self) -> FontFlags {
        FontFlags::PLACEHOLDER
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    #[inline]
    fn is_char_available(&self, codepoint: u32) -> bool {
        codepoint == SPACE
    }

    /// Nothing to load, and nothing is borrowed: a placeholder never draws.
    fn load_glyphs_no_fallback(&self, _: &FontAtlas, _: &[u32]) -> AtlasResult<Vec<u32>> {
        Ok(vec![])
    }

    #[inline]
    fn find_loaded_glyph_no_fallback(&self, codepoint: u32) -> Option<GlyphRecord> {
        if codepoint == SPACE {
            Some(self.space)
        } else {
            None
        }
    }

    #[inline]
    fn is_load_attempted(&self, _: u32) -> bool {
        true
    }

    #[inline]
    fn kerning(&self, _: u32, _: u32) -> f32 {
        0.0
    }

    fn loaded_glyphs(&self) -> Vec<GlyphRecord> {
        vec![self.space]
    }

    fn kerning_pairs(&self) -> Vec<(u32, u32, f32)> {
        vec![]
    }

    fn accept_substitute(&self, _: u32, _: Option<GlyphRecord>) {}
}
