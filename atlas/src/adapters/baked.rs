// fontchain/atlas/src/adapters/baked.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fonts whose glyphs were drawn ahead of time into textures the atlas did not pack.
//!
//! Every glyph is known at construction. Loading only ever borrows glyphs from the fallback
//! chain.

use crate::engine::BakedGlyph;
use crate::error::AtlasResult;
use crate::font::{FontFlags, FontMetrics, GlyphTable, NativeFontHandle, PhysicalFont};
use crate::glyph::GlyphRecord;
use crate::manager::FontAtlas;
use euclid::Size2D;
use fxhash::FxHashMap;
use parking_lot::RwLock;

pub struct BakedFont {
    handle: NativeFontHandle,
    name: String,
    metrics: FontMetrics,
    table: RwLock<GlyphTable>,
    kerning: FxHashMap<(u32, u32), f32>,
}

impl BakedFont {
    pub fn new<I, K>(name: &str, metrics: FontMetrics, glyphs: I, kerning: K) -> BakedFont
                     where I: IntoIterator<Item = GlyphRecord>,
                           K: IntoIterator<Item = (u32, u32, f32)> {
        let mut table = GlyphTable::new();
        for glyph in glyphs {
            table.insert(glyph);
        }
        let kerning = kerning.into_iter()
                             .filter(|&(_, _, value)| value != 0.0)
                             .map(|(left, right, value)| ((left, right), value))
                             .collect();
        debug!("baked font {} has {} glyph(s)", name, table.len());
        BakedFont {
            handle: NativeFontHandle::next(),
            name: name.to_owned(),
            metrics,
            table: RwLock::new(table),
            kerning,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builds the record for a glyph drawn into a texture of `texture_size` that the atlas addresses
/// as `texture_index`.
pub fn baked_glyph_record(glyph: &BakedGlyph, texture_index: u16, texture_size: Size2D<u32>)
                          -> GlyphRecord {
    let (width, height) = (glyph.rect.size.width, glyph.rect.size.height);
    if width == 0 || height == 0 {
        return GlyphRecord::blank(glyph.codepoint, glyph.advance_x)
    }
    let (texture_width, texture_height) = (texture_size.width as f32, texture_size.height as f32);
    GlyphRecord {
        codepoint: glyph.codepoint,
        advance_x: glyph.advance_x,
        x0: glyph.offset.x,
        y0: glyph.offset.y,
        x1: glyph.offset.x + width as f32,
        y1: glyph.offset.y + height as f32,
        texture_index,
        u0: glyph.rect.origin.x as f32 / texture_width,
        v0: glyph.rect.origin.y as f32 / texture_height,
        u1: glyph.rect.max_x() as f32 / texture_width,
        v1: glyph.rect.max_y() as f32 / texture_height,
        colored: false,
        visible: true,
    }
}

impl PhysicalFont for BakedFont {
    #[inline]
    fn handle(&self) -> NativeFontHandle {
        self.handle
    }

    #[inline]
    fn flags(&self) -> FontFlags {
        FontFlags::BAKED
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    #[inline]
    fn is_char_available(&self, codepoint: u32) -> bool {
        self.table.read().contains(codepoint)
    }

    fn load_glyphs_no_fallback(&self, _: &FontAtlas, codepoints: &[u32])
                               -> AtlasResult<Vec<u32>> {
        let table = self.table.read();
        Ok(codepoints.iter().cloned().filter(|&codepoint| !table.is_attempted(codepoint)).collect())
    }

    #[inline]
    fn find_loaded_glyph_no_fallback(&self, codepoint: u32) -> Option<GlyphRecord> {
        self.table.read().get(codepoint)
    }

    #[inline]
    fn is_load_attempted(&self, codepoint: u32) -> bool {
        self.table.read().is_attempted(codepoint)
    }

    #[inline]
    fn kerning(&self, left: u32, right: u32) -> f32 {
        self.kerning.get(&(left, right)).cloned().unwrap_or(0.0)
    }

    fn loaded_glyphs(&self) -> Vec<GlyphRecord> {
        self.table.read().records()
    }

    fn kerning_pairs(&self) -> Vec<(u32, u32, f32)> {
        self.kerning.iter().map(|(&(left, right), &value)| (left, right, value)).collect()
    }

    fn accept_substitute(&self, codepoint: u32, glyph: Option<GlyphRecord>) {
        self.table.write().accept(codepoint, glyph)
    }
}
