// fontchain/atlas/src/adapters/rasterized.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fonts whose glyphs are rasterized by the platform text engine on first use.

use crate::engine::{FontFace, RasterMode, RasterizedGlyph};
use crate::error::{AtlasError, AtlasResult};
use crate::font::{FontFlags, FontMetrics, GlyphTable, NativeFontHandle, PhysicalFont};
use crate::glyph::{BitmapFormat, GlyphRecord};
use crate::ident::FontIdentifier;
use crate::manager::FontAtlas;
use fontchain_otf::MISSING_GLYPH;
use fontchain_otf::kerning::CodepointKerning;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

pub struct RasterizedFont {
    handle: NativeFontHandle,
    identifier: FontIdentifier,
    face: Arc<dyn FontFace>,
    metrics: FontMetrics,
    kerning: Option<Arc<CodepointKerning>>,
    /// Held for a whole load so that two threads never rasterize the same glyph.
    load_lock: Mutex<()>,
    table: RwLock<GlyphTable>,
}

impl RasterizedFont {
    pub fn new(identifier: FontIdentifier,
               face: Arc<dyn FontFace>,
               size_px: f32,
               kerning: Option<Arc<CodepointKerning>>)
               -> RasterizedFont {
        let mut metrics = face.metrics(size_px);
        metrics.size_px = size_px;
        RasterizedFont {
            handle: NativeFontHandle::next(),
            identifier,
            face,
            metrics,
            kerning,
            load_lock: Mutex::new(()),
            table: RwLock::new(GlyphTable::new()),
        }
    }

    #[inline]
    pub fn identifier(&self) -> &FontIdentifier {
        &self.identifier
    }

    fn rasterize(&self, glyph: u16) -> AtlasResult<RasterizedGlyph> {
        let raster = self.face.rasterize(glyph, self.metrics.size_px, RasterMode::Grayscale)?;
        if !raster.bitmap.is_empty() {
            return Ok(raster)
        }
        let retry = self.face.rasterize(glyph, self.metrics.size_px, RasterMode::SubpixelAverage)?;
        if retry.bitmap.is_empty() {
            Ok(raster)
        } else {
            Ok(retry)
        }
    }

    fn load_glyph(&self, atlas: &FontAtlas, codepoint: u32, glyph: u16)
                  -> AtlasResult<GlyphRecord> {
        let raster = self.rasterize(glyph)?;
        if raster.bitmap.is_empty() {
            return Ok(GlyphRecord::blank(codepoint, raster.advance_x))
        }
        if !raster.bitmap.is_well_formed() {
            return Err(AtlasError::MalformedTableData(format!("glyph {} of {} has a short bitmap",
                                                              glyph,
                                                              self.identifier)))
        }

        let placement = atlas.place_glyph(&raster.bitmap)?;
        let (x0, y0) = (raster.bearing.x, self.metrics.ascent - raster.bearing.y);
        trace!("rasterized U+{:04X} of {} into texture {}",
               codepoint,
               self.identifier,
               placement.texture_index);
        Ok(GlyphRecord {
            codepoint,
            advance_x: raster.advance_x,
            x0,
            y0,
            x1: x0 + raster.bitmap.size.width as f32,
            y1: y0 + raster.bitmap.size.height as f32,
            texture_index: placement.texture_index,
            u0: placement.uv[0],
            v0: placement.uv[1],
            u1: placement.uv[2],
            v1: placement.uv[3],
            colored: raster.bitmap.format == BitmapFormat::Bgra8,
            visible: true,
        })
    }
}

impl PhysicalFont for RasterizedFont {
    #[inline]
    fn handle(&self) -> NativeFontHandle {
        self.handle
    }

    #[inline]
    fn flags(&self) -> FontFlags {
        FontFlags::LAZY
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    #[inline]
    fn is_char_available(&self, codepoint: u32) -> bool {
        self.face.glyph_index(codepoint) != MISSING_GLYPH
    }

    fn load_glyphs_no_fallback(&self, atlas: &FontAtlas, codepoints: &[u32])
                               -> AtlasResult<Vec<u32>> {
        let _guard = self.load_lock.lock();
        let mut missing = vec![];
        for &codepoint in codepoints {
            if self.table.read().is_attempted(codepoint) {
                continue
            }
            let glyph = self.face.glyph_index(codepoint);
            if glyph == MISSING_GLYPH {
                missing.push(codepoint);
                continue
            }

            match self.load_glyph(atlas, codepoint, glyph) {
                Ok(record) => self.table.write().insert(record),
                Err(AtlasError::Disposed) => return Err(AtlasError::Disposed),
                Err(error) => {
                    warn!("giving up on U+{:04X} of {}: {}", codepoint, self.identifier, error);
                    self.table.write().mark_attempted(codepoint);
                }
            }
        }
        Ok(missing)
    }

    #[inline]
    fn find_loaded_glyph_no_fallback(&self, codepoint: u32) -> Option<GlyphRecord> {
        self.table.read().get(codepoint)
    }

    #[inline]
    fn is_load_attempted(&self, codepoint: u32) -> bool {
        self.table.read().is_attempted(codepoint)
    }

    fn kerning(&self, left: u32, right: u32) -> f32 {
        match self.kerning {
            Some(ref kerning) => kerning.scaled(left, right, self.metrics.size_px),
            None => 0.0,
        }
    }

    fn loaded_glyphs(&self) -> Vec<GlyphRecord> {
        self.table.read().records()
    }

    fn kerning_pairs(&self) -> Vec<(u32, u32, f32)> {
        let kerning = match self.kerning {
            Some(ref kerning) => kerning,
            None => return vec![],
        };
        let table = self.table.read();
        kerning.pairs
               .keys()
               .filter(|&&(left, right)| table.contains(left) && table.contains(right))
               .map(|&(left, right)| (left, right, self.kerning(left, right)))
               .collect()
    }

    fn accept_substitute(&self, codepoint: u32, glyph: Option<GlyphRecord>) {
        self.table.write().accept(codepoint, glyph)
    }
}
