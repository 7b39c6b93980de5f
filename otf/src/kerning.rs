// fontchain/otf/src/kerning.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Codepoint-pair kerning, extracted from `kern` or `GPOS` and remapped through `cmap`.

use crate::gpos::GlyphPairAdjustments;
use crate::sfnt::FontFile;
use crate::GlyphId;
use fxhash::FxHashMap;

const DEFAULT_UNITS_PER_EM: u16 = 2048;

/// The table the pairs came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KerningSource {
    Kern,
    Gpos,
}

/// Size-independent kerning in design units, keyed by `(left, right)` codepoint.
#[derive(Clone, Debug)]
pub struct CodepointKerning {
    pub units_per_em: u16,
    pub pairs: FxHashMap<(u32, u32), i16>,
    pub source: KerningSource,
}

impl CodepointKerning {
    #[inline]
    pub fn design_units(&self, left: u32, right: u32) -> i16 {
        self.pairs.get(&(left, right)).cloned().unwrap_or(0)
    }

    /// The adjustment in pixels for a font rendered at `size_px`.
    #[inline]
    pub fn scaled(&self, left: u32, right: u32, size_px: f32) -> f32 {
        match self.pairs.get(&(left, right)) {
            Some(&value) => value as f32 * size_px / self.units_per_em.max(1) as f32,
            None => 0.0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Builds the codepoint kerning table for a font.
///
/// `kern` is consulted before `GPOS`; the first one that yields any codepoint pairs is used.
/// Returns `None` if the font has no usable `cmap` or neither table contributes a pair.
pub fn extract_codepoint_kerning(font: &FontFile) -> Option<CodepointKerning> {
    let cmap = font.cmap()?;
    let reverse = cmap.glyph_to_codepoints();
    if reverse.is_empty() {
        return None
    }

    let units_per_em = font.head()
                           .map(|head| head.units_per_em())
                           .filter(|&units| units != 0)
                           .unwrap_or(DEFAULT_UNITS_PER_EM);

    if let Some(kern) = font.kern() {
        let pairs = remap_to_codepoints(&kern.pairs(), &reverse, KerningSource::Kern);
        if !pairs.is_empty() {
            return Some(CodepointKerning { units_per_em, pairs, source: KerningSource::Kern })
        }
    }

    let gpos = font.gpos()?;
    let mut glyphs: Vec<GlyphId> = reverse.keys().cloned().collect();
    glyphs.sort_unstable();
    let pairs = remap_to_codepoints(&gpos.pair_adjustments(&glyphs), &reverse, KerningSource::Gpos);
    if pairs.is_empty() {
        return None
    }
    Some(CodepointKerning { units_per_em, pairs, source: KerningSource::Gpos })
}

/// Emits the cross product of codepoints for every glyph pair. Glyphs with no codepoint drop out.
fn remap_to_codepoints<R>(glyph_pairs: &GlyphPairAdjustments,
                          reverse: &FxHashMap<GlyphId, R>,
                          source: KerningSource)
                          -> FxHashMap<(u32, u32), i16>
                          where R: AsRef<[u32]> {
    let mut pairs = FxHashMap::default();
    for (&(left_glyph, right_glyph), &value) in glyph_pairs {
        let (lefts, rights) = match (reverse.get(&left_glyph), reverse.get(&right_glyph)) {
            (Some(lefts), Some(rights)) => (lefts.as_ref(), rights.as_ref()),
            _ => continue,
        };
        for &left in lefts {
            for &right in rights {
                pairs.insert((left, right), value);
            }
        }
    }
    debug!("extracted {} kerning pairs from {:?} ({} glyph pairs)",
           pairs.len(),
           source,
           glyph_pairs.len());
    pairs
}
