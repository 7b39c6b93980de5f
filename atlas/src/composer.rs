// fontchain/atlas/src/composer.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Composes the fonts of a chain into one logical font.
//!
//! Each codepoint is taken from the first member whose ranges include it and whose font has it.
//! Member glyphs are copied into the chain's own table, moved into the primary font's vertical
//! frame, so later lookups never touch the members.

use crate::chain::{FontChain, FontChainEntry, VerticalAlignment};
use crate::error::{AtlasError, AtlasResult};
use crate::font::{FontFlags, FontMetrics, GlyphTable, NativeFontHandle, PhysicalFont};
use crate::glyph::GlyphRecord;
use crate::ident::size_key;
use crate::manager::FontAtlas;
use crate::task::FontHandle;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};

/// A chain entry together with the font it resolved to.
pub struct ChainMember {
    pub entry: FontChainEntry,
    pub font: FontHandle,
    offset_y: f32,
}

pub struct ChainFont {
    handle: NativeFontHandle,
    chain: FontChain,
    metrics: FontMetrics,
    members: Vec<ChainMember>,
    load_lock: Mutex<()>,
    table: RwLock<GlyphTable>,
    /// Which member each loaded codepoint came from.
    sources: RwLock<FxHashMap<u32, usize>>,
    /// Smaller sizes of member fonts used to fit wide glyphs into fixed-width boxes.
    narrowed: Mutex<Vec<FontHandle>>,
}

impl ChainFont {
    /// Composes resolved members. The first member must be the chain's primary entry.
    pub fn new(chain: FontChain, members: Vec<(FontChainEntry, FontHandle)>)
               -> AtlasResult<ChainFont> {
        let primary = match members.first() {
            Some(&(_, ref font)) => font.metrics(),
            None => return Err(AtlasError::invalid("font chain has no fonts")),
        };
        let natural_height = primary.ascent + primary.descent;
        let extra = natural_height * chain.line_height_ratio - natural_height;
        let metrics = FontMetrics {
            size_px: chain.primary.size_px,
            ascent: primary.ascent + extra / 2.0,
            descent: primary.descent + extra / 2.0,
            line_height: natural_height + extra,
        };

        let members = members.into_iter().map(|(entry, font)| {
            let member = font.metrics();
            let alignment = match chain.vertical_alignment {
                VerticalAlignment::Top => 0.0,
                VerticalAlignment::Middle => {
                    (natural_height - (member.ascent + member.descent)) / 2.0
                }
                VerticalAlignment::Baseline => primary.ascent - member.ascent,
                VerticalAlignment::Bottom => natural_height - (member.ascent + member.descent),
            };
            let offset_y = alignment + extra / 2.0 + entry.offset_y;
            ChainMember { entry, font, offset_y }
        }).collect();

        Ok(ChainFont {
            handle: NativeFontHandle::next(),
            chain,
            metrics,
            members,
            load_lock: Mutex::new(()),
            table: RwLock::new(GlyphTable::new()),
            sources: RwLock::new(FxHashMap::default()),
            narrowed: Mutex::new(vec![]),
        })
    }

    #[inline]
    pub fn chain(&self) -> &FontChain {
        &self.chain
    }

    #[inline]
    pub fn members(&self) -> &[ChainMember] {
        &self.members
    }

    /// The member a loaded codepoint came from, if it came from a member.
    pub fn source_of(&self, codepoint: u32) -> Option<usize> {
        self.sources.read().get(&codepoint).cloned()
    }

    #[inline]
    fn fixed_width(&self) -> Option<f32> {
        if self.chain.glyph_width_ratio > 0.0 {
            Some(self.chain.glyph_width_ratio * self.chain.primary.size_px)
        } else {
            None
        }
    }

    /// Loads the glyph again from a smaller size of the member's font so it fits `width`.
    fn narrow(&self, atlas: &FontAtlas, member: &ChainMember, glyph: GlyphRecord, width: f32)
              -> AtlasResult<GlyphRecord> {
        let size_px = member.entry.size_px * width / glyph.width();
        if size_key(size_px) == size_key(member.entry.size_px) {
            return Ok(glyph)
        }
        let font = atlas.get_font(&member.entry.identifier, size_px)?.wait()?;
        font.load_glyphs_no_fallback(atlas, &[glyph.codepoint])?;
        let narrow = match font.find_loaded_glyph_no_fallback(glyph.codepoint) {
            Some(narrow) => narrow,
            None => return Ok(glyph),
        };
        let offset_y = member.font.metrics().ascent - font.metrics().ascent;
        self.narrowed.lock().push(font);
        Ok(narrow.translated(0.0, offset_y))
    }

    fn compose(&self, atlas: &FontAtlas, member: &ChainMember, glyph: GlyphRecord)
               -> GlyphRecord {
        let mut glyph = glyph;
        let width = match self.fixed_width() {
            None => {
                glyph.advance_x += member.entry.letter_spacing;
                return glyph.translated(member.entry.offset_x, member.offset_y)
            }
            Some(width) => width,
        };

        if glyph.visible && glyph.width() > width {
            glyph = match self.narrow(atlas, member, glyph, width) {
                Ok(narrow) => narrow,
                Err(error) => {
                    warn!("cannot narrow U+{:04X} of {}: {}",
                          glyph.codepoint,
                          member.entry.identifier,
                          error);
                    glyph
                }
            };
        }
        let center_x = (width - glyph.width()) / 2.0 - glyph.x0;
        glyph.advance_x = width;
        glyph.translated(center_x + member.entry.offset_x, member.offset_y)
    }
}

impl PhysicalFont for ChainFont {
    #[inline]
    fn handle(&self) -> NativeFontHandle {
        self.handle
    }

    #[inline]
    fn flags(&self) -> FontFlags {
        FontFlags::COMPOSITE | FontFlags::LAZY
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn is_char_available(&self, codepoint: u32) -> bool {
        self.members.iter().any(|member| {
            member.entry.covers(codepoint) && member.font.is_char_available(codepoint)
        })
    }

    fn load_glyphs_no_fallback(&self, atlas: &FontAtlas, codepoints: &[u32])
                               -> AtlasResult<Vec<u32>> {
        let _guard = self.load_lock.lock();
        let mut remaining: Vec<u32> = {
            let table = self.table.read();
            codepoints.iter().cloned().filter(|&codepoint| !table.is_attempted(codepoint)).collect()
        };

        for (index, member) in self.members.iter().enumerate() {
            if remaining.is_empty() {
                break
            }
            let wanted: Vec<u32> = remaining.iter().cloned().filter(|&codepoint| {
                member.entry.covers(codepoint) && member.font.is_char_available(codepoint)
            }).collect();
            if wanted.is_empty() {
                continue
            }

            member.font.load_glyphs_no_fallback(atlas, &wanted)?;
            for &codepoint in &wanted {
                let glyph = match member.font.find_loaded_glyph_no_fallback(codepoint) {
                    Some(glyph) => self.compose(atlas, member, glyph),
                    None => continue,
                };
                self.table.write().insert(glyph);
                self.sources.write().insert(codepoint, index);
            }
            let table = self.table.read();
            remaining.retain(|&codepoint| !table.is_attempted(codepoint));
        }
        Ok(remaining)
    }

    #[inline]
    fn find_loaded_glyph_no_fallback(&self, codepoint: u32) -> Option<GlyphRecord> {
        self.table.read().get(codepoint)
    }

    #[inline]
    fn is_load_attempted(&self, codepoint: u32) -> bool {
        self.table.read().is_attempted(codepoint)
    }

    /// Only glyphs from the same member kern, and fixed-width chains never kern.
    fn kerning(&self, left: u32, right: u32) -> f32 {
        if self.fixed_width().is_some() {
            return 0.0
        }
        let sources = self.sources.read();
        match (sources.get(&left), sources.get(&right)) {
            (Some(&left_source), Some(&right_source)) if left_source == right_source => {
                self.members[left_source].font.kerning(left, right)
            }
            _ => 0.0,
        }
    }

    fn loaded_glyphs(&self) -> Vec<GlyphRecord> {
        self.table.read().records()
    }

    fn kerning_pairs(&self) -> Vec<(u32, u32, f32)> {
        if self.fixed_width().is_some() {
            return vec![]
        }
        let sources = self.sources.read();
        let mut pairs = vec![];
        for (index, member) in self.members.iter().enumerate() {
            pairs.extend(member.font.kerning_pairs().into_iter().filter(|&(left, right, _)| {
                sources.get(&left) == Some(&index) && sources.get(&right) == Some(&index)
            }));
        }
        pairs
    }

    fn accept_substitute(&self, codepoint: u32, glyph: Option<GlyphRecord>) {
        self.table.write().accept(codepoint, glyph)
    }
}
