// fontchain/atlas/src/chain.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Font chains: ordered compositions of physical fonts with fallback and alignment rules.
//!
//! Chains are immutable values used directly as cache keys. Their floating-point fields compare
//! and hash by bit pattern, so two chains are equal exactly when they were built from the same
//! numbers.

use crate::error::{AtlasError, AtlasResult};
use crate::ident::FontIdentifier;
use std::hash::{Hash, Hasher};

/// Where a member font sits vertically relative to the chain's primary font.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VerticalAlignment {
    Top,
    Middle,
    Baseline,
    Bottom,
}

impl Default for VerticalAlignment {
    #[inline]
    fn default() -> VerticalAlignment {
        VerticalAlignment::Baseline
    }
}

/// An inclusive range of codepoints.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct UnicodeRange {
    pub start: u32,
    pub end: u32,
}

impl UnicodeRange {
    pub const BASIC_LATIN: UnicodeRange = UnicodeRange { start: 0x20, end: 0x7e };
    pub const CJK_UNIFIED_IDEOGRAPHS: UnicodeRange = UnicodeRange { start: 0x4e00, end: 0x9fff };

    #[inline]
    pub fn new(start: u32, end: u32) -> UnicodeRange {
        UnicodeRange { start, end }
    }

    #[inline]
    pub fn contains(&self, codepoint: u32) -> bool {
        self.start <= codepoint && codepoint <= self.end
    }

    #[inline]
    pub fn codepoints(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end.min(0x10ffff)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FontChainEntry {
    pub identifier: FontIdentifier,
    pub size_px: f32,
    /// Extra advance added after every glyph of this entry.
    pub letter_spacing: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// If set, the entry only supplies codepoints in these ranges.
    pub ranges: Option<Vec<UnicodeRange>>,
}

impl FontChainEntry {
    #[inline]
    pub fn new(identifier: FontIdentifier, size_px: f32) -> FontChainEntry {
        FontChainEntry {
            identifier,
            size_px,
            letter_spacing: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            ranges: None,
        }
    }

    #[inline]
    pub fn with_ranges(mut self, ranges: Vec<UnicodeRange>) -> FontChainEntry {
        self.ranges = Some(ranges);
        self
    }

    #[inline]
    pub fn covers(&self, codepoint: u32) -> bool {
        match self.ranges {
            None => true,
            Some(ref ranges) => ranges.iter().any(|range| range.contains(codepoint)),
        }
    }

    fn validate(&self) -> AtlasResult<()> {
        if self.identifier.is_empty() {
            return Err(AtlasError::invalid("font chain entry has no font"))
        }
        if !(self.size_px > 0.0) || !self.size_px.is_finite() {
            return Err(AtlasError::invalid(format!("font size {} is not positive", self.size_px)))
        }
        if !self.letter_spacing.is_finite() || !self.offset_x.is_finite() ||
                !self.offset_y.is_finite() {
            return Err(AtlasError::invalid("font chain entry offsets must be finite"))
        }
        if let Some(ref ranges) = self.ranges {
            if let Some(range) = ranges.iter().find(|range| range.start > range.end) {
                return Err(AtlasError::invalid(format!("empty unicode range {:x}..{:x}",
                                                       range.start,
                                                       range.end)))
            }
        }
        Ok(())
    }

    fn scaled(&self, scale: f32) -> FontChainEntry {
        FontChainEntry {
            identifier: self.identifier.clone(),
            size_px: self.size_px * scale,
            letter_spacing: self.letter_spacing * scale,
            offset_x: self.offset_x * scale,
            offset_y: self.offset_y * scale,
            ranges: self.ranges.clone(),
        }
    }

    fn key(&self) -> (&FontIdentifier, [u32; 4], &Option<Vec<UnicodeRange>>) {
        let numbers = [
            self.size_px.to_bits(),
            self.letter_spacing.to_bits(),
            self.offset_x.to_bits(),
            self.offset_y.to_bits(),
        ];
        (&self.identifier, numbers, &self.ranges)
    }
}

impl PartialEq for FontChainEntry {
    #[inline]
    fn eq(&self, other: &FontChainEntry) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FontChainEntry {}

impl Hash for FontChainEntry {
    #[inline]
    fn hash<H>(&self, state: &mut H) where H: Hasher {
        self.key().hash(state)
    }
}

/// Several fonts exposed as one logical font.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FontChain {
    pub primary: FontChainEntry,
    pub secondary: Vec<FontChainEntry>,
    /// Line height relative to the primary font's natural height. Must be positive.
    pub line_height_ratio: f32,
    /// If positive, every glyph is fitted into a box this many times the primary size wide.
    pub glyph_width_ratio: f32,
    pub vertical_alignment: VerticalAlignment,
}

impl FontChain {
    #[inline]
    pub fn new(primary: FontChainEntry) -> FontChain {
        FontChain {
            primary,
            secondary: vec![],
            line_height_ratio: 1.0,
            glyph_width_ratio: 0.0,
            vertical_alignment: VerticalAlignment::default(),
        }
    }

    #[inline]
    pub fn with_secondary(mut self, entry: FontChainEntry) -> FontChain {
        self.secondary.push(entry);
        self
    }

    /// The primary entry followed by the secondary ones.
    #[inline]
    pub fn entries(&self) -> impl Iterator<Item = &FontChainEntry> {
        Some(&self.primary).into_iter().chain(self.secondary.iter())
    }

    /// Rejects chains that can never be built. Failures here are not cached.
    pub fn validate(&self) -> AtlasResult<()> {
        if !(self.line_height_ratio > 0.0) || !self.line_height_ratio.is_finite() {
            return Err(AtlasError::invalid(format!("line height ratio {} is not positive",
                                                   self.line_height_ratio)))
        }
        if !(self.glyph_width_ratio >= 0.0) || !self.glyph_width_ratio.is_finite() {
            return Err(AtlasError::invalid(format!("glyph width ratio {} is negative",
                                                   self.glyph_width_ratio)))
        }
        for entry in self.entries() {
            entry.validate()?;
        }
        Ok(())
    }

    /// Multiplies every size and offset by `scale`.
    pub fn scaled(&self, scale: f32) -> FontChain {
        FontChain {
            primary: self.primary.scaled(scale),
            secondary: self.secondary.iter().map(|entry| entry.scaled(scale)).collect(),
            line_height_ratio: self.line_height_ratio,
            glyph_width_ratio: self.glyph_width_ratio,
            vertical_alignment: self.vertical_alignment,
        }
    }

    fn shape_key(&self) -> ([u32; 2], VerticalAlignment) {
        ([self.line_height_ratio.to_bits(), self.glyph_width_ratio.to_bits()],
         self.vertical_alignment)
    }
}

impl PartialEq for FontChain {
    fn eq(&self, other: &FontChain) -> bool {
        self.primary == other.primary && self.secondary == other.secondary &&
            self.shape_key() == other.shape_key()
    }
}

impl Eq for FontChain {}

impl Hash for FontChain {
    fn hash<H>(&self, state: &mut H) where H: Hasher {
        self.primary.hash(state);
        self.secondary.hash(state);
        self.shape_key().hash(state);
    }
}
