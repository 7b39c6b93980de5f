// fontchain/atlas/src/options.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Options that control how the atlas lays out and renders glyphs.

use crate::error::{AtlasError, AtlasResult};
use crate::native::MAX_TEXTURE_PAGES;

const MIN_PAGE_DIMENSION: u32 = 128;
const MAX_PAGE_DIMENSION: u32 = 8192;

/// What a caller gets for a font that failed, or has not finished, loading.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MissingFontPolicy {
    /// Nothing; the caller skips drawing.
    Skip,
    /// The configured fallback chain, if it has loaded.
    Fallback,
    /// A font with no visible glyphs that reserves the requested line height.
    Placeholder,
}

impl Default for MissingFontPolicy {
    #[inline]
    fn default() -> MissingFontPolicy {
        MissingFontPolicy::Placeholder
    }
}

/// Options that influence atlas construction.
///
/// Every field has a default, so a configuration document only needs to name what it changes.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasOptions {
    /// The width of each texture page, in pixels.
    pub page_width: u32,
    /// The height of each texture page, in pixels.
    pub page_height: u32,
    /// The most texture pages the atlas may allocate, game font pages included.
    pub max_pages: usize,
    /// The gamma applied to rasterized coverage before it is written to a page.
    pub gamma: f32,
    /// True if a gamma change should clear and rebuild the atlas so that existing glyphs are
    /// rasterized again.
    pub rebuild_on_gamma_change: bool,
    /// True if alpha-only glyphs should be spread over the four channels of alpha pages instead
    /// of being stored as white BGRA pixels.
    pub use_alpha_channels: bool,
    /// Transparent border kept around every glyph, in pixels.
    pub glyph_padding: u32,
    pub missing_font_policy: MissingFontPolicy,
    /// Placeholder ascent as a fraction of the requested size.
    pub placeholder_ascent_ratio: f32,
    /// Placeholder descent as a fraction of the requested size.
    pub placeholder_descent_ratio: f32,
}

impl Default for AtlasOptions {
    fn default() -> AtlasOptions {
        AtlasOptions {
            page_width: 1024,
            page_height: 1024,
            max_pages: 64,
            gamma: 1.4,
            rebuild_on_gamma_change: false,
            use_alpha_channels: true,
            glyph_padding: 1,
            missing_font_policy: MissingFontPolicy::default(),
            placeholder_ascent_ratio: 0.8,
            placeholder_descent_ratio: 0.2,
        }
    }
}

impl AtlasOptions {
    /// Reads options from a JSON document and validates them.
    pub fn from_json(json: &str) -> AtlasResult<AtlasOptions> {
        let options: AtlasOptions = serde_json::from_str(json).map_err(|error| {
            AtlasError::invalid(format!("atlas options: {}", error))
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> AtlasResult<()> {
        let dimensions = [("page_width", self.page_width), ("page_height", self.page_height)];
        for &(name, value) in &dimensions {
            if value < MIN_PAGE_DIMENSION || value > MAX_PAGE_DIMENSION {
                return Err(AtlasError::invalid(format!("{} must be in {}..={}, not {}",
                                                       name,
                                                       MIN_PAGE_DIMENSION,
                                                       MAX_PAGE_DIMENSION,
                                                       value)))
            }
        }
        if self.max_pages == 0 || self.max_pages > MAX_TEXTURE_PAGES {
            return Err(AtlasError::invalid(format!("max_pages must be in 1..={}, not {}",
                                                   MAX_TEXTURE_PAGES,
                                                   self.max_pages)))
        }
        check_gamma(self.gamma)?;
        if self.glyph_padding > 16 {
            return Err(AtlasError::invalid("glyph_padding must be at most 16"))
        }
        if !(self.placeholder_ascent_ratio >= 0.0) || !(self.placeholder_descent_ratio >= 0.0) {
            return Err(AtlasError::invalid("placeholder ratios must be non-negative"))
        }
        Ok(())
    }
}

pub(crate) fn check_gamma(gamma: f32) -> AtlasResult<()> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(())
    } else {
        Err(AtlasError::invalid(format!("gamma must be positive and finite, not {}", gamma)))
    }
}
