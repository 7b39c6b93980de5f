// fontchain/atlas/src/fallback.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Borrowing glyphs from the atlas's fallback chain.

use crate::error::AtlasResult;
use crate::font::PhysicalFont;
use crate::manager::FontAtlas;

/// Loads `missing` on the fallback chain and copies the results into `font`, moved so that the
/// two fonts share a baseline. Every codepoint handled here counts as attempted on `font`, found
/// or not, so it is never retried.
///
/// With no fallback chain configured, or when `font` is the fallback chain, nothing happens and
/// the codepoints stay unattempted.
pub fn substitute_missing<F>(font: &F, atlas: &FontAtlas, missing: &[u32]) -> AtlasResult<()>
                             where F: PhysicalFont + ?Sized {
    if missing.is_empty() {
        return Ok(())
    }
    let fallback = match atlas.fallback_font() {
        Some(fallback) => fallback,
        None => return Ok(()),
    };
    if fallback.handle() == font.handle() {
        return Ok(())
    }

    fallback.load_glyphs_no_fallback(atlas, missing)?;
    let offset_y = font.metrics().ascent - fallback.metrics().ascent;
    let mut found = 0;
    for &codepoint in missing {
        let glyph = fallback.find_loaded_glyph_no_fallback(codepoint)
                            .map(|glyph| glyph.translated(0.0, offset_y));
        found += glyph.is_some() as usize;
        font.accept_substitute(codepoint, glyph);
    }
    debug!("fallback chain supplied {} of {} missing glyph(s)", found, missing.len());
    Ok(())
}
