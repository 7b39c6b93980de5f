// fontchain/otf/src/lib.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Zero-copy readers for the OpenType tables a glyph atlas needs.
//!
//! Nothing here parses a table up front. Each reader wraps a `ByteView` anchored at the start of
//! its table and computes field offsets on every access, so a truncated or corrupt table fails at
//! the point of use. Failures never escape as hard errors from the lookup APIs: a table that
//! cannot be read simply contributes no mappings or kerning pairs.
//!
//! The typical flow is:
//!
//! 1. Open the font file with `FontFile::new()` (pass the face index for `.ttc` collections).
//!
//! 2. Use `FontFile::cmap()` to map codepoints to glyph IDs.
//!
//! 3. Call `kerning::extract_codepoint_kerning()` to obtain a size-independent table of
//!    codepoint-pair advance adjustments from `kern` or `GPOS`.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod classdef;
pub mod cmap;
pub mod coverage;
pub mod error;
pub mod gpos;
pub mod head;
pub mod kern;
pub mod kerning;
pub mod name;
pub mod sfnt;
pub mod tag;
pub mod view;

pub use crate::error::FontError;
pub use crate::sfnt::FontFile;
pub use crate::tag::Tag;
pub use crate::view::ByteView;

/// A glyph ID. Glyph 0 is always `.notdef`, which every lookup uses to mean "not mapped".
pub type GlyphId = u16;

/// The glyph ID that signals a missing mapping.
pub const MISSING_GLYPH: GlyphId = 0;

#[cfg(test)]
mod tests;
