// fontchain/atlas/src/lib.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A GPU glyph atlas that serves fonts and font chains to an immediate-mode GUI toolkit.
//!
//! Fonts come from the platform text engine (system, file, and in-memory fonts), from the
//! game's pre-baked bitmap fonts, and from the toolkit's own default glyph set. Glyphs are
//! loaded on first use into BGRA8 texture pages, with coverage-only glyphs spread over the four
//! channels of alpha pages.
//!
//! The typical flow is:
//!
//! 1. Create a `FontAtlas` with `AtlasOptions` and the `AtlasServices` it talks to.
//!
//! 2. Request fonts with `FontAtlas::get_font()` or `FontAtlas::get_font_chain()`. Both return a
//!    `FontTask` immediately; identical requests share one task.
//!
//! 3. Wait on the task, or call `FontAtlas::resolve()` to get a placeholder or fallback font
//!    while it loads.
//!
//! 4. Load glyphs with `FontAtlas::load_glyphs()` and hand dirty pages to the GPU with
//!    `FontAtlas::update_textures()`.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod adapters;
pub mod chain;
pub mod composer;
pub mod concurrent;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod font;
pub mod gamma;
pub mod glyph;
pub mod ident;
pub mod manager;
pub mod marks;
pub mod native;
pub mod options;
pub mod page;
pub mod rect_packer;
pub mod task;

pub use crate::chain::{FontChain, FontChainEntry, UnicodeRange, VerticalAlignment};
pub use crate::engine::AtlasServices;
pub use crate::error::{AtlasError, AtlasResult};
pub use crate::font::{FontMetrics, NativeFontHandle, PhysicalFont};
pub use crate::glyph::GlyphRecord;
pub use crate::ident::{BundledFont, FontIdentifier, FontVariant, GameFontFamily};
pub use crate::manager::{AtlasState, FontAtlas};
pub use crate::options::{AtlasOptions, MissingFontPolicy};
pub use crate::task::{FontHandle, FontTask};

#[cfg(test)]
mod tests;
