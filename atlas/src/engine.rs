// fontchain/atlas/src/engine.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The systems the atlas talks to but does not implement.
//!
//! A platform text engine opens and rasterizes faces, the game's asset repository serves
//! bitmap font files, the host toolkit bakes its built-in glyphs, and a GPU uploader receives
//! dirty pages. All of them are shared across threads.

use crate::concurrent::executor::Executor;
use crate::concurrent::rayon::RayonExecutor;
use crate::error::AtlasResult;
use crate::font::FontMetrics;
use crate::glyph::GlyphBitmap;
use crate::ident::{BundledFont, FontVariant};
use euclid::{Rect, Size2D, Vector2D};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the text engine should find a face.
#[derive(Clone, Debug)]
pub enum FaceSource {
    System { family: String, variant: FontVariant },
    File { path: PathBuf, index: u32 },
    Memory { name: String, bytes: Arc<[u8]>, index: u32 },
    Bundled(BundledFont),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RasterMode {
    /// Antialiased coverage.
    Grayscale,
    /// Subpixel rendering averaged down to one coverage value per pixel.
    SubpixelAverage,
}

/// A rasterized glyph. `bearing` is the offset from the pen position on the baseline to the top
/// left of the bitmap, with y pointing up.
#[derive(Clone, Debug)]
pub struct RasterizedGlyph {
    pub advance_x: f32,
    pub bearing: Vector2D<f32>,
    pub bitmap: GlyphBitmap,
}

/// An opened face of the platform text engine.
pub trait FontFace: Send + Sync {
    fn metrics(&self, size_px: f32) -> FontMetrics;

    /// Returns 0 for codepoints the face does not have.
    fn glyph_index(&self, codepoint: u32) -> u16;

    fn rasterize(&self, glyph: u16, size_px: f32, mode: RasterMode)
                 -> AtlasResult<RasterizedGlyph>;

    /// The raw sfnt bytes, if the engine can expose them. Kerning is read from these.
    fn font_data(&self) -> Option<Arc<[u8]>>;

    #[inline]
    fn face_index(&self) -> u32 {
        0
    }
}

pub trait TextEngine: Send + Sync {
    fn open_face(&self, source: &FaceSource) -> AtlasResult<Arc<dyn FontFace>>;
}

/// The game's file repository. Returned buffers are never modified.
pub trait GameAssets: Send + Sync {
    fn fetch(&self, path: &str) -> AtlasResult<Arc<[u8]>>;
}

/// A glyph already drawn into some texture.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BakedGlyph {
    pub codepoint: u32,
    /// Which texture file the glyph is in, counting from 0.
    pub texture: u32,
    /// 0 through 3 for blue, green, red, and alpha.
    pub channel: u8,
    /// Pixel rectangle in the texture.
    pub rect: Rect<u32>,
    /// From the pen position at the top of the line to the top left of `rect`.
    pub offset: Vector2D<f32>,
    pub advance_x: f32,
}

/// A bitmap font's metrics file, decoded.
#[derive(Clone, Debug)]
pub struct BakedFontData {
    pub size_px: f32,
    pub ascent: f32,
    pub descent: f32,
    pub glyphs: Vec<BakedGlyph>,
    /// `(left, right, pixels)`.
    pub kerning: Vec<(u32, u32, f32)>,
}

/// Reads the game's bitmap font formats.
pub trait BitmapFontReader: Send + Sync {
    fn parse_metrics(&self, bytes: &[u8]) -> AtlasResult<BakedFontData>;

    /// Decodes a texture file into its size and BGRA8 pixels.
    fn decode_texture(&self, bytes: &[u8]) -> AtlasResult<(Size2D<u32>, Vec<u8>)>;
}

/// The host toolkit's built-in glyph set, baked into a single-channel image.
#[derive(Clone, Debug)]
pub struct DefaultBake {
    pub size: Size2D<u32>,
    pub alpha: Vec<u8>,
    pub metrics: FontMetrics,
    /// Rectangles are in `alpha`; `texture` and `channel` are ignored.
    pub glyphs: Vec<BakedGlyph>,
}

pub trait HostToolkit: Send + Sync {
    /// Bakes the default glyphs into an image at most `max_width` pixels wide.
    fn bake_default_glyphs(&self, max_width: u32) -> AtlasResult<DefaultBake>;
}

pub trait TextureUploader: Send + Sync {
    /// Replaces the contents of page `page`.
    fn upload(&self, page: usize, size: Size2D<u32>, bgra: &[u8]);
}

/// Everything an atlas needs from the outside world.
#[derive(Clone)]
pub struct AtlasServices {
    pub engine: Arc<dyn TextEngine>,
    pub assets: Arc<dyn GameAssets>,
    pub bitmap_fonts: Arc<dyn BitmapFontReader>,
    pub host: Arc<dyn HostToolkit>,
    pub uploader: Arc<dyn TextureUploader>,
    pub executor: Arc<dyn Executor>,
}

impl AtlasServices {
    /// Services that construct fonts on Rayon's thread pool.
    pub fn new(engine: Arc<dyn TextEngine>,
               assets: Arc<dyn GameAssets>,
               bitmap_fonts: Arc<dyn BitmapFontReader>,
               host: Arc<dyn HostToolkit>,
               uploader: Arc<dyn TextureUploader>)
               -> AtlasServices {
        AtlasServices {
            engine,
            assets,
            bitmap_fonts,
            host,
            uploader,
            executor: Arc::new(RayonExecutor),
        }
    }

    #[inline]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> AtlasServices {
        self.executor = executor;
        self
    }
}
