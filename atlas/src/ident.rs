// fontchain/atlas/src/ident.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Identifiers for physical fonts, independent of size.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

const POINTS_TO_PIXELS: f32 = 4.0 / 3.0;

/// The fonts shipped with the game, stored in its bitmap font format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GameFontFamily {
    Axis,
    Jupiter,
    JupiterNumeric,
    Meidinger,
    MiedingerMid,
    TrumpGothic,
}

/// One size a game font family was baked at.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BakedSize {
    /// The size suffix of the metrics file name.
    pub suffix: &'static str,
    pub points: f32,
}

impl BakedSize {
    #[inline]
    pub fn size_px(&self) -> f32 {
        self.points * POINTS_TO_PIXELS
    }
}

macro_rules! baked_sizes {
    ($(($suffix:expr, $points:expr)),*) => {
        &[$(BakedSize { suffix: $suffix, points: $points }),*]
    }
}

static AXIS_SIZES: &[BakedSize] =
    baked_sizes![("96", 9.6), ("12", 12.0), ("14", 14.0), ("18", 18.0), ("36", 36.0)];
static JUPITER_SIZES: &[BakedSize] =
    baked_sizes![("16", 16.0), ("20", 20.0), ("23", 23.0), ("46", 46.0)];
static JUPITER_NUMERIC_SIZES: &[BakedSize] = baked_sizes![("45", 45.0), ("90", 90.0)];
static MEIDINGER_SIZES: &[BakedSize] = baked_sizes![("16", 16.0), ("20", 20.0), ("40", 40.0)];
static MIEDINGER_MID_SIZES: &[BakedSize] =
    baked_sizes![("10", 10.0), ("12", 12.0), ("14", 14.0), ("18", 18.0), ("36", 36.0)];
static TRUMP_GOTHIC_SIZES: &[BakedSize] =
    baked_sizes![("184", 18.4), ("23", 23.0), ("34", 34.0), ("68", 68.0)];

impl GameFontFamily {
    pub fn file_stem(self) -> &'static str {
        match self {
            GameFontFamily::Axis => "AXIS",
            GameFontFamily::Jupiter | GameFontFamily::JupiterNumeric => "Jupiter",
            GameFontFamily::Meidinger => "Meidinger",
            GameFontFamily::MiedingerMid => "MiedingerMid",
            GameFontFamily::TrumpGothic => "TrumpGothic",
        }
    }

    /// Baked sizes in ascending order.
    pub fn baked_sizes(self) -> &'static [BakedSize] {
        match self {
            GameFontFamily::Axis => AXIS_SIZES,
            GameFontFamily::Jupiter => JUPITER_SIZES,
            GameFontFamily::JupiterNumeric => JUPITER_NUMERIC_SIZES,
            GameFontFamily::Meidinger => MEIDINGER_SIZES,
            GameFontFamily::MiedingerMid => MIEDINGER_MID_SIZES,
            GameFontFamily::TrumpGothic => TRUMP_GOTHIC_SIZES,
        }
    }

    /// The smallest baked size at or above `size_px`, or the largest one if none is big enough.
    pub fn nearest_baked_size(self, size_px: f32) -> BakedSize {
        let sizes = self.baked_sizes();
        sizes.iter()
             .cloned()
             .find(|size| size_key(size.size_px()) >= size_key(size_px))
             .unwrap_or(sizes[sizes.len() - 1])
    }

    pub fn metrics_path(self, size: &BakedSize) -> String {
        format!("common/font/{}_{}.fdt", self.file_stem(), size.suffix)
    }
}

/// Path of the `index`th shared game font texture.
#[inline]
pub fn game_texture_path(index: u32) -> String {
    format!("common/font/font{}.tex", index + 1)
}

/// Fonts that ship with the host application.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BundledFont {
    /// The toolkit's own default glyph set, baked into page 0.
    HostDefault,
    NotoSansJpMedium,
    FontAwesomeFreeSolid,
    InconsolataRegular,
}

impl BundledFont {
    /// The resource file the text engine loads, or `None` for the toolkit's built-in glyphs.
    pub fn file_name(self) -> Option<&'static str> {
        match self {
            BundledFont::HostDefault => None,
            BundledFont::NotoSansJpMedium => Some("NotoSansCJKjp-Medium.otf"),
            BundledFont::FontAwesomeFreeSolid => Some("FontAwesomeFreeSolid.otf"),
            BundledFont::InconsolataRegular => Some("Inconsolata-Regular.ttf"),
        }
    }
}

/// Weight, stretch, and slant of a system font request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FontVariant {
    /// 100 (thin) to 900 (black).
    pub weight: u16,
    /// 1 (ultra-condensed) to 9 (ultra-expanded).
    pub stretch: u8,
    pub italic: bool,
}

impl Default for FontVariant {
    #[inline]
    fn default() -> FontVariant {
        FontVariant { weight: 400, stretch: 5, italic: false }
    }
}

/// Names a physical font without fixing its size. Equality and hashing drive every cache.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum FontIdentifier {
    /// No font.
    Empty,
    Bundled(BundledFont),
    GameFamily(GameFontFamily),
    SystemFamily { family: String, variant: FontVariant },
    File { path: PathBuf, index: u32 },
    /// A font registered with `FontAtlas::register_memory_font`.
    NamedMemory { name: String, index: u32 },
}

impl Default for FontIdentifier {
    #[inline]
    fn default() -> FontIdentifier {
        FontIdentifier::Empty
    }
}

impl FontIdentifier {
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == FontIdentifier::Empty
    }

    #[inline]
    pub fn system(family: &str) -> FontIdentifier {
        FontIdentifier::SystemFamily { family: family.to_owned(), variant: FontVariant::default() }
    }
}

impl Display for FontIdentifier {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            FontIdentifier::Empty => write!(formatter, "(none)"),
            FontIdentifier::Bundled(font) => write!(formatter, "bundled {:?}", font),
            FontIdentifier::GameFamily(family) => write!(formatter, "game {:?}", family),
            FontIdentifier::SystemFamily { ref family, variant } => {
                write!(formatter,
                       "system \"{}\" w{}{}",
                       family,
                       variant.weight,
                       if variant.italic { " italic" } else { "" })
            }
            FontIdentifier::File { ref path, index } => {
                write!(formatter, "file {}#{}", path.display(), index)
            }
            FontIdentifier::NamedMemory { ref name, index } => {
                write!(formatter, "memory \"{}\"#{}", name, index)
            }
        }
    }
}

/// Rounds a pixel size to the integer used in cache keys.
#[inline]
pub fn size_key(size_px: f32) -> u32 {
    size_px.round().max(1.0) as u32
}
