/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::adapters::BakedFont;
use crate::font::FontMetrics;
use crate::glyph::GlyphRecord;
use crate::native::{self, NativeFont, NativeGlyph, NativeGlyphHotData, NativeKerningPair};
use crate::native::Used4kPages;

fn record(codepoint: u32, texture_index: u16) -> GlyphRecord {
    GlyphRecord {
        codepoint,
        advance_x: 7.5,
        x0: 1.0,
        y0: 2.0,
        x1: 6.0,
        y1: 12.0,
        texture_index,
        u0: 0.25,
        v0: 0.5,
        u1: 0.75,
        v1: 1.0,
        colored: false,
        visible: true,
    }
}

quickcheck! {
    fn glyph_fields_stay_in_their_bits(codepoint: u32, texture_index: u16, colored: bool) -> bool {
        let codepoint = codepoint % 0x11_0000;
        let texture_index = texture_index & 0x1ff;
        let mut glyph = NativeGlyph::from_record(&record(codepoint, texture_index));
        glyph.set_colored(colored);
        glyph.codepoint() == codepoint && glyph.texture_index() == texture_index &&
            glyph.colored() == colored && glyph.visible()
    }
}

#[test]
fn glyph_word_layout() {
    let mut glyph = NativeGlyph::default();
    glyph.set_colored(true);
    assert_eq!(glyph.bits(), 0b1);
    glyph.set_visible(true);
    assert_eq!(glyph.bits(), 0b11);
    glyph.set_texture_index(0x1ff);
    assert_eq!(glyph.bits(), 0b111_1111_1111);
    glyph.set_codepoint(0x10_ffff);
    assert_eq!(glyph.bits(), 0x10_ffff << 11 | 0x7ff);
    glyph.set_texture_index(0);
    assert_eq!(glyph.bits(), 0x10_ffff << 11 | 0b11);
}

#[test]
fn glyph_bytes_are_little_endian() {
    let glyph = NativeGlyph::from_record(&record('A' as u32, 6));
    let mut bytes = [0; NativeGlyph::SIZE];
    glyph.write_to(&mut bytes);
    let word = ('A' as u32) << 11 | 6 << 2 | 0b10;
    assert_eq!(&bytes[0..4], &word.to_le_bytes());
    assert_eq!(&bytes[4..8], &7.5f32.to_bits().to_le_bytes());
    assert_eq!(NativeGlyph::read_from(&bytes), glyph);
}

#[test]
fn hot_data_layout() {
    let mut hot = NativeGlyphHotData::default();
    hot.set_use_bisect(true);
    hot.set_pair_offset(0x7_ffff);
    hot.set_pair_count(0xfff);
    assert_eq!(hot.kerning_pair_info(), 0xffff_ffff);
    hot.set_pair_offset(5);
    assert_eq!(hot.pair_offset(), 5);
    assert_eq!(hot.pair_count(), 0xfff);
    assert!(hot.use_bisect());
    assert_eq!(hot.kerning_pair_info(), 0xfff << 20 | 5 << 1 | 1);

    let mut bytes = [0; NativeGlyphHotData::SIZE];
    hot.write_to(&mut bytes);
    assert_eq!(NativeGlyphHotData::read_from(&bytes), hot);
}

#[test]
fn kerning_pair_bytes() {
    let pair = NativeKerningPair { left: 0x41, right: 0x56, advance_x_adjustment: -1.5 };
    let mut bytes = [0; NativeKerningPair::SIZE];
    pair.write_to(&mut bytes);
    assert_eq!(&bytes[0..4], &[0x41, 0, 0x56, 0]);
    assert_eq!(NativeKerningPair::read_from(&bytes), pair);
}

#[test]
fn used_pages_cover_the_whole_codespace() {
    assert_eq!(Used4kPages::SIZE, 34);
    let mut pages = Used4kPages::default();
    pages.mark('A' as u32);
    pages.mark(0x10_ffff);
    assert!(pages.contains(0x0fff));
    assert!(!pages.contains(0x1000));
    assert!(pages.contains(0x10_f000));
    assert_eq!(pages.0[33], 0x80);
}

#[test]
fn texture_indices_fit_the_glyph_word() {
    assert!(native::MAX_TEXTURE_PAGES * 5 <= 1 << native::GLYPH_TEXTURE_INDEX_BITS);
}

#[test]
fn native_fonts_index_glyphs_and_kerning() {
    let mut kerning = vec![('A' as u32, 'V' as u32, -2.0), ('A' as u32, 'W' as u32, -1.0)];
    for right in 0x61..0x6b {
        kerning.push(('T' as u32, right, -0.5));
    }
    kerning.push(('A' as u32, 0x1f600, -9.0));
    let mut glyphs = vec![record('A' as u32, 1), record('V' as u32, 1), record('W' as u32, 1)];
    glyphs.push(record('T' as u32, 2));
    glyphs.extend((0x61..0x6b).map(|codepoint| record(codepoint, 3)));
    let font = BakedFont::new("test", FontMetrics::new(16.0, 12.0, 4.0), glyphs, kerning);

    let native = NativeFont::from_font(&font);
    assert_eq!(native.glyphs.len(), 14);
    assert_eq!(native.font_size, 16.0);
    assert_eq!(native.find_glyph('V' as u32).unwrap().codepoint(), 'V' as u32);
    assert!(native.find_glyph('B' as u32).is_none());
    assert!(native.find_glyph(0x1f600).is_none());
    assert!(native.used_4k_pages.contains('A' as u32));
    assert!(!native.used_4k_pages.contains(0x1f600));

    assert!(native.kerning_pairs.windows(2).all(|pair| {
        (pair[0].left, pair[0].right) < (pair[1].left, pair[1].right)
    }));
    assert_eq!(native.kerning_pairs.len(), 12);
    assert_eq!(native.kerning('A' as u32, 'V' as u32), -2.0);
    assert_eq!(native.kerning('A' as u32, 'W' as u32), -1.0);
    assert_eq!(native.kerning('V' as u32, 'A' as u32), 0.0);

    let hot = native.hot_data['T' as usize];
    assert_eq!(hot.pair_count(), 10);
    assert!(hot.use_bisect());
    assert!(!native.hot_data['A' as usize].use_bisect());
    assert_eq!(native.kerning('T' as u32, 0x65), -0.5);
    assert_eq!(native.hot_data['T' as usize].advance_x, 7.5);
}

#[test]
fn oversized_kerning_runs_are_clamped() {
    let rights = 0x100..0x100 + 4100;
    let kerning: Vec<(u32, u32, f32)> = rights.clone()
                                              .map(|right| ('A' as u32, right, -1.0))
                                              .chain(Some(('B' as u32, 'A' as u32, -3.0)))
                                              .collect();
    let mut glyphs = vec![record('A' as u32, 1), record('B' as u32, 1)];
    glyphs.extend(rights.map(|codepoint| record(codepoint, 1)));
    let font = BakedFont::new("test", FontMetrics::new(16.0, 12.0, 4.0), glyphs, kerning);

    let native = NativeFont::from_font(&font);
    assert_eq!(native.hot_data['A' as usize].pair_count(), 4095);
    assert_eq!(native.kerning_pairs.len(), 4096);
    assert_eq!(native.kerning('A' as u32, 0x100), -1.0);
    assert_eq!(native.kerning('A' as u32, 0x100 + 4094), -1.0);
    assert_eq!(native.kerning('A' as u32, 0x100 + 4095), 0.0);
    assert_eq!(native.hot_data['B' as usize].pair_offset(), 4095);
    assert_eq!(native.kerning('B' as u32, 'A' as u32), -3.0);
}

#[test]
fn glyph_indices_stop_before_the_empty_marker() {
    let glyphs: Vec<GlyphRecord> = (0..0x1_0000).map(|codepoint| record(codepoint, 1)).collect();
    let font = BakedFont::new("test", FontMetrics::new(16.0, 12.0, 4.0), glyphs, vec![]);

    let native = NativeFont::from_font(&font);
    assert_eq!(native.glyphs.len(), native::NO_GLYPH as usize);
    assert_eq!(native.find_glyph(0xfffe).unwrap().codepoint(), 0xfffe);
    assert!(native.find_glyph(0xffff).is_none());
    assert!(native.index_lookup.iter().all(|&index| index != native::NO_GLYPH));
}
