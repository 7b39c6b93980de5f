/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::chain::{FontChain, FontChainEntry, UnicodeRange, VerticalAlignment};
use crate::composer::ChainFont;
use crate::engine::{BakedFontData, BakedGlyph};
use crate::error::AtlasError;
use crate::font::{FontFlags, PhysicalFont};
use crate::ident::{FontIdentifier, GameFontFamily};
use crate::manager::FontAtlas;
use crate::tests::init_logging;
use crate::tests::mock::{self, MockEngine, MockFace, Mocks};
use euclid::{Point2D, Rect, Size2D, Vector2D};
use std::sync::Arc;

const MEASURE: char = '测';

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// "Latin" covers `A` at 16px; "Han" covers `A` and `测` at 24px and sits higher.
fn latin_and_han() -> (Mocks, Arc<MockFace>, Arc<MockFace>) {
    init_logging();
    let mocks = Mocks::new(MockEngine::new());
    let latin = mocks.engine.add("Latin", MockFace::for_text("A", 0.8, 0.2));
    let han = mocks.engine.add("Han", MockFace::for_text("A测", 0.9, 0.1));
    (mocks, latin, han)
}

fn latin() -> FontChainEntry {
    FontChainEntry::new(FontIdentifier::system("Latin"), 16.0)
        .with_ranges(vec![UnicodeRange::BASIC_LATIN])
}

fn han() -> FontChainEntry {
    FontChainEntry::new(FontIdentifier::system("Han"), 24.0)
        .with_ranges(vec![UnicodeRange::CJK_UNIFIED_IDEOGRAPHS])
}

/// Composes `chain` directly so that tests can see which member each glyph came from.
fn compose(atlas: &FontAtlas, chain: &FontChain) -> ChainFont {
    let members = chain.entries().map(|entry| {
        let font = atlas.get_font(&entry.identifier, entry.size_px).unwrap().wait().unwrap();
        (entry.clone(), font)
    }).collect();
    ChainFont::new(chain.clone(), members).unwrap()
}

#[test]
fn members_share_the_primary_baseline() {
    let (mocks, latin_face, han_face) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let chain = FontChain::new(latin()).with_secondary(han());
    let font = compose(&atlas, &chain);
    assert!(close(font.metrics().ascent, 12.8));

    let text = ['A' as u32, MEASURE as u32];
    font.load_glyphs(&atlas, &text).unwrap();
    assert_eq!(font.source_of('A' as u32), Some(0));
    assert_eq!(font.source_of(MEASURE as u32), Some(1));
    assert_eq!(latin_face.rasterizations(), 1);
    assert_eq!(han_face.rasterizations(), 1);

    // Mock bitmaps end exactly on their font's baseline.
    for &codepoint in &text {
        let glyph = font.find_loaded_glyph_no_fallback(codepoint).unwrap();
        assert!(close(glyph.y1, font.metrics().ascent), "{:?}", glyph);
    }
    let measure = font.find_loaded_glyph_no_fallback(MEASURE as u32).unwrap();
    assert_eq!(measure.width(), MockFace::glyph_width(24.0) as f32);
}

#[test]
fn members_align_vertically() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let measure = MEASURE as u32;
    // The member's own y0 is 21.6 - 17; the two fonts are 16 and 24 pixels tall.
    for &(alignment, y0) in &[(VerticalAlignment::Top, 4.6),
                              (VerticalAlignment::Middle, 0.6),
                              (VerticalAlignment::Baseline, -4.2),
                              (VerticalAlignment::Bottom, -3.4)] {
        let mut chain = FontChain::new(latin()).with_secondary(han());
        chain.vertical_alignment = alignment;
        let font = compose(&atlas, &chain);
        font.load_glyphs(&atlas, &[measure]).unwrap();
        let glyph = font.find_loaded_glyph_no_fallback(measure).unwrap();
        assert!(close(glyph.y0, y0), "{:?}: {}", alignment, glyph.y0);
    }
}

#[test]
fn ranges_decide_which_member_is_asked() {
    let (mocks, latin_face, han_face) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let open = FontChain::new(FontChainEntry::new(FontIdentifier::system("Han"), 24.0))
        .with_secondary(FontChainEntry::new(FontIdentifier::system("Latin"), 16.0));
    let font = compose(&atlas, &open);
    font.load_glyphs(&atlas, &['A' as u32]).unwrap();
    assert_eq!(font.source_of('A' as u32), Some(0));
    assert_eq!(han_face.rasterizations(), 1);
    assert_eq!(latin_face.rasterizations(), 0);

    let font = compose(&atlas, &FontChain::new(latin()));
    assert!(!font.is_char_available(MEASURE as u32));
    let missing = font.load_glyphs_no_fallback(&atlas, &[MEASURE as u32, 'A' as u32]).unwrap();
    assert_eq!(missing, vec![MEASURE as u32]);
    assert!(!font.is_load_attempted(MEASURE as u32));
}

#[test]
fn spacing_and_offsets_move_member_glyphs() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let mut entry = latin();
    entry.letter_spacing = 2.0;
    entry.offset_x = 3.0;
    entry.offset_y = -1.0;
    let font = compose(&atlas, &FontChain::new(entry));
    font.load_glyphs(&atlas, &['A' as u32]).unwrap();

    let glyph = font.find_loaded_glyph_no_fallback('A' as u32).unwrap();
    assert_eq!(glyph.advance_x, MockFace::advance(16.0) + 2.0);
    assert_eq!(glyph.x0, 4.0);
    assert!(close(glyph.y0, 12.8 - 11.0 - 1.0));
}

#[test]
fn line_height_ratio_pads_both_sides() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let mut chain = FontChain::new(latin());
    chain.line_height_ratio = 1.5;
    let font = compose(&atlas, &chain);

    let metrics = font.metrics();
    assert_eq!(metrics.size_px, 16.0);
    assert!(close(metrics.ascent, 16.8));
    assert!(close(metrics.descent, 7.2));
    assert!(close(metrics.line_height, 24.0));

    font.load_glyphs(&atlas, &['A' as u32]).unwrap();
    let glyph = font.find_loaded_glyph_no_fallback('A' as u32).unwrap();
    assert!(close(glyph.y1, metrics.ascent));
}

#[test]
fn fixed_width_glyphs_are_centered() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let mut chain = FontChain::new(latin());
    chain.glyph_width_ratio = 1.0;
    let font = compose(&atlas, &chain);
    font.load_glyphs(&atlas, &['A' as u32]).unwrap();

    let glyph = font.find_loaded_glyph_no_fallback('A' as u32).unwrap();
    assert_eq!(glyph.advance_x, 16.0);
    assert_eq!(glyph.x0, 4.0);
    assert_eq!(glyph.x1, 12.0);
}

#[test]
fn wide_glyphs_are_narrowed_with_a_smaller_size() {
    let (mocks, latin_face, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let mut chain = FontChain::new(latin());
    chain.glyph_width_ratio = 0.25;
    let font = compose(&atlas, &chain);
    font.load_glyphs(&atlas, &['A' as u32]).unwrap();

    // 8 pixels wide at 16px, so it is taken from the 8px font instead.
    assert_eq!(mocks.engine.opens(), 2);
    assert_eq!(latin_face.rasterizations(), 2);
    let glyph = font.find_loaded_glyph_no_fallback('A' as u32).unwrap();
    assert_eq!(glyph.advance_x, 4.0);
    assert_eq!(glyph.width(), 4.0);
    assert_eq!(glyph.x0, 0.0);
    assert!(close(glyph.y1, font.metrics().ascent));
}

#[test]
fn kerning_stays_within_one_member() {
    let (mocks, _, _) = latin_and_han();
    let glyph = |codepoint: char, x| {
        BakedGlyph {
            codepoint: codepoint as u32,
            texture: 0,
            channel: 0,
            rect: Rect::new(Point2D::new(x, 0), Size2D::new(8, 12)),
            offset: Vector2D::new(0.0, 2.0),
            advance_x: 9.0,
        }
    };
    let data = BakedFontData {
        size_px: 16.0,
        ascent: 13.0,
        descent: 3.0,
        glyphs: vec![glyph('V', 0), glyph('A', 10)],
        kerning: vec![('V' as u32, 'A' as u32, -2.0), ('A' as u32, MEASURE as u32, -5.0)],
    };
    mocks.add_game_font("common/font/AXIS_12.fdt",
                        data,
                        &[("common/font/font1.tex", Size2D::new(256, 256))]);
    let atlas = mock::sequential_atlas(&mocks);

    let axis = FontChainEntry::new(FontIdentifier::GameFamily(GameFontFamily::Axis), 16.0)
        .with_ranges(vec![UnicodeRange::BASIC_LATIN]);
    let mut chain = FontChain::new(axis).with_secondary(han());
    let font = compose(&atlas, &chain);
    font.load_glyphs(&atlas, &['V' as u32, 'A' as u32, MEASURE as u32]).unwrap();
    assert_eq!(font.kerning('V' as u32, 'A' as u32), -2.0);
    assert_eq!(font.kerning('A' as u32, MEASURE as u32), 0.0);
    assert_eq!(font.kerning_pairs(), vec![('V' as u32, 'A' as u32, -2.0)]);

    chain.glyph_width_ratio = 1.0;
    let fixed = compose(&atlas, &chain);
    fixed.load_glyphs(&atlas, &['V' as u32, 'A' as u32]).unwrap();
    assert_eq!(fixed.kerning('V' as u32, 'A' as u32), 0.0);
    assert!(fixed.kerning_pairs().is_empty());
}

#[test]
fn chains_are_cached_by_scale() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let chain = FontChain::new(latin()).with_secondary(han());

    let normal = atlas.get_font_chain(&chain, 1.0).unwrap().wait().unwrap();
    let again = atlas.get_font_chain(&chain, 1.0).unwrap().wait().unwrap();
    let double = atlas.get_font_chain(&chain, 2.0).unwrap().wait().unwrap();
    assert!(normal.same_font(&again));
    assert!(!normal.same_font(&double));
    assert!(normal.flags().contains(FontFlags::COMPOSITE));
    assert_eq!(double.metrics().size_px, 32.0);
    assert!(close(double.metrics().ascent, 25.6));
    // Latin and Han at 16/24 and at 32/48.
    assert_eq!(mocks.engine.opens(), 4);
}

#[test]
fn a_failed_primary_fails_the_chain() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let chain = FontChain::new(FontChainEntry::new(FontIdentifier::system("Missing"), 16.0))
        .with_secondary(latin());

    let error = atlas.get_font_chain(&chain, 1.0).unwrap().wait().unwrap_err();
    let expected = AtlasError::Aggregate(vec![
        AtlasError::ResourceNotFound("Missing".to_owned()),
    ]);
    assert_eq!(error, expected);
    assert_eq!(atlas.get_chain_load_exception(&chain, 1.0), Some(expected));
    assert_eq!(atlas.get_chain_load_exception(&chain, 2.0), None);
}

#[test]
fn failed_secondaries_are_left_out() {
    let (mocks, _, _) = latin_and_han();
    let atlas = mock::sequential_atlas(&mocks);
    let chain = FontChain::new(latin())
        .with_secondary(FontChainEntry::new(FontIdentifier::system("Missing"), 16.0))
        .with_secondary(han());

    let font = atlas.get_font_chain(&chain, 1.0).unwrap().wait().unwrap();
    font.load_glyphs(&atlas, &['A' as u32, MEASURE as u32]).unwrap();
    assert!(font.find_loaded_glyph_no_fallback(MEASURE as u32).unwrap().visible);
    assert!(atlas.get_load_exception(&FontIdentifier::system("Missing"), 16.0).is_some());
}

#[test]
fn invalid_chains_are_rejected() {
    let mut backwards = latin();
    backwards.ranges = Some(vec![UnicodeRange::new(0x7f, 0x20)]);
    let mut r#unsized = latin();
    r#unsized.size_px = -1.0;
    let mut wide = FontChain::new(latin());
    wide.glyph_width_ratio = -0.5;

    for chain in vec![FontChain::new(backwards), FontChain::new(r#unsized), wide] {
        match chain.validate() {
            Err(AtlasError::InvalidConfiguration(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
    assert!(FontChain::new(latin()).with_secondary(han()).validate().is_ok());
}
