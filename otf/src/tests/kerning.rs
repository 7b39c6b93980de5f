/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::kerning::{extract_codepoint_kerning, KerningSource};
use crate::sfnt::FontFile;
use crate::tag::Tag;
use crate::tests::{cmap_format_4, cmap_table, gpos_lookup, gpos_table, head_table, init_logging};
use crate::tests::{kern_v0, kern_v0_format_0, pair_pos_format_1, sfnt};

fn cmap_with_shared_glyph() -> Vec<u8> {
    // 'A' and 'a' share glyph 1; 'V' is glyph 2.
    cmap_table(&[(3, 1, cmap_format_4(&[(0x41, 0x41, 1 - 0x41),
                                        (0x56, 0x56, 2 - 0x56),
                                        (0x61, 0x61, 1 - 0x61)]))])
}

#[test]
fn kern_pairs_are_remapped_to_every_codepoint() {
    init_logging();
    let bytes = sfnt(&[
        (Tag::CMAP, cmap_with_shared_glyph()),
        (Tag::HEAD, head_table(1000)),
        (Tag::KERN, kern_v0(&[kern_v0_format_0(0x1, &[(1, 2, -80), (2, 9, 5)])])),
    ]);
    let font = FontFile::new(&bytes, 0).unwrap();
    let kerning = extract_codepoint_kerning(&font).unwrap();

    assert_eq!(kerning.source, KerningSource::Kern);
    assert_eq!(kerning.units_per_em, 1000);
    assert_eq!(kerning.len(), 2);
    assert_eq!(kerning.design_units('A' as u32, 'V' as u32), -80);
    assert_eq!(kerning.design_units('a' as u32, 'V' as u32), -80);
    assert_eq!(kerning.design_units('V' as u32, 'A' as u32), 0);
    assert!((kerning.scaled('A' as u32, 'V' as u32, 20.0) + 1.6).abs() < 1e-5);
}

#[test]
fn gpos_is_used_when_kern_contributes_nothing() {
    init_logging();
    let bytes = sfnt(&[
        (Tag::CMAP, cmap_with_shared_glyph()),
        (Tag::KERN, kern_v0(&[kern_v0_format_0(0x1, &[])])),
        (Tag::GPOS, gpos_table(&[gpos_lookup(2, &[pair_pos_format_1(&[(2, vec![(1, -30)])])])])),
    ]);
    let font = FontFile::new(&bytes, 0).unwrap();
    let kerning = extract_codepoint_kerning(&font).unwrap();

    assert_eq!(kerning.source, KerningSource::Gpos);
    assert_eq!(kerning.units_per_em, 2048);
    assert_eq!(kerning.design_units('V' as u32, 'A' as u32), -30);
    assert_eq!(kerning.design_units('V' as u32, 'a' as u32), -30);
}

#[test]
fn gpos_is_used_when_kern_pairs_name_unmapped_glyphs() {
    init_logging();
    let bytes = sfnt(&[
        (Tag::CMAP, cmap_with_shared_glyph()),
        (Tag::KERN, kern_v0(&[kern_v0_format_0(0x1, &[(7, 8, -50)])])),
        (Tag::GPOS, gpos_table(&[gpos_lookup(2, &[pair_pos_format_1(&[(1, vec![(2, -40)])])])])),
    ]);
    let font = FontFile::new(&bytes, 0).unwrap();
    let kerning = extract_codepoint_kerning(&font).unwrap();

    assert_eq!(kerning.source, KerningSource::Gpos);
    assert_eq!(kerning.len(), 2);
    assert_eq!(kerning.design_units('A' as u32, 'V' as u32), -40);
}

#[test]
fn fonts_without_kerning_or_cmap_yield_none() {
    let no_kerning = sfnt(&[(Tag::CMAP, cmap_with_shared_glyph())]);
    assert!(extract_codepoint_kerning(&FontFile::new(&no_kerning, 0).unwrap()).is_none());

    let no_cmap = sfnt(&[(Tag::KERN, kern_v0(&[kern_v0_format_0(0x1, &[(1, 2, -80)])]))]);
    assert!(extract_codepoint_kerning(&FontFile::new(&no_cmap, 0).unwrap()).is_none());
}
