/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::cmap::{CmapSubtable, CmapTable};
use crate::tests::{cmap_format_12, cmap_format_4, cmap_table};
use crate::view::ByteView;
use byteorder::{BigEndian, WriteBytesExt};
use fxhash::FxHashMap;

fn table_agrees_with_enumeration(bytes: &[u8], probes: &[u32]) -> bool {
    let cmap = CmapTable::new(ByteView::new(bytes));
    let mappings: FxHashMap<u32, u16> = cmap.mappings().into_iter().collect();
    for (&codepoint, &glyph) in &mappings {
        assert_eq!(cmap.char_to_glyph(codepoint), glyph);
    }
    for &probe in probes {
        let probe = probe % 0x110000;
        if !mappings.contains_key(&probe) {
            assert_eq!(cmap.char_to_glyph(probe), 0);
        }
    }
    true
}

quickcheck! {
    fn format_4_lookup_agrees_with_enumeration(spans: Vec<(u8, u8, i16)>, probes: Vec<u32>)
                                               -> bool {
        let mut segments = vec![];
        let mut next = 0u32;
        for (gap, len, delta) in spans {
            let start = next + gap as u32;
            let end = start + len as u32;
            if end >= 0xffff {
                break
            }
            segments.push((start as u16, end as u16, delta));
            next = end + 1;
        }
        let bytes = cmap_table(&[(3, 1, cmap_format_4(&segments))]);
        table_agrees_with_enumeration(&bytes, &probes)
    }

    fn format_12_lookup_agrees_with_enumeration(spans: Vec<(u16, u8, u16)>, probes: Vec<u32>)
                                                -> bool {
        let mut groups = vec![];
        let mut next = 0u32;
        for (gap, len, glyph) in spans {
            let start = next + gap as u32;
            let end = start + len as u32;
            if end > 0x10ffff {
                break
            }
            groups.push((start, end, glyph as u32 + 1));
            next = end + 1;
        }
        let bytes = cmap_table(&[(3, 10, cmap_format_12(12, &groups))]);
        table_agrees_with_enumeration(&bytes, &probes)
    }
}

#[test]
fn format_4_maps_segments_and_misses_gaps() {
    let bytes = cmap_table(&[(3, 1, cmap_format_4(&[(0x41, 0x43, -0x40), (0x61, 0x61, -0x5d)]))]);
    let cmap = CmapTable::new(ByteView::new(&bytes));
    assert_eq!(cmap.char_to_glyph(0x41), 1);
    assert_eq!(cmap.char_to_glyph(0x43), 3);
    assert_eq!(cmap.char_to_glyph(0x44), 0);
    assert_eq!(cmap.char_to_glyph(0x61), 4);
    assert_eq!(cmap.char_to_glyph(0x1f600), 0);
    assert_eq!(cmap.mappings(), vec![(0x41, 1), (0x42, 2), (0x43, 3), (0x61, 4)]);
}

#[test]
fn format_13_maps_whole_ranges_to_one_glyph() {
    let bytes = cmap_format_12(13, &[(0x3000, 0x30ff, 7)]);
    let subtable = CmapSubtable::new(ByteView::new(&bytes)).unwrap();
    assert_eq!(subtable.format(), 13);
    assert_eq!(subtable.char_to_glyph(0x3000), 7);
    assert_eq!(subtable.char_to_glyph(0x30ff), 7);
    assert_eq!(subtable.char_to_glyph(0x3100), 0);
    assert_eq!(subtable.mappings().len(), 0x100);
}

#[test]
fn format_0_6_and_10() {
    let mut format_0 = vec![];
    format_0.write_u16::<BigEndian>(0).unwrap();
    format_0.write_u16::<BigEndian>(262).unwrap();
    format_0.write_u16::<BigEndian>(0).unwrap();
    format_0.extend((0..256).map(|byte| if byte == 0x20 { 3 } else { 0 }));
    let subtable = CmapSubtable::new(ByteView::new(&format_0)).unwrap();
    assert_eq!(subtable.char_to_glyph(0x20), 3);
    assert_eq!(subtable.char_to_glyph(0x21), 0);
    assert_eq!(subtable.char_to_glyph(0x120), 0);
    assert_eq!(subtable.mappings(), vec![(0x20, 3)]);

    let mut format_6 = vec![];
    for &word in &[6u16, 16, 0, 0x30, 3, 10, 0, 12] {
        format_6.write_u16::<BigEndian>(word).unwrap();
    }
    let subtable = CmapSubtable::new(ByteView::new(&format_6)).unwrap();
    assert_eq!(subtable.char_to_glyph(0x30), 10);
    assert_eq!(subtable.char_to_glyph(0x31), 0);
    assert_eq!(subtable.char_to_glyph(0x32), 12);
    assert_eq!(subtable.char_to_glyph(0x33), 0);
    assert_eq!(subtable.mappings(), vec![(0x30, 10), (0x32, 12)]);

    let mut format_10 = vec![];
    format_10.write_u16::<BigEndian>(10).unwrap();
    format_10.write_u16::<BigEndian>(0).unwrap();
    format_10.write_u32::<BigEndian>(24).unwrap();
    format_10.write_u32::<BigEndian>(0).unwrap();
    format_10.write_u32::<BigEndian>(0x1f600).unwrap();
    format_10.write_u32::<BigEndian>(2).unwrap();
    format_10.write_u16::<BigEndian>(40).unwrap();
    format_10.write_u16::<BigEndian>(41).unwrap();
    let subtable = CmapSubtable::new(ByteView::new(&format_10)).unwrap();
    assert_eq!(subtable.char_to_glyph(0x1f5ff), 0);
    assert_eq!(subtable.char_to_glyph(0x1f601), 41);
    assert_eq!(subtable.char_to_glyph(0x1f602), 0);
}

#[test]
fn format_2_handles_single_and_double_bytes() {
    let mut data = vec![];
    data.write_u16::<BigEndian>(2).unwrap();
    data.write_u16::<BigEndian>(0).unwrap();
    data.write_u16::<BigEndian>(0).unwrap();
    for byte in 0..256 {
        data.write_u16::<BigEndian>(if byte == 0x81 { 8 } else { 0 }).unwrap();
    }
    // Sub-header 0: single bytes 0x41..=0x43. Sub-header 1: trail bytes 0x40..=0x41.
    for &(first_code, entry_count, id_delta, id_range_offset) in
            &[(0x41u16, 3u16, 0i16, 10u16), (0x40, 2, 10, 8)] {
        data.write_u16::<BigEndian>(first_code).unwrap();
        data.write_u16::<BigEndian>(entry_count).unwrap();
        data.write_i16::<BigEndian>(id_delta).unwrap();
        data.write_u16::<BigEndian>(id_range_offset).unwrap();
    }
    for &glyph in &[1u16, 2, 3, 5, 6] {
        data.write_u16::<BigEndian>(glyph).unwrap();
    }

    let subtable = CmapSubtable::new(ByteView::new(&data)).unwrap();
    assert_eq!(subtable.char_to_glyph(0x41), 1);
    assert_eq!(subtable.char_to_glyph(0x43), 3);
    assert_eq!(subtable.char_to_glyph(0x44), 0);
    assert_eq!(subtable.char_to_glyph(0x81), 0);
    assert_eq!(subtable.char_to_glyph(0x8140), 15);
    assert_eq!(subtable.char_to_glyph(0x8141), 16);
    assert_eq!(subtable.char_to_glyph(0x8142), 0);
    assert_eq!(subtable.mappings(),
               vec![(0x41, 1), (0x42, 2), (0x43, 3), (0x8140, 15), (0x8141, 16)]);
}

#[test]
fn unicode_records_outrank_windows_records() {
    let bytes = cmap_table(&[
        (3, 1, cmap_format_4(&[(0x41, 0x41, 4 - 0x41)])),
        (0, 4, cmap_format_12(12, &[(0x41, 0x41, 9)])),
    ]);
    let cmap = CmapTable::new(ByteView::new(&bytes));
    assert_eq!(cmap.char_to_glyph(0x41), 9);
}

#[test]
fn unsupported_subtable_format_falls_through() {
    let mut format_14 = vec![];
    format_14.write_u16::<BigEndian>(14).unwrap();
    format_14.write_u32::<BigEndian>(10).unwrap();
    format_14.write_u32::<BigEndian>(0).unwrap();
    let bytes = cmap_table(&[
        (0, 4, format_14),
        (3, 1, cmap_format_4(&[(0x41, 0x41, 4 - 0x41)])),
    ]);
    let cmap = CmapTable::new(ByteView::new(&bytes));
    assert_eq!(cmap.char_to_glyph(0x41), 4);
}

#[test]
fn truncated_table_maps_nothing() {
    let bytes = cmap_table(&[(3, 1, cmap_format_4(&[(0x41, 0x5a, 1)]))]);
    let cmap = CmapTable::new(ByteView::new(&bytes[..bytes.len() - 6]));
    assert_eq!(cmap.char_to_glyph(0x41), 0);
    assert!(cmap.mappings().is_empty());
    assert!(cmap.glyph_to_codepoints().is_empty());
}

#[test]
fn reverse_map_lists_every_codepoint_of_a_glyph() {
    let bytes = cmap_table(&[(3, 10, cmap_format_12(12, &[(0x41, 0x41, 1), (0x61, 0x61, 1)]))]);
    let reverse = CmapTable::new(ByteView::new(&bytes)).glyph_to_codepoints();
    assert_eq!(&reverse[&1][..], &[0x41, 0x61]);
}
