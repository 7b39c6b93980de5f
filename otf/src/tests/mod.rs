/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

//! Table builders shared by the decoder tests. Fixtures are assembled in memory rather than
//! checked in as font files.

use crate::tag::Tag;
use byteorder::{BigEndian, WriteBytesExt};

mod cmap;
mod coverage;
mod kerning;

pub fn init_logging() {
    drop(env_logger::try_init());
}

fn pad_to_4(bytes: &mut Vec<u8>) {
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
}

/// Writes an sfnt table directory for tables already placed at the given absolute offsets.
pub fn directory(tables: &[(Tag, usize, usize)]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u32::<BigEndian>(0x0001_0000).unwrap();
    out.write_u16::<BigEndian>(tables.len() as u16).unwrap();
    for _ in 0..3 {
        out.write_u16::<BigEndian>(0).unwrap();
    }
    for &(tag, offset, length) in tables {
        out.write_u32::<BigEndian>(tag.0).unwrap();
        out.write_u32::<BigEndian>(0).unwrap();
        out.write_u32::<BigEndian>(offset as u32).unwrap();
        out.write_u32::<BigEndian>(length as u32).unwrap();
    }
    out
}

/// Assembles a single-face font from raw tables.
pub fn sfnt(tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut offset = 12 + 16 * tables.len();
    let mut placements = vec![];
    for &(tag, ref data) in tables {
        placements.push((tag, offset, data.len()));
        offset += (data.len() + 3) / 4 * 4;
    }

    let mut out = directory(&placements);
    for &(_, ref data) in tables {
        out.extend_from_slice(data);
        pad_to_4(&mut out);
    }
    out
}

pub fn head_table(units_per_em: u16) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>(0x0001_0000).unwrap();
    out.write_u32::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>(0x5f0f3cf5).unwrap();
    out.write_u16::<BigEndian>(0x000b).unwrap();
    out.write_u16::<BigEndian>(units_per_em).unwrap();
    out.write_i64::<BigEndian>(0).unwrap();
    out.write_i64::<BigEndian>(0).unwrap();
    for &value in &[-100i16, -250, 1100, 900] {
        out.write_i16::<BigEndian>(value).unwrap();
    }
    out.write_u16::<BigEndian>(0b11).unwrap();
    out.write_u16::<BigEndian>(9).unwrap();
    out.write_i16::<BigEndian>(2).unwrap();
    out.write_i16::<BigEndian>(1).unwrap();
    out.write_i16::<BigEndian>(0).unwrap();
    out
}

/// A `cmap` table from `(platform, encoding, subtable)` records.
pub fn cmap_table(records: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(records.len() as u16).unwrap();
    let mut offset = 4 + records.len() * 8;
    for &(platform_id, encoding_id, ref subtable) in records {
        out.write_u16::<BigEndian>(platform_id).unwrap();
        out.write_u16::<BigEndian>(encoding_id).unwrap();
        out.write_u32::<BigEndian>(offset as u32).unwrap();
        offset += subtable.len();
    }
    for &(_, _, ref subtable) in records {
        out.extend_from_slice(subtable);
    }
    out
}

/// A format 4 subtable of direct-mapped `(start, end, delta)` segments. The terminating 0xffff
/// segment is appended.
pub fn cmap_format_4(segments: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut segments = segments.to_vec();
    segments.push((0xffff, 0xffff, 1));
    let seg_count = segments.len();

    let mut out = vec![];
    out.write_u16::<BigEndian>(4).unwrap();
    out.write_u16::<BigEndian>((16 + seg_count * 8) as u16).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>((seg_count * 2) as u16).unwrap();
    for _ in 0..3 {
        out.write_u16::<BigEndian>(0).unwrap();
    }
    for &(_, end, _) in &segments {
        out.write_u16::<BigEndian>(end).unwrap();
    }
    out.write_u16::<BigEndian>(0).unwrap();
    for &(start, _, _) in &segments {
        out.write_u16::<BigEndian>(start).unwrap();
    }
    for &(_, _, delta) in &segments {
        out.write_i16::<BigEndian>(delta).unwrap();
    }
    for _ in &segments {
        out.write_u16::<BigEndian>(0).unwrap();
    }
    out
}

/// A format 12 (or 13) subtable of `(start, end, glyph)` groups.
pub fn cmap_format_12(format: u16, groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(format).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>((16 + groups.len() * 12) as u32).unwrap();
    out.write_u32::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>(groups.len() as u32).unwrap();
    for &(start, end, glyph) in groups {
        out.write_u32::<BigEndian>(start).unwrap();
        out.write_u32::<BigEndian>(end).unwrap();
        out.write_u32::<BigEndian>(glyph).unwrap();
    }
    out
}

/// A version 0 `kern` table from prebuilt subtables.
pub fn kern_v0(subtables: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(subtables.len() as u16).unwrap();
    for subtable in subtables {
        out.extend_from_slice(subtable);
    }
    out
}

fn format_0_pairs(out: &mut Vec<u8>, pairs: &[(u16, u16, i16)]) {
    let mut pairs = pairs.to_vec();
    pairs.sort_by_key(|&(left, right, _)| (left, right));
    out.write_u16::<BigEndian>(pairs.len() as u16).unwrap();
    for _ in 0..3 {
        out.write_u16::<BigEndian>(0).unwrap();
    }
    for (left, right, value) in pairs {
        out.write_u16::<BigEndian>(left).unwrap();
        out.write_u16::<BigEndian>(right).unwrap();
        out.write_i16::<BigEndian>(value).unwrap();
    }
}

/// A version 0 format 0 subtable with the given low-byte coverage flags.
pub fn kern_v0_format_0(flags: u16, pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>((6 + 8 + pairs.len() * 6) as u16).unwrap();
    out.write_u16::<BigEndian>(flags).unwrap();
    format_0_pairs(&mut out, pairs);
    out
}

/// A version 1 `kern` table of format 0 subtables, each `(coverage flags, tuple index, pairs)`.
pub fn kern_v1(subtables: &[(u16, u16, Vec<(u16, u16, i16)>)]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u32::<BigEndian>(0x0001_0000).unwrap();
    out.write_u32::<BigEndian>(subtables.len() as u32).unwrap();
    for &(flags, tuple_index, ref pairs) in subtables {
        out.write_u32::<BigEndian>((8 + 8 + pairs.len() * 6) as u32).unwrap();
        out.write_u16::<BigEndian>(flags).unwrap();
        out.write_u16::<BigEndian>(tuple_index).unwrap();
        format_0_pairs(&mut out, pairs);
    }
    out
}

/// Wraps lookups in a GPOS header whose lookup list immediately follows.
pub fn gpos_table(lookups: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(10).unwrap();
    out.extend_from_slice(&offset_list(&[], lookups));
    out
}

/// A lookup of the given type containing `subtables`.
pub fn gpos_lookup(lookup_type: u16, subtables: &[Vec<u8>]) -> Vec<u8> {
    offset_list(&[lookup_type, 0], subtables)
}

/// `header` words, a count, then 16-bit offsets to each child, then the children.
fn offset_list(header: &[u16], children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![];
    for &word in header {
        out.write_u16::<BigEndian>(word).unwrap();
    }
    out.write_u16::<BigEndian>(children.len() as u16).unwrap();
    let mut offset = (header.len() + 1 + children.len()) * 2;
    for child in children {
        out.write_u16::<BigEndian>(offset as u16).unwrap();
        offset += child.len();
    }
    for child in children {
        out.extend_from_slice(child);
    }
    out
}

pub fn coverage_format_1(glyphs: &[u16]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>(glyphs.len() as u16).unwrap();
    for &glyph in glyphs {
        out.write_u16::<BigEndian>(glyph).unwrap();
    }
    out
}

/// Format 2 coverage or class definition data: `(start, end, value)` ranges.
pub fn ranges_format_2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(2).unwrap();
    out.write_u16::<BigEndian>(ranges.len() as u16).unwrap();
    for &(start, end, value) in ranges {
        out.write_u16::<BigEndian>(start).unwrap();
        out.write_u16::<BigEndian>(end).unwrap();
        out.write_u16::<BigEndian>(value).unwrap();
    }
    out
}

pub fn class_def_format_1(start_glyph: u16, classes: &[u16]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>(start_glyph).unwrap();
    out.write_u16::<BigEndian>(classes.len() as u16).unwrap();
    for &class in classes {
        out.write_u16::<BigEndian>(class).unwrap();
    }
    out
}

/// A PairPos format 1 subtable with X-advance-only first value records.
pub fn pair_pos_format_1(pair_sets: &[(u16, Vec<(u16, i16)>)]) -> Vec<u8> {
    let first_glyphs: Vec<u16> = pair_sets.iter().map(|&(glyph, _)| glyph).collect();
    let header_size = 10 + pair_sets.len() * 2;

    let mut sets = vec![];
    let mut set_offsets = vec![];
    for &(_, ref pairs) in pair_sets {
        set_offsets.push(header_size + sets.len());
        sets.write_u16::<BigEndian>(pairs.len() as u16).unwrap();
        for &(second_glyph, value) in pairs {
            sets.write_u16::<BigEndian>(second_glyph).unwrap();
            sets.write_i16::<BigEndian>(value).unwrap();
        }
    }

    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>((header_size + sets.len()) as u16).unwrap();
    out.write_u16::<BigEndian>(0x0004).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(pair_sets.len() as u16).unwrap();
    for offset in set_offsets {
        out.write_u16::<BigEndian>(offset as u16).unwrap();
    }
    out.extend_from_slice(&sets);
    out.extend_from_slice(&coverage_format_1(&first_glyphs));
    out
}

/// A PairPos format 2 subtable whose first value records carry X placement then X advance.
/// `grid[class_1][class_2]` is the X advance.
pub fn pair_pos_format_2(coverage: Vec<u8>,
                         class_def_1: Vec<u8>,
                         class_def_2: Vec<u8>,
                         grid: &[Vec<i16>])
                         -> Vec<u8> {
    let class_1_count = grid.len();
    let class_2_count = grid.first().map(|row| row.len()).unwrap_or(0);
    let records_size = class_1_count * class_2_count * 4;
    let coverage_offset = 16 + records_size;
    let class_def_1_offset = coverage_offset + coverage.len();
    let class_def_2_offset = class_def_1_offset + class_def_1.len();

    let mut out = vec![];
    out.write_u16::<BigEndian>(2).unwrap();
    out.write_u16::<BigEndian>(coverage_offset as u16).unwrap();
    out.write_u16::<BigEndian>(0x0005).unwrap();
    out.write_u16::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(class_def_1_offset as u16).unwrap();
    out.write_u16::<BigEndian>(class_def_2_offset as u16).unwrap();
    out.write_u16::<BigEndian>(class_1_count as u16).unwrap();
    out.write_u16::<BigEndian>(class_2_count as u16).unwrap();
    for row in grid {
        for &x_advance in row {
            out.write_i16::<BigEndian>(7).unwrap();
            out.write_i16::<BigEndian>(x_advance).unwrap();
        }
    }
    out.extend_from_slice(&coverage);
    out.extend_from_slice(&class_def_1);
    out.extend_from_slice(&class_def_2);
    out
}

/// An extension positioning subtable wrapping `subtable` of type `extension_type`.
pub fn extension(extension_type: u16, subtable: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    out.write_u16::<BigEndian>(1).unwrap();
    out.write_u16::<BigEndian>(extension_type).unwrap();
    out.write_u32::<BigEndian>(8).unwrap();
    out.extend_from_slice(subtable);
    out
}
