/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::classdef::ClassDefTable;
use crate::coverage::CoverageTable;
use crate::tests::{class_def_format_1, coverage_format_1, ranges_format_2};
use crate::view::ByteView;

#[test]
fn glyph_list_coverage() {
    let bytes = coverage_format_1(&[3, 8, 20]);
    let coverage = CoverageTable::new(ByteView::new(&bytes)).unwrap();
    assert_eq!(coverage.coverage_index(3), Some(0));
    assert_eq!(coverage.coverage_index(20), Some(2));
    assert_eq!(coverage.coverage_index(4), None);
    assert_eq!(coverage.coverage_index(21), None);
}

#[test]
fn range_coverage_checks_containment() {
    let bytes = ranges_format_2(&[(5, 9, 0), (20, 22, 5)]);
    let coverage = CoverageTable::new(ByteView::new(&bytes)).unwrap();
    assert_eq!(coverage.coverage_index(4), None);
    assert_eq!(coverage.coverage_index(5), Some(0));
    assert_eq!(coverage.coverage_index(9), Some(4));
    assert_eq!(coverage.coverage_index(10), None);
    assert_eq!(coverage.coverage_index(19), None);
    assert_eq!(coverage.coverage_index(21), Some(6));
    assert_eq!(coverage.coverage_index(23), None);

    let mut visited = vec![];
    coverage.for_each_glyph(|glyph, index| visited.push((glyph, index))).unwrap();
    assert_eq!(visited, vec![(5, 0), (6, 1), (7, 2), (8, 3), (9, 4), (20, 5), (21, 6), (22, 7)]);
}

#[test]
fn class_definitions() {
    let array = class_def_format_1(10, &[1, 2, 0, 3]);
    let classes = ClassDefTable::new(ByteView::new(&array)).unwrap();
    assert_eq!(classes.class_of(9), 0);
    assert_eq!(classes.class_of(10), 1);
    assert_eq!(classes.class_of(13), 3);
    assert_eq!(classes.class_of(14), 0);

    let ranges = ranges_format_2(&[(2, 4, 7), (40, 40, 2)]);
    let classes = ClassDefTable::new(ByteView::new(&ranges)).unwrap();
    assert_eq!(classes.class_of(1), 0);
    assert_eq!(classes.class_of(3), 7);
    assert_eq!(classes.class_of(39), 0);
    assert_eq!(classes.class_of(40), 2);
    assert_eq!(classes.class_of(41), 0);
}

#[test]
fn truncated_tables_cover_nothing() {
    let bytes = ranges_format_2(&[(5, 9, 0)]);
    let coverage = CoverageTable::new(ByteView::new(&bytes[..8])).unwrap();
    assert_eq!(coverage.coverage_index(5), None);
    assert!(CoverageTable::new(ByteView::new(&[0, 3])).is_err());
}
