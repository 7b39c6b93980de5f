/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::page::{PageKind, TexturePage};
use crate::rect_packer::RectPacker;
use euclid::{Point2D, Rect, Size2D};

const BIN_SIZE: u32 = 256;

fn pack_objects(padding: u32, objects: Vec<(u8, u8)>) -> (RectPacker, Vec<Rect<u32>>) {
    let objects: Vec<_> = objects.iter()
                                 .map(|&(width, height)| {
                                     Size2D::new(width as u32 % 64 + 1, height as u32 % 64 + 1)
                                 })
                                 .collect();

    let mut rect_packer = RectPacker::new(Size2D::new(BIN_SIZE, BIN_SIZE), padding % 4);
    let rects = objects.iter()
                       .filter_map(|object| {
                           rect_packer.pack(object).map(|origin| Rect::new(origin, *object))
                       })
                       .collect();
    (rect_packer, rects)
}

fn inflate(rect: &Rect<u32>, padding: u32) -> Rect<u32> {
    Rect::new(Point2D::new(rect.origin.x - padding, rect.origin.y - padding),
              Size2D::new(rect.size.width + padding * 2, rect.size.height + padding * 2))
}

quickcheck! {
    fn objects_dont_overlap(padding: u32, objects: Vec<(u8, u8)>) -> bool {
        let (rect_packer, rects) = pack_objects(padding, objects);
        let padding = rect_packer.padding();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[(i + 1)..] {
                assert!(!inflate(a, padding).intersects(&inflate(b, padding)))
            }
        }
        true
    }

    fn objects_stay_in_the_bin(padding: u32, objects: Vec<(u8, u8)>) -> bool {
        let (rect_packer, rects) = pack_objects(padding, objects);
        let padding = rect_packer.padding();
        rects.iter().all(|rect| {
            rect.origin.x >= padding && rect.origin.y >= padding &&
                rect.max_x() + padding <= BIN_SIZE && rect.max_y() + padding <= BIN_SIZE
        })
    }

    fn uv_rects_round_trip_sizes(width: u8, height: u8) -> bool {
        let size = Size2D::new(width as u32 % 200 + 1, height as u32 % 200 + 1);
        let mut rect_packer = RectPacker::new(Size2D::new(BIN_SIZE, BIN_SIZE), 1);
        let origin = rect_packer.pack(&size).unwrap();

        let page = TexturePage::new(PageKind::Alpha, Size2D::new(BIN_SIZE, BIN_SIZE), 1);
        let uv = page.uv_rect(&Rect::new(origin, size));
        let width = ((uv[2] - uv[0]) * BIN_SIZE as f32).round() as u32;
        let height = ((uv[3] - uv[1]) * BIN_SIZE as f32).round() as u32;
        width == size.width && height == size.height
    }
}

#[test]
fn reserved_rows_are_never_handed_out() {
    let mut rect_packer = RectPacker::with_reserved_top(Size2D::new(128, 128), 1, 100);
    let origin = rect_packer.pack(&Size2D::new(10, 10)).unwrap();
    assert!(origin.y >= 101);
    assert_eq!(rect_packer.reserved_height(), 100);
    assert!(rect_packer.pack(&Size2D::new(10, 30)).is_none());
}

#[test]
fn full_bins_refuse_more() {
    let mut rect_packer = RectPacker::new(Size2D::new(128, 128), 0);
    assert_eq!(rect_packer.pack(&Size2D::new(128, 128)), Some(Point2D::new(0, 0)));
    assert_eq!(rect_packer.used_height(), 128);
    assert!(rect_packer.pack(&Size2D::new(1, 1)).is_none());
}

#[test]
fn padding_is_added_on_every_side() {
    let mut rect_packer = RectPacker::new(Size2D::new(128, 128), 2);
    assert_eq!(rect_packer.pack(&Size2D::new(10, 10)), Some(Point2D::new(2, 2)));
    let second = rect_packer.pack(&Size2D::new(10, 10)).unwrap();
    assert!(second.x >= 16 || second.y >= 16);
}
