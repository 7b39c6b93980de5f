// fontchain/atlas/src/marks.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The white pixel and line strips the host toolkit draws shapes with.

use crate::page::TexturePage;
use euclid::{Point2D, Rect, Size2D};

pub const MAX_LINE_WIDTH: u32 = 63;

const WHITE_BLOCK: u32 = 2;
const STRIP_WIDTH: u32 = MAX_LINE_WIDTH + 2;
const LINES_TOP: u32 = WHITE_BLOCK + 1;

/// Where the marks were written.
#[derive(Clone, PartialEq, Debug)]
pub struct SharedMarks {
    pub texture_index: u16,
    /// The centre of a fully opaque block.
    pub white_uv: [f32; 2],
    /// `[u0, v0, u1, v1]` for line widths 1 through `MAX_LINE_WIDTH`; index 0 is width 1. Each
    /// row has one transparent pixel on either side of the opaque run.
    pub line_uvs: Vec<[f32; 4]>,
}

impl SharedMarks {
    /// The area the marks occupy.
    #[inline]
    pub fn size() -> Size2D<u32> {
        Size2D::new(STRIP_WIDTH, LINES_TOP + MAX_LINE_WIDTH)
    }

    /// Writes the marks into one slot of `page` with their top left corner at `origin`.
    pub fn write(page: &mut TexturePage, texture_index: u16, slot: u16, origin: Point2D<u32>)
                 -> SharedMarks {
        let size = SharedMarks::size();
        let mut coverage = vec![0; size.width as usize * size.height as usize];
        for y in 0..WHITE_BLOCK {
            for x in 0..WHITE_BLOCK {
                coverage[(y * size.width + x) as usize] = 255;
            }
        }
        for width in 1..=MAX_LINE_WIDTH {
            let (left, y) = line_position(width);
            let row = (y * size.width) as usize;
            for value in &mut coverage[row + left as usize..row + (left + width) as usize] {
                *value = 255;
            }
        }
        page.write_coverage(slot, &Rect::new(origin, size), &coverage);

        let page_size = page.size();
        let (page_width, page_height) = (page_size.width as f32, page_size.height as f32);
        let line_uvs = (1..=MAX_LINE_WIDTH).map(|width| {
            let (left, y) = line_position(width);
            let v = (origin.y + y) as f32 + 0.5;
            [
                (origin.x + left - 1) as f32 / page_width,
                v / page_height,
                (origin.x + left + width + 1) as f32 / page_width,
                v / page_height,
            ]
        }).collect();

        SharedMarks {
            texture_index,
            white_uv: [
                (origin.x + WHITE_BLOCK / 2) as f32 / page_width,
                (origin.y + WHITE_BLOCK / 2) as f32 / page_height,
            ],
            line_uvs,
        }
    }

    /// The strip for a line `width` pixels thick.
    pub fn line_uv(&self, width: u32) -> Option<[f32; 4]> {
        if width == 0 {
            return None
        }
        self.line_uvs.get(width as usize - 1).cloned()
    }
}

/// The left edge of the opaque run and the row of the strip for `width`.
#[inline]
fn line_position(width: u32) -> (u32, u32) {
    ((STRIP_WIDTH - width) / 2, LINES_TOP + width - 1)
}
