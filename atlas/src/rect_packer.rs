// fontchain/atlas/src/rect_packer.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A guillotine rectangle packer for one channel of one texture page.

use euclid::{Point2D, Rect, Size2D};

pub struct RectPacker {
    free_rects: Vec<Rect<u32>>,
    bin_size: Size2D<u32>,
    padding: u32,
    /// Rows at the top of the bin that are never handed out.
    reserved_height: u32,
    /// The lowest edge of anything packed so far.
    used_height: u32,
}

impl RectPacker {
    #[inline]
    pub fn new(bin_size: Size2D<u32>, padding: u32) -> RectPacker {
        RectPacker::with_reserved_top(bin_size, padding, 0)
    }

    /// Creates a packer whose top `reserved_height` rows are already taken.
    pub fn with_reserved_top(bin_size: Size2D<u32>, padding: u32, reserved_height: u32)
                             -> RectPacker {
        let reserved_height = reserved_height.min(bin_size.height);
        let free = Rect::new(Point2D::new(0, reserved_height),
                             Size2D::new(bin_size.width, bin_size.height - reserved_height));
        RectPacker {
            free_rects: if is_empty(&free) { vec![] } else { vec![free] },
            bin_size,
            padding,
            reserved_height,
            used_height: reserved_height,
        }
    }

    /// Packs a rectangle of the given size.
    ///
    /// Returns the top-left position of the rectangle, inside its padding, or `None` if there is
    /// no space left.
    pub fn pack(&mut self, size: &Size2D<u32>) -> Option<Point2D<u32>> {
        // Add a border on every side to prevent bleed.
        let alloc_size = Size2D::new(size.width + self.padding * 2,
                                     size.height + self.padding * 2);

        // Pick the smallest free rectangle that fits.
        let (index, chosen_rect) =
            self.free_rects
                .iter()
                .enumerate()
                .filter(|&(_, rect)| {
                    alloc_size.width <= rect.size.width && alloc_size.height <= rect.size.height
                })
                .min_by(|&(_, a), &(_, b)| area(a).cmp(&area(b)))
                .map(|(index, rect)| (index, *rect))?;
        self.free_rects.swap_remove(index);

        // Guillotine to bottom.
        let free_below =
            Rect::new(Point2D::new(chosen_rect.origin.x, chosen_rect.origin.y + alloc_size.height),
                      Size2D::new(alloc_size.width, chosen_rect.size.height - alloc_size.height));
        if !is_empty(&free_below) {
            self.free_rects.push(free_below);
        }

        // Guillotine to right.
        let free_to_right =
            Rect::new(Point2D::new(chosen_rect.origin.x + alloc_size.width, chosen_rect.origin.y),
                      Size2D::new(chosen_rect.size.width - alloc_size.width,
                                  chosen_rect.size.height));
        if !is_empty(&free_to_right) {
            self.free_rects.push(free_to_right);
        }

        let bottom = chosen_rect.origin.y + alloc_size.height;
        if self.used_height < bottom {
            self.used_height = bottom
        }

        Some(Point2D::new(chosen_rect.origin.x + self.padding,
                          chosen_rect.origin.y + self.padding))
    }

    #[inline]
    pub fn bin_size(&self) -> Size2D<u32> {
        self.bin_size
    }

    #[inline]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    #[inline]
    pub fn reserved_height(&self) -> u32 {
        self.reserved_height
    }

    #[inline]
    pub fn used_height(&self) -> u32 {
        self.used_height
    }
}

#[inline]
fn area(rect: &Rect<u32>) -> u32 {
    rect.size.width * rect.size.height
}

#[inline]
fn is_empty(rect: &Rect<u32>) -> bool {
    rect.size.width == 0 || rect.size.height == 0
}
