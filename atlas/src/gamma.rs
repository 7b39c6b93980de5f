// fontchain/atlas/src/gamma.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Gamma remapping of rasterized coverage values.

/// Gamma values closer than this are treated as unchanged.
pub const GAMMA_EPSILON: f32 = 1.0e-3;

/// A 256-entry lookup table mapping coverage to `255 * (coverage / 255) ^ (1 / gamma)`.
#[derive(Clone)]
pub struct GammaTable {
    gamma: f32,
    table: [u8; 256],
}

impl GammaTable {
    pub fn new(gamma: f32) -> GammaTable {
        let exponent = 1.0 / gamma as f64;
        let mut table = [0; 256];
        for (index, entry) in table.iter_mut().enumerate() {
            let value = 255.0 * (index as f64 / 255.0).powf(exponent);
            *entry = value.round().max(0.0).min(255.0) as u8;
        }
        GammaTable { gamma, table }
    }

    #[inline]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// True if `gamma` is far enough from this table's gamma to need a new table.
    #[inline]
    pub fn differs_from(&self, gamma: f32) -> bool {
        (self.gamma - gamma).abs() > GAMMA_EPSILON
    }

    #[inline]
    pub fn apply(&self, coverage: u8) -> u8 {
        self.table[coverage as usize]
    }

    pub fn apply_to(&self, coverage: &mut [u8]) {
        for value in coverage {
            *value = self.table[*value as usize];
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.table
    }
}
