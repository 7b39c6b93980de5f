// fontchain/atlas/src/adapters/mod.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Physical font adapters.

pub mod baked;
pub mod placeholder;
pub mod rasterized;
pub mod rescaled;

pub use self::baked::BakedFont;
pub use self::placeholder::PlaceholderFont;
pub use self::rasterized::RasterizedFont;
pub use self::rescaled::RescaledFont;
