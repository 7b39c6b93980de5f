// fontchain/atlas/src/error.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors.

use fontchain_otf::FontError;
use thiserror::Error;

/// Everything that can go wrong while resolving fonts or placing glyphs.
///
/// Errors are `Clone` because failed font loads are cached against their key and handed to
/// every later caller until the error history is cleared.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AtlasError {
    /// Font data could not be decoded.
    #[error("malformed font data: {0}")]
    MalformedTableData(String),

    /// A file, system font, memory font, or game asset does not exist.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A caller passed arguments that can never work. These are never cached.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Placing a glyph would need more than the maximum number of texture pages.
    #[error("out of atlas space: all {max_pages} texture pages are full")]
    OutOfAtlasSpace { max_pages: usize },

    /// The atlas was torn down.
    #[error("the font atlas has been disposed")]
    Disposed,

    /// Several fonts of a chain failed.
    #[error("{} font(s) failed to load: {}", .0.len(), summarize(.0))]
    Aggregate(Vec<AtlasError>),
}

impl From<FontError> for AtlasError {
    #[inline]
    fn from(error: FontError) -> AtlasError {
        AtlasError::MalformedTableData(error.to_string())
    }
}

impl AtlasError {
    #[inline]
    pub(crate) fn invalid<S>(message: S) -> AtlasError where S: Into<String> {
        AtlasError::InvalidConfiguration(message.into())
    }

    #[inline]
    pub(crate) fn not_found<S>(message: S) -> AtlasError where S: Into<String> {
        AtlasError::ResourceNotFound(message.into())
    }
}

fn summarize(errors: &[AtlasError]) -> String {
    errors.iter().map(|error| error.to_string()).collect::<Vec<_>>().join("; ")
}

pub type AtlasResult<T> = Result<T, AtlasError>;
