/* Any copyright is dedicated to the Public Domain.
 * http://creativecommons.org/publicdomain/zero/1.0/ */

use crate::error::AtlasError;
use crate::options::{AtlasOptions, MissingFontPolicy};

#[test]
fn partial_documents_keep_defaults() {
    let options = AtlasOptions::from_json(r#"{ "page_width": 2048, "gamma": 1.8,
                                               "missing_font_policy": "Skip" }"#).unwrap();
    assert_eq!(options.page_width, 2048);
    assert_eq!(options.page_height, 1024);
    assert_eq!(options.gamma, 1.8);
    assert_eq!(options.missing_font_policy, MissingFontPolicy::Skip);
    assert!(options.use_alpha_channels);
    assert_eq!(options.glyph_padding, 1);
}

#[test]
fn empty_documents_are_the_defaults() {
    assert_eq!(AtlasOptions::from_json("{}").unwrap(), AtlasOptions::default());
    assert_eq!(AtlasOptions::default().missing_font_policy, MissingFontPolicy::Placeholder);
}

#[test]
fn bad_values_are_rejected() {
    for json in &[r#"{ "page_width": 0 }"#,
                  r#"{ "page_height": 100000 }"#,
                  r#"{ "gamma": 0.0 }"#,
                  r#"{ "gamma": -1.0 }"#,
                  r#"{ "max_pages": 0 }"#,
                  r#"{ "max_pages": 1000 }"#,
                  r#"{ "placeholder_ascent_ratio": -0.5 }"#,
                  r#"{ "page_width": "wide" }"#] {
        match AtlasOptions::from_json(json) {
            Err(AtlasError::InvalidConfiguration(_)) => {}
            other => panic!("{} gave {:?}", json, other),
        }
    }
}
