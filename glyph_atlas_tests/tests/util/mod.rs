// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures shared by the tests.

use glyph_atlas::testing::{BoxBackend, LogHandle};
use glyph_atlas::{Atlas, AtlasRegion, FontContext, FontData, FontInstance};

/// Size of the box glyphs used unless a test says otherwise.
pub(crate) const GLYPH_WIDTH: u32 = 10;
pub(crate) const GLYPH_HEIGHT: u32 = 12;

/// Font data accepted by the box backend.
pub(crate) fn font_data() -> FontData {
    FontData::new(vec![0; 16])
}

/// A context around a default box backend, and the handle on its log.
pub(crate) fn context() -> (FontContext, LogHandle) {
    context_with(BoxBackend::default())
}

pub(crate) fn context_with(backend: BoxBackend) -> (FontContext, LogHandle) {
    let log = backend.log();
    (FontContext::new(backend), log)
}

/// A 16pt box font packing into `atlas`.
pub(crate) fn font(context: &FontContext, atlas: &Atlas) -> FontInstance {
    context
        .font_from_memory(atlas, font_data(), 16.0, "en")
        .unwrap()
}

/// Panics if any two regions overlap or a region leaves the atlas.
pub(crate) fn assert_disjoint(atlas: &Atlas, regions: &[AtlasRegion]) {
    for (i, a) in regions.iter().enumerate() {
        assert!(
            a.right() < atlas.width() && a.bottom() < atlas.height(),
            "{a:?} touches the border of a {}x{} atlas",
            atlas.width(),
            atlas.height()
        );
        assert!(a.x >= 1 && a.y >= 1, "{a:?} touches the border");
        for b in &regions[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

/// The cached region of every glyph of `text` in the current variant.
pub(crate) fn regions(font: &FontInstance, text: &str) -> Vec<AtlasRegion> {
    text.chars()
        .map(|ch| {
            font.find_current(ch as u32)
                .unwrap_or_else(|| panic!("{ch:?} is not cached"))
                .region
        })
        .collect()
}
