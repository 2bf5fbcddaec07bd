// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The font manager.

use glyph_atlas::testing::BoxBackend;
use glyph_atlas::{Atlas, ErrorKind, FontContext, FontManager, RenderMode, NO_CHARACTER};

use crate::util::font_data;

fn manager(backend: BoxBackend) -> FontManager {
    FontManager::new(FontContext::new(backend), Atlas::new(128, 128, 1).unwrap())
}

#[test]
fn manager_missing_file_adds_nothing() {
    let mut manager = manager(BoxBackend::default());
    let err = manager
        .font_from_file("/nonexistent/glyph_atlas/font.ttf", 12.0, "")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotLoadFont);
    assert_eq!(manager.fonts().count(), 0);
}

#[test]
fn manager_preload_failure_still_returns_font() {
    let mut manager = manager(BoxBackend::default().with_failing(['?' as u32]));
    manager.set_cache(" ?!");
    assert_eq!(manager.cache(), " ?!");
    let id = manager.font_from_memory(font_data(), 14.0, "").unwrap();
    let font = manager.font(id).unwrap();
    assert!(font.find_current(' ' as u32).is_some());
    assert!(font.find_current('!' as u32).is_some());
    assert!(font.find_current('?' as u32).is_none());
}

#[test]
fn manager_fonts_share_the_atlas() {
    let mut manager = manager(BoxBackend::default());
    let data = font_data();
    let small = manager.font_from_memory(data.clone(), 12.0, "").unwrap();
    let large = manager.font_from_memory(data, 24.0, "").unwrap();
    manager.ensure_glyphs(small, "ab").unwrap();
    manager.ensure_glyphs(large, "ab").unwrap();

    let a = 'a' as u32;
    let small_a = manager.font(small).unwrap().find_current(a).unwrap().region;
    let large_a = manager.font(large).unwrap().find_current(a).unwrap().region;
    assert!(!small_a.intersects(&large_a));

    let white = manager
        .font(small)
        .unwrap()
        .find_current(NO_CHARACTER)
        .unwrap()
        .region;
    assert!(manager.atlas().white_region().contains(&white));
}

#[test]
fn manager_clear_reloads_on_demand() {
    let mut manager = manager(BoxBackend::default());
    let id = manager.font_from_memory(font_data(), 12.0, "").unwrap();
    manager.ensure_glyphs(id, "xyz").unwrap();
    manager.atlas_mut().clear();
    let report = manager.ensure_glyphs(id, "xyz").unwrap();
    assert_eq!(report.loaded, 3);

    manager
        .font_mut(id)
        .unwrap()
        .set_render_mode(RenderMode::SignedDistanceField);
    let report = manager.ensure_glyphs(id, "x").unwrap();
    assert_eq!(report.loaded, 1);
    let font = manager.font(id).unwrap();
    assert_eq!(font.glyphs().variants('x' as u32).count(), 2);
}
