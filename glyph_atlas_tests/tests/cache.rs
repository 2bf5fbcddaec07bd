// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading glyphs into the cache.

use glyph_atlas::testing::{glyph_for, outline_growth, BoxBackend};
use glyph_atlas::{
    Atlas, AtlasConfig, AtlasRegion, ErrorKind, Growth, RenderMode, Variant, NO_CHARACTER,
};

use crate::util::{
    assert_disjoint, context, context_with, font, regions, GLYPH_HEIGHT, GLYPH_WIDTH,
};

#[test]
fn cache_pads_each_render_mode() {
    let (context, _) = context();
    let mut atlas = Atlas::new(128, 128, 1).unwrap();
    let mut font = font(&context, &atlas);

    font.ensure_glyphs(&mut atlas, "A").unwrap();
    let normal = *font.find_current('A' as u32).unwrap();
    assert_eq!((normal.width, normal.height), (GLYPH_WIDTH + 1, GLYPH_HEIGHT + 1));
    assert_eq!((normal.offset_x, normal.offset_y), (1, GLYPH_HEIGHT as i32));
    assert_eq!(
        (normal.region.width, normal.region.height),
        (normal.width, normal.height)
    );

    font.set_render_mode(RenderMode::SignedDistanceField);
    font.ensure_glyphs(&mut atlas, "A").unwrap();
    let sdf = *font.find_current('A' as u32).unwrap();
    assert_eq!((sdf.width, sdf.height), (GLYPH_WIDTH + 2, GLYPH_HEIGHT + 2));

    let outline = Variant::outline(RenderMode::OutlinePositive, 2.0);
    assert_eq!(outline_growth(outline), 2);
    font.set_variant(outline);
    font.ensure_glyphs(&mut atlas, "A").unwrap();
    let stroked = *font.find_current('A' as u32).unwrap();
    assert_eq!((stroked.width, stroked.height), (15, 17));
    assert_eq!((stroked.offset_x, stroked.offset_y), (-1, 14));
}

#[test]
fn cache_writes_bitmap_with_blank_margin() {
    let (context, _) = context();
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    let record = font.glyph(&mut atlas, 'A' as u32).unwrap().unwrap();

    let pixels = atlas.region_pixels(record.region);
    let stride = record.width as usize;
    for (y, row) in pixels.chunks_exact(stride).enumerate() {
        let (glyph, margin) = row.split_at(GLYPH_WIDTH as usize);
        assert_eq!(margin, [0]);
        if y < GLYPH_HEIGHT as usize {
            assert!(glyph.iter().all(|&p| p == 0xC1), "row {y}: {glyph:?}");
        } else {
            assert!(glyph.iter().all(|&p| p == 0), "padding row: {glyph:?}");
        }
    }
}

#[test]
fn cache_reuses_loaded_glyphs() {
    let (context, log) = context();
    let mut atlas = Atlas::new(128, 128, 1).unwrap();
    let mut font = font(&context, &atlas);

    let first = font.ensure_glyphs(&mut atlas, "Hello").unwrap();
    assert_eq!(first.loaded, 4);
    assert_eq!(first.cached, 0);
    assert!(first.is_complete());
    let rasterized = log.raster_count();
    let used = atlas.used();
    let before = regions(&font, "Helo");

    let second = font.ensure_glyphs(&mut atlas, "Hello").unwrap();
    assert_eq!(second.loaded, 0);
    assert_eq!(second.cached, 4);
    assert_eq!(log.raster_count(), rasterized);
    assert_eq!(atlas.used(), used);
    assert_eq!(regions(&font, "Helo"), before);
}

#[test]
fn cache_grows_atlas_for_many_glyphs() {
    let (context, _) = context();
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    let text: String = (33_u8..103).map(char::from).collect();

    let report = font.ensure_glyphs(&mut atlas, &text).unwrap();
    assert_eq!(report.loaded, 70);
    assert!(!report.atlas_full);
    assert!(atlas.width() > 64 && atlas.height() > 64);

    let mut all = regions(&font, &text);
    all.push(atlas.white_region());
    assert_disjoint(&atlas, &all);
    assert_eq!(font.glyphs().len(), 71);
}

#[test]
fn cache_reports_full_atlas() {
    let (context, _) = context();
    let mut atlas = Atlas::with_config(
        32,
        32,
        1,
        AtlasConfig {
            growth: Growth::None,
            ..AtlasConfig::default()
        },
    )
    .unwrap();
    let mut font = font(&context, &atlas);
    let text = "abcdefghijklmnopqrst";

    let report = font.ensure_glyphs(&mut atlas, text).unwrap();
    assert!(report.atlas_full);
    assert!(report.loaded > 0);
    assert!(report.missing > 0);
    assert_eq!(report.loaded + report.missing, text.len());
    assert!(report.errors.is_empty());
    assert_eq!(atlas.width(), 32);
    let loaded: Vec<char> = text
        .chars()
        .filter(|&ch| font.find_current(ch as u32).is_some())
        .collect();
    assert_eq!(loaded.len(), report.loaded);

    atlas.grow(256, 256).unwrap();
    let retry = font.ensure_glyphs(&mut atlas, text).unwrap();
    assert_eq!(retry.cached, report.loaded);
    assert_eq!(retry.loaded, report.missing);
    assert!(retry.is_complete());
}

#[test]
fn cache_skips_glyphs_that_fail() {
    let (context, _) = context_with(BoxBackend::default().with_failing(['b' as u32]));
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);

    let report = font.ensure_glyphs(&mut atlas, "abc").unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(report.missing, 1);
    assert!(!report.is_complete());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), ErrorKind::NativeLibrary);
    assert_eq!(report.errors[0].codepoint(), Some('b' as u32));
    assert!(font.find_current('b' as u32).is_none());
    assert!(font.find_current('c' as u32).is_some());
}

#[test]
fn cache_skips_inconsistent_bitmaps() {
    let (context, _) = context_with(BoxBackend::default().with_truncated(['b' as u32]));
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    let used = atlas.used();

    let report = font.ensure_glyphs(&mut atlas, "abc").unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(report.missing, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), ErrorKind::NativeLibrary);
    assert_eq!(report.errors[0].codepoint(), Some('b' as u32));
    assert!(font.find_current('b' as u32).is_none());
    let padded = u64::from((GLYPH_WIDTH + 1) * (GLYPH_HEIGHT + 1));
    assert_eq!(atlas.used(), used + 2 * padded);
}

#[test]
fn cache_finds_loaded_codepoints() {
    let (context, _) = context();
    let mut atlas = Atlas::new(128, 128, 1).unwrap();
    let mut font = font(&context, &atlas);

    let report = font.ensure_glyphs(&mut atlas, "Hi!").unwrap();
    assert_eq!(report.loaded, 3);
    for ch in "Hi!".chars() {
        let record = font.find_glyph(ch as u32, Variant::NORMAL).unwrap();
        assert_eq!(record.codepoint, ch as u32);
    }
    assert!(font
        .find_glyph(glyph_for('H' as u32), Variant::NORMAL)
        .is_none());

    let again = font.ensure_codepoints(&mut atlas, ['H' as u32, 'j' as u32]).unwrap();
    assert_eq!((again.cached, again.loaded), (1, 1));
    let j = font.glyph(&mut atlas, 'j' as u32).unwrap().unwrap();
    assert_eq!(j.codepoint, 'j' as u32);
    assert_eq!(atlas.region_pixels(j.region)[0], 0x80 | 'j' as u8);
}

#[test]
fn cache_keeps_variants_apart() {
    let (context, _) = context();
    let mut atlas = Atlas::new(128, 128, 1).unwrap();
    let mut font = font(&context, &atlas);
    let edge = Variant::outline(RenderMode::OutlineEdge, 1.0);
    let sdf = Variant::new(RenderMode::SignedDistanceField, 0.0);

    font.ensure_glyphs(&mut atlas, "A").unwrap();
    font.set_variant(edge);
    font.ensure_glyphs(&mut atlas, "A").unwrap();
    font.set_variant(sdf);
    font.ensure_glyphs(&mut atlas, "A").unwrap();

    let a = 'A' as u32;
    assert_eq!(font.glyphs().variants(a).count(), 3);
    let found: Vec<AtlasRegion> = [Variant::NORMAL, edge, sdf]
        .iter()
        .map(|&variant| {
            let record = font.find_glyph(a, variant).unwrap();
            assert_eq!(record.variant, variant);
            record.region
        })
        .collect();
    assert_disjoint(&atlas, &found);
    assert!(font
        .find_glyph(a, Variant::outline(RenderMode::OutlineEdge, 2.0))
        .is_none());
}

#[test]
fn cache_serves_no_character_from_white_block() {
    let (context, _) = context();
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);

    let record = font.glyph(&mut atlas, NO_CHARACTER).unwrap().unwrap();
    let white = atlas.white_region();
    assert_eq!(record.region, AtlasRegion::new(white.x + 2, white.y + 2, 1, 1));
    assert_eq!((record.width, record.height), (0, 0));
    assert_eq!(atlas.region_pixels(record.region), [0xFF]);

    let outline = Variant::outline(RenderMode::OutlineEdge, 1.0);
    let fallback = font.find_glyph(NO_CHARACTER, outline).unwrap();
    assert_eq!(fallback.region, record.region);
    assert_eq!(fallback.variant, Variant::NORMAL);
}

#[test]
fn cache_glyph_rejects_non_characters() {
    let (context, _) = context();
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    assert_eq!(font.glyph(&mut atlas, 0xD800).unwrap(), None);
    let record = font.glyph(&mut atlas, 'x' as u32).unwrap().unwrap();
    assert_eq!(record.codepoint, 'x' as u32);
    assert_eq!(record.tex_coords(&atlas), record.region.tex_coords(64, 64));
}

#[test]
fn cache_fills_color_atlases() {
    let (context, _) = context();
    let mut lcd = Atlas::new(64, 64, 3).unwrap();
    let mut font = font(&context, &lcd);
    let record = font.glyph(&mut lcd, 'a' as u32).unwrap().unwrap();
    assert_eq!(lcd.region_pixels(record.region)[..6], [0xE1; 6]);

    let mut rgba = Atlas::new(64, 64, 4).unwrap();
    let mut font = crate::util::font(&context, &rgba);
    let record = font.glyph(&mut rgba, 'a' as u32).unwrap().unwrap();
    assert_eq!(rgba.region_pixels(record.region)[..4], [0xFF, 0xFF, 0xFF, 0xE1]);

    font.set_render_mode(RenderMode::SignedDistanceField);
    let err = font.ensure_glyphs(&mut rgba, "b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn cache_distance_fields_peak_inside() {
    let (context, _) = context();
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    font.set_render_mode(RenderMode::SignedDistanceField);
    let record = font.glyph(&mut atlas, 'A' as u32).unwrap().unwrap();

    let pixels = atlas.region_pixels(record.region);
    assert_eq!(pixels.iter().max(), Some(&255));
    assert!(pixels[0] < 127, "corner is {}", pixels[0]);
}

#[test]
fn cache_is_dropped_when_atlas_is_cleared() {
    let (context, _) = context();
    let mut atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    font.ensure_glyphs(&mut atlas, "ab").unwrap();

    atlas.clear();
    let report = font.ensure_glyphs(&mut atlas, "ab").unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(report.cached, 0);
    assert_eq!(font.glyphs().len(), 3);
    assert!(font.find_current(NO_CHARACTER).is_some());
}

#[test]
fn cache_refuses_foreign_atlas() {
    let (context, _) = context();
    let atlas = Atlas::new(64, 64, 1).unwrap();
    let mut other = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    let err = font.ensure_glyphs(&mut other, "a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AtlasMismatch);
    assert_eq!(other.used(), 25);
}

#[test]
fn cache_shapes_with_advances() {
    let (context, _) = context();
    let atlas = Atlas::new(64, 64, 1).unwrap();
    let mut font = font(&context, &atlas);
    let shaped = font.shape("ab").unwrap();
    assert_eq!(shaped.len(), 2);
    assert_eq!(shaped[0].glyph, glyph_for('a' as u32));
    assert_eq!(shaped[1].cluster, 1);
    assert_eq!(shaped[0].x_advance, (GLYPH_WIDTH as i32 + 1) * 64 * 100);
}
