// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading glyphs into the atlas: shape, rasterize, pack, write, record.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::distance_field::distance_map;
use crate::{
    Atlas, AtlasRegion, Error, ErrorKind, FaceMode, FontInstance, GlyphBitmap, GlyphRecord,
    PixelFormat, RasterRequest, RenderMode, NO_CHARACTER,
};

/// Outcome of a glyph loading batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Glyphs rasterized and added to the cache by this batch.
    pub loaded: usize,
    /// Glyphs that were already cached.
    pub cached: usize,
    /// Glyphs that are still not cached after the batch.
    pub missing: usize,
    /// The batch stopped early because the atlas had no room, even after growing.
    pub atlas_full: bool,
    /// Per-glyph failures reported by the font engine.
    pub errors: Vec<Error>,
}

impl LoadReport {
    /// Returns `true` if every requested glyph is cached.
    pub fn is_complete(&self) -> bool {
        self.missing == 0
    }
}

/// Padding around a rasterized bitmap inside its atlas region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Padding {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Padding {
    fn for_mode(mode: RenderMode) -> Self {
        // Distance fields need room on every side for the gradient.
        let leading = u32::from(mode == RenderMode::SignedDistanceField);
        Self {
            left: leading,
            top: leading,
            right: 1,
            bottom: 1,
        }
    }
}

/// A character to cache, with its glyph if shaping already chose one.
#[derive(Clone, Copy, Debug)]
struct Pending {
    codepoint: u32,
    glyph: Option<u32>,
}

impl FontInstance {
    /// Makes sure every character of `text` is cached in the current variant.
    ///
    /// The text is shaped and every glyph is cached under the character its cluster
    /// starts with, so lookups by codepoint find it afterwards. Missing glyphs are
    /// rasterized, packed into `atlas` and recorded. When every character is cached
    /// already, the face is not touched. When the atlas has no room, it is grown once
    /// according to its [`Growth`](crate::Growth) policy and the allocation retried. If
    /// that fails too the batch stops and [`LoadReport::atlas_full`] is set; the caller
    /// may grow the atlas further and call again. Rasterizer failures for single glyphs
    /// are collected in [`LoadReport::errors`] and do not stop the batch.
    ///
    /// Fails outright if the face cannot be opened, shaping fails, the current variant
    /// cannot be stored in the atlas's format, `atlas` is not this instance's atlas, or
    /// memory runs out.
    pub fn ensure_glyphs(&mut self, atlas: &mut Atlas, text: &str) -> Result<LoadReport, Error> {
        self.bind(atlas)?;
        if let Some(report) = self.cached_report(text) {
            log::trace!("all {} characters already cached", report.cached);
            return Ok(report);
        }
        let mut shaped = Vec::new();
        if let Err(err) = self.shape_into(text, &mut shaped) {
            self.release(FaceMode::AutoClose);
            return Err(err);
        }
        let pending: Vec<Pending> = shaped
            .iter()
            .filter_map(|glyph| {
                let ch = text.get(glyph.cluster as usize..)?.chars().next()?;
                Some(Pending {
                    codepoint: u32::from(ch),
                    glyph: Some(glyph.glyph),
                })
            })
            .collect();
        self.load_batch(atlas, pending)
    }

    /// Makes sure the given characters are cached in the current variant.
    ///
    /// Like [`ensure_glyphs`](Self::ensure_glyphs), but glyphs come from the font's
    /// character map instead of the shaper. [`NO_CHARACTER`] is accepted.
    pub fn ensure_codepoints(
        &mut self,
        atlas: &mut Atlas,
        codepoints: impl IntoIterator<Item = u32>,
    ) -> Result<LoadReport, Error> {
        self.bind(atlas)?;
        self.load_batch(
            atlas,
            codepoints.into_iter().map(|codepoint| Pending {
                codepoint,
                glyph: None,
            }),
        )
    }

    /// Returns the cached record for a character, loading it first if needed.
    ///
    /// The glyph comes from the font's character map. [`NO_CHARACTER`] returns the
    /// record sampling the atlas's white block. Returns `Ok(None)` if `codepoint` is not
    /// a character or the glyph could not be loaded.
    pub fn glyph(
        &mut self,
        atlas: &mut Atlas,
        codepoint: u32,
    ) -> Result<Option<GlyphRecord>, Error> {
        self.bind(atlas)?;
        if codepoint == NO_CHARACTER {
            if self.find_current(NO_CHARACTER).map(|r| r.variant) != Some(self.variant) {
                self.insert_special(self.variant);
            }
            return Ok(self.find_current(NO_CHARACTER).copied());
        }
        if char::from_u32(codepoint).is_none() {
            return Ok(None);
        }
        if let Some(record) = self.find_current(codepoint) {
            return Ok(Some(*record));
        }
        self.load_batch(
            atlas,
            [Pending {
                codepoint,
                glyph: None,
            }],
        )?;
        Ok(self.find_current(codepoint).copied())
    }

    /// The report for `text` if all of its characters are cached.
    fn cached_report(&self, text: &str) -> Option<LoadReport> {
        let mut seen = HashSet::new();
        for ch in text.chars() {
            let codepoint = u32::from(ch);
            if !self.glyphs.contains(codepoint, self.variant) {
                return None;
            }
            seen.insert(codepoint);
        }
        Some(LoadReport {
            cached: seen.len(),
            ..LoadReport::default()
        })
    }

    fn load_batch(
        &mut self,
        atlas: &mut Atlas,
        pending: impl IntoIterator<Item = Pending>,
    ) -> Result<LoadReport, Error> {
        let result = self.load_batch_inner(atlas, pending);
        self.release(FaceMode::AutoClose);
        result
    }

    fn load_batch_inner(
        &mut self,
        atlas: &mut Atlas,
        pending: impl IntoIterator<Item = Pending>,
    ) -> Result<LoadReport, Error> {
        let format = PixelFormat::from_depth(atlas.depth())?;
        if self.variant.mode == RenderMode::SignedDistanceField && format != PixelFormat::Gray {
            return Err(Error::new(ErrorKind::UnsupportedFormat).with_detail(alloc::format!(
                "distance fields need a depth 1 atlas, this one has depth {}",
                atlas.depth()
            )));
        }
        let request = RasterRequest {
            variant: self.variant,
            format,
            hinting: self.settings.hinting,
            filtering: self.settings.filtering,
            lcd_weights: self.settings.lcd_weights,
        };

        let mut report = LoadReport::default();
        let mut seen = HashSet::new();
        for item in pending {
            let codepoint = item.codepoint;
            if !seen.insert(codepoint) {
                continue;
            }
            if self.glyphs.contains(codepoint, self.variant) {
                log::trace!("{codepoint:#x} already cached");
                report.cached += 1;
                continue;
            }
            if codepoint == NO_CHARACTER {
                self.insert_special(self.variant);
                report.loaded += 1;
                continue;
            }
            if report.atlas_full {
                report.missing += 1;
                continue;
            }
            match self.load_glyph(atlas, item, &request) {
                Ok(()) => report.loaded += 1,
                Err(err) => match err.kind() {
                    ErrorKind::TextureAtlasFull => {
                        log::warn!("{err}");
                        report.atlas_full = true;
                        report.missing += 1;
                    }
                    ErrorKind::OutOfMemory => return Err(err),
                    _ => {
                        log::warn!("skipping {codepoint:#x}: {err}");
                        report.missing += 1;
                        report.errors.push(err);
                    }
                },
            }
        }
        log::debug!(
            "loaded {} glyphs, {} cached, {} missing",
            report.loaded,
            report.cached,
            report.missing
        );
        Ok(report)
    }

    /// Rasterizes one glyph, packs it and records it under its character.
    ///
    /// The record is only inserted once its pixels are in the atlas.
    fn load_glyph(
        &mut self,
        atlas: &mut Atlas,
        item: Pending,
        request: &RasterRequest,
    ) -> Result<(), Error> {
        let codepoint = item.codepoint;
        let face = self.face().map_err(|err| err.with_codepoint(codepoint))?;
        let glyph = match item.glyph {
            Some(glyph) => glyph,
            None => face
                .glyph_index(codepoint)
                .ok_or_else(|| Error::native(codepoint, "no glyph for the character"))?,
        };
        let bitmap = face
            .rasterize(glyph, request)
            .map_err(|err| err.with_codepoint(codepoint))?;
        if bitmap.format != request.format {
            return Err(Error::new(ErrorKind::UnsupportedFormat)
                .with_codepoint(codepoint)
                .with_detail(alloc::format!(
                    "rasterizer produced {:?} for a {:?} atlas",
                    bitmap.format,
                    request.format
                )));
        }
        if !bitmap.is_consistent() {
            return Err(Error::native(
                codepoint,
                alloc::format!(
                    "glyph {glyph} came back as {} bytes for {}x{} pixels with pitch {}",
                    bitmap.data.len(),
                    bitmap.width,
                    bitmap.height,
                    bitmap.pitch
                ),
            ));
        }

        let padding = Padding::for_mode(request.variant.mode);
        let width = bitmap.width + padding.left + padding.right;
        let height = bitmap.height + padding.top + padding.bottom;
        let region =
            allocate(atlas, width, height).map_err(|err| err.with_codepoint(codepoint))?;

        let mut pixels = padded_pixels(&bitmap, padding, width, height);
        if request.variant.mode == RenderMode::SignedDistanceField {
            pixels = distance_map(&pixels, width, height);
        }
        let depth = atlas.depth() as usize;
        atlas.set_region(region, &pixels, width as usize * depth);

        let outcome = self.glyphs.insert(GlyphRecord {
            codepoint,
            region,
            width,
            height,
            offset_x: bitmap.left,
            offset_y: bitmap.top,
            variant: request.variant,
        });
        if outcome.appended {
            log::trace!(
                "{codepoint:#x} (glyph {glyph}) now cached in {} variants",
                self.glyphs.variants(codepoint).count()
            );
        }
        Ok(())
    }
}

/// Allocates a region, growing the atlas once if it is full.
fn allocate(atlas: &mut Atlas, width: u32, height: u32) -> Result<AtlasRegion, Error> {
    if let Some(region) = atlas.allocate(width, height) {
        return Ok(region);
    }
    if atlas.grow_for()? {
        if let Some(region) = atlas.allocate(width, height) {
            return Ok(region);
        }
    }
    Err(Error::atlas_full(width, height))
}

/// Copies a bitmap into a zeroed buffer of the padded size, dropping any row padding.
fn padded_pixels(bitmap: &GlyphBitmap, padding: Padding, width: u32, height: u32) -> Vec<u8> {
    let depth = bitmap.format.depth() as usize;
    let stride = width as usize * depth;
    let mut pixels = vec![0_u8; stride * height as usize];
    let left = padding.left as usize * depth;
    for (y, row) in bitmap.rows().enumerate() {
        let start = (y + padding.top as usize) * stride + left;
        pixels[start..start + row.len()].copy_from_slice(row);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_depends_on_mode() {
        assert_eq!(
            Padding::for_mode(RenderMode::Normal),
            Padding {
                left: 0,
                top: 0,
                right: 1,
                bottom: 1
            }
        );
        assert_eq!(
            Padding::for_mode(RenderMode::SignedDistanceField),
            Padding {
                left: 1,
                top: 1,
                right: 1,
                bottom: 1
            }
        );
    }

    #[test]
    fn padded_pixels_places_bitmap() {
        let bitmap = GlyphBitmap {
            width: 2,
            height: 1,
            pitch: 3,
            left: 0,
            top: 1,
            format: PixelFormat::Gray,
            data: vec![7, 8, 99],
        };
        let padding = Padding::for_mode(RenderMode::SignedDistanceField);
        let pixels = padded_pixels(&bitmap, padding, 4, 3);
        assert_eq!(pixels, [0, 0, 0, 0, 0, 7, 8, 0, 0, 0, 0, 0]);
    }
}
