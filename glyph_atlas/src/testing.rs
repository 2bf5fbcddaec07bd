// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic font backend for tests.
//!
//! [`BoxBackend`] needs no font files. Every character maps to the glyph
//! [`glyph_for`] gives it and rasterizes to a solid box of a configurable size, so tests
//! can predict exactly which regions the cache will request. Glyph numbers differ from
//! the codepoints, like in a real font.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::math::ceil;
use crate::{
    Error, Face, FaceMetrics, FaceSettings, FontBackend, FontData, GlyphBitmap, PixelFormat,
    RasterRequest, ShapeOptions, ShapedGlyph, Variant,
};

/// Distance between a codepoint and the number of its glyph.
pub const GLYPH_OFFSET: u32 = 0x1000;

/// The glyph a [`BoxBackend`] face uses for `codepoint`.
pub fn glyph_for(codepoint: u32) -> u32 {
    codepoint.wrapping_add(GLYPH_OFFSET)
}

/// What a [`BoxBackend`] was asked to do.
#[derive(Clone, Debug, Default)]
pub struct BackendLog {
    /// Settings of every face opened, in order.
    pub opens: Vec<FaceSettings>,
    /// Every glyph rasterized, in order.
    pub rasterized: Vec<(u32, Variant)>,
}

/// Shared view of a [`BackendLog`] that stays usable after the backend is moved into a
/// context.
#[derive(Clone, Debug, Default)]
pub struct LogHandle(Rc<RefCell<BackendLog>>);

impl LogHandle {
    /// A copy of the log so far.
    pub fn snapshot(&self) -> BackendLog {
        self.0.borrow().clone()
    }

    /// Number of faces opened.
    pub fn open_count(&self) -> usize {
        self.0.borrow().opens.len()
    }

    /// Number of glyphs rasterized.
    pub fn raster_count(&self) -> usize {
        self.0.borrow().rasterized.len()
    }
}

/// Backend drawing every glyph as a solid box.
///
/// The glyph of codepoint `c` is filled with the byte `0x80 | (c & 0x7F)`, expanded to
/// the requested format. Outline variants grow the box by the outline thickness on every
/// side. Empty font data, or an open past the limit set with
/// [`with_open_limit`](Self::with_open_limit), fails with
/// [`ErrorKind::CannotLoadFont`](crate::ErrorKind).
#[derive(Clone, Debug)]
pub struct BoxBackend {
    glyph_width: u32,
    glyph_height: u32,
    blank: Vec<u32>,
    failing: Vec<u32>,
    truncated: Vec<u32>,
    open_limit: Option<usize>,
    log: LogHandle,
}

impl Default for BoxBackend {
    fn default() -> Self {
        Self {
            glyph_width: 10,
            glyph_height: 12,
            blank: vec![' ' as u32],
            failing: Vec::new(),
            truncated: Vec::new(),
            open_limit: None,
            log: LogHandle::default(),
        }
    }
}

impl BoxBackend {
    /// Boxes of `width × height` pixels.
    pub fn with_glyph_size(mut self, width: u32, height: u32) -> Self {
        self.glyph_width = width;
        self.glyph_height = height;
        self
    }

    /// Characters whose rasterization fails with a native library error.
    pub fn with_failing(mut self, codepoints: impl IntoIterator<Item = u32>) -> Self {
        self.failing = codepoints.into_iter().collect();
        self
    }

    /// Characters whose bitmaps come back with half of their pixel data missing.
    pub fn with_truncated(mut self, codepoints: impl IntoIterator<Item = u32>) -> Self {
        self.truncated = codepoints.into_iter().collect();
        self
    }

    /// Fails every face open after the first `opens` ones.
    pub fn with_open_limit(mut self, opens: usize) -> Self {
        self.open_limit = Some(opens);
        self
    }

    /// A handle on the log of faces opened and glyphs rasterized.
    pub fn log(&self) -> LogHandle {
        self.log.clone()
    }
}

impl FontBackend for BoxBackend {
    fn open_face(
        &mut self,
        data: &FontData,
        settings: &FaceSettings,
    ) -> Result<Box<dyn Face>, Error> {
        if data.data().is_empty() {
            return Err(Error::cannot_load_font("empty font data"));
        }
        if self
            .open_limit
            .is_some_and(|limit| self.log.open_count() >= limit)
        {
            return Err(Error::cannot_load_font("face limit reached"));
        }
        self.log.0.borrow_mut().opens.push(*settings);
        Ok(Box::new(BoxFace {
            backend: self.clone(),
            settings: *settings,
        }))
    }

    fn name(&self) -> &str {
        "box"
    }
}

struct BoxFace {
    backend: BoxBackend,
    settings: FaceSettings,
}

impl Face for BoxFace {
    fn metrics(&self) -> FaceMetrics {
        let px = self.settings.pixel_size();
        FaceMetrics {
            ascender: px * 0.8,
            descender: px * -0.2,
            height: px * 1.2,
            underline_position: px * -0.1,
            underline_thickness: px * 0.05,
        }
    }

    fn shape(
        &mut self,
        text: &str,
        _options: &ShapeOptions,
        out: &mut Vec<ShapedGlyph>,
    ) -> Result<(), Error> {
        out.clear();
        let advance = (self.backend.glyph_width + 1).cast_signed() * 64;
        for (cluster, ch) in text.char_indices() {
            out.push(ShapedGlyph {
                glyph: glyph_for(ch as u32),
                cluster: u32::try_from(cluster).unwrap_or(u32::MAX),
                x_advance: advance * self.settings.hres.cast_signed(),
                ..ShapedGlyph::default()
            });
        }
        Ok(())
    }

    fn glyph_index(&self, codepoint: u32) -> Option<u32> {
        char::from_u32(codepoint).map(|_| glyph_for(codepoint))
    }

    fn rasterize(&mut self, glyph: u32, request: &RasterRequest) -> Result<GlyphBitmap, Error> {
        self.backend
            .log
            .0
            .borrow_mut()
            .rasterized
            .push((glyph, request.variant));
        let codepoint = glyph.wrapping_sub(GLYPH_OFFSET);
        if self.backend.failing.contains(&codepoint) {
            return Err(Error::native(glyph, "rasterizer refused the glyph"));
        }
        if self.backend.blank.contains(&codepoint) {
            return Ok(GlyphBitmap::empty(request.format));
        }
        let grow = outline_growth(request.variant);
        let width = self.backend.glyph_width + 2 * grow;
        let height = self.backend.glyph_height + 2 * grow;
        let value = 0x80 | (codepoint.to_le_bytes()[0] & 0x7F);
        let pixel = match request.format {
            PixelFormat::Gray => vec![value],
            PixelFormat::Lcd => vec![value; 3],
            PixelFormat::Rgba => vec![0xFF, 0xFF, 0xFF, value],
        };
        let mut data = pixel.repeat((width * height) as usize);
        if self.backend.truncated.contains(&codepoint) {
            data.truncate(data.len() / 2);
        }
        Ok(GlyphBitmap {
            width,
            height,
            pitch: width as usize * pixel.len(),
            left: 1 - grow.cast_signed(),
            top: (height - grow).cast_signed(),
            format: request.format,
            data,
        })
    }
}

/// Pixels an outline variant adds on every side of the box.
#[expect(
    clippy::cast_possible_truncation,
    reason = "outline thicknesses are a few pixels"
)]
pub fn outline_growth(variant: Variant) -> u32 {
    if variant.mode.is_outline() {
        ceil(variant.outline_thickness.max(0.0)) as u32
    } else {
        0
    }
}
