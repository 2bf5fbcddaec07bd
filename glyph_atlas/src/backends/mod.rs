// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the glyph cache and external font engines.
//!
//! A [`FontBackend`] plays the role of the font library: it is owned by a
//! [`FontContext`](crate::FontContext) and opens [`Face`]s. A face is sized once, when it
//! is opened, and then shapes text and rasterizes glyphs at that size. Faces are
//! expensive; font instances close and reopen them according to their
//! [`FaceMode`](crate::FaceMode).

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{
    Error, FaceMetrics, FaceSettings, FontData, GlyphBitmap, RasterRequest, ShapeOptions,
    ShapedGlyph,
};

#[cfg(feature = "fontdue")]
pub mod fontdue;

/// A font engine that opens faces from font data.
pub trait FontBackend {
    /// Opens a face from `data`, sized according to `settings`.
    ///
    /// Reopening with the same data and settings must produce a face that rasterizes
    /// identically.
    fn open_face(
        &mut self,
        data: &FontData,
        settings: &FaceSettings,
    ) -> Result<Box<dyn Face>, Error>;

    /// A short name for log messages.
    fn name(&self) -> &str {
        "backend"
    }
}

/// An open, sized font face.
pub trait Face {
    /// Face-wide metrics in pixels at the face's size.
    fn metrics(&self) -> FaceMetrics;

    /// Shapes `text`, replacing the contents of `out`.
    fn shape(
        &mut self,
        text: &str,
        options: &ShapeOptions,
        out: &mut Vec<ShapedGlyph>,
    ) -> Result<(), Error>;

    /// The glyph the font's character map assigns to `codepoint`, without shaping.
    ///
    /// Returns `None` if `codepoint` is not a character.
    fn glyph_index(&self, codepoint: u32) -> Option<u32>;

    /// Rasterizes `glyph` as described by `request`.
    ///
    /// The bitmap must be in `request.format`. Whitespace may produce an empty bitmap.
    fn rasterize(&mut self, glyph: u32, request: &RasterRequest) -> Result<GlyphBitmap, Error>;
}
