// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data exchanged with font backends: shaped glyphs, rasterized bitmaps and face metrics.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{Error, ErrorKind, Variant};

/// Pixel layout of a rasterized bitmap, matching an atlas depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One coverage byte per pixel.
    Gray,
    /// Three horizontal subpixel coverage bytes per pixel.
    Lcd,
    /// Four bytes of color per pixel.
    Rgba,
}

impl PixelFormat {
    /// The format stored in an atlas with `depth` bytes per pixel.
    pub fn from_depth(depth: u32) -> Result<Self, Error> {
        match depth {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Lcd),
            4 => Ok(Self::Rgba),
            _ => Err(Error::new(ErrorKind::UnsupportedFormat)
                .with_detail(alloc::format!("no pixel format with depth {depth}"))),
        }
    }

    /// Bytes per pixel.
    pub fn depth(self) -> u32 {
        match self {
            Self::Gray => 1,
            Self::Lcd => 3,
            Self::Rgba => 4,
        }
    }
}

/// A rasterized glyph image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes from the start of one row to the start of the next.
    pub pitch: usize,
    /// Horizontal bearing from the pen position to the left edge.
    pub left: i32,
    /// Vertical bearing from the baseline up to the top edge.
    pub top: i32,
    /// Layout of `data`.
    pub format: PixelFormat,
    /// `height` rows of `pitch` bytes.
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    /// An empty bitmap, as produced for whitespace.
    pub fn empty(format: PixelFormat) -> Self {
        Self {
            width: 0,
            height: 0,
            pitch: 0,
            left: 0,
            top: 0,
            format,
            data: Vec::new(),
        }
    }

    /// Returns `true` if the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes in one row of pixels, without padding.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.depth() as usize
    }

    /// Returns `true` if `pitch` and `data` hold every row of the bitmap.
    ///
    /// Empty bitmaps are always consistent.
    pub fn is_consistent(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let row_len = self.row_len();
        self.pitch >= row_len
            && (self.height as usize - 1)
                .checked_mul(self.pitch)
                .and_then(|n| n.checked_add(row_len))
                .is_some_and(|needed| self.data.len() >= needed)
    }

    /// Iterates over the rows of the bitmap, without padding.
    ///
    /// # Panics
    ///
    /// Panics if the bitmap is not [consistent](Self::is_consistent).
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let row_len = self.row_len();
        let height = if self.is_empty() { 0 } else { self.height as usize };
        (0..height).map(move |row| {
            let start = row * self.pitch;
            &self.data[start..start + row_len]
        })
    }
}

/// Everything a backend needs to rasterize one glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterRequest {
    /// The variant being cached.
    pub variant: Variant,
    /// The layout the atlas stores, and therefore the bitmap must be in.
    pub format: PixelFormat,
    /// Whether hinting is enabled.
    pub hinting: bool,
    /// Whether the LCD filter should be applied to subpixel bitmaps.
    pub filtering: bool,
    /// Weights of the 5-tap LCD filter.
    pub lcd_weights: [u8; 5],
}

/// Text direction handed to the shaper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Let the shaper guess from the text.
    #[default]
    Auto,
    /// Left to right.
    LeftToRight,
    /// Right to left.
    RightToLeft,
    /// Top to bottom.
    TopToBottom,
    /// Bottom to top.
    BottomToTop,
}

/// Segment properties for shaping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShapeOptions {
    /// ISO 15924 script tag, such as `*b"Latn"`, or `None` to guess.
    pub script: Option<[u8; 4]>,
    /// Direction of the run.
    pub direction: Direction,
    /// BCP 47 language tag, such as `"en"`.
    pub language: Option<String>,
}

/// One shaped glyph.
///
/// Advances and offsets are 26.6 fixed point pixels. Horizontal values are additionally
/// multiplied by the horizontal resolution of the face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShapedGlyph {
    /// The glyph identifier used as the cache key.
    pub glyph: u32,
    /// Byte offset of the cluster in the shaped text.
    pub cluster: u32,
    /// Horizontal advance.
    pub x_advance: i32,
    /// Vertical advance.
    pub y_advance: i32,
    /// Horizontal offset.
    pub x_offset: i32,
    /// Vertical offset.
    pub y_offset: i32,
}

/// Face-wide metrics in pixels at the face's size, y up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceMetrics {
    /// Distance from the baseline to the top of the tallest glyphs.
    pub ascender: f32,
    /// Distance from the baseline to the bottom of the lowest glyphs, usually negative.
    pub descender: f32,
    /// Baseline to baseline distance.
    pub height: f32,
    /// Position of the underline relative to the baseline.
    pub underline_position: f32,
    /// Thickness of the underline.
    pub underline_thickness: f32,
}
