// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas regions and texture coordinates.

/// An axis-aligned rectangle allocated within an [`Atlas`](super::Atlas), in pixels.
///
/// Regions stay valid, with unchanged coordinates and contents, until the atlas is
/// cleared or dropped. Two live regions never overlap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AtlasRegion {
    /// Left edge (pixels).
    pub x: u32,
    /// Top edge (pixels).
    pub y: u32,
    /// Width (pixels).
    pub width: u32,
    /// Height (pixels).
    pub height: u32,
}

impl AtlasRegion {
    /// Creates a new region.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Returns `true` if the two regions share at least one pixel.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns `true` if `other` lies entirely within this region.
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Normalized texture coordinates of this region for an atlas of the given size.
    ///
    /// Coordinates are derived on every call, so they stay correct after the atlas grows.
    pub fn tex_coords(&self, atlas_width: u32, atlas_height: u32) -> TexCoords {
        let w = atlas_width as f32;
        let h = atlas_height as f32;
        TexCoords {
            s0: self.x as f32 / w,
            t0: self.y as f32 / h,
            s1: self.right() as f32 / w,
            t1: self.bottom() as f32 / h,
        }
    }

    /// Absolute texture coordinates, shifted by half a pixel.
    ///
    /// This avoids sampling neighbouring glyphs when the texture is addressed in pixels;
    /// the glyph quad then also needs to be drawn with a half pixel offset.
    pub fn pixel_tex_coords(&self) -> TexCoords {
        TexCoords {
            s0: self.x as f32 - 0.5,
            t0: self.y as f32 - 0.5,
            s1: self.right() as f32 - 0.5,
            t1: self.bottom() as f32 - 0.5,
        }
    }
}

/// Texture coordinates of a glyph quad.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TexCoords {
    /// Left.
    pub s0: f32,
    /// Top.
    pub t0: f32,
    /// Right.
    pub s1: f32,
    /// Bottom.
    pub t1: f32,
}
