// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached glyph records and their render variants.

use core::hash::{Hash, Hasher};

use crate::{Atlas, AtlasRegion, TexCoords};

/// How a glyph image is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Filled glyph coverage.
    #[default]
    Normal,
    /// A stroke centred on the glyph outline.
    OutlineEdge,
    /// The glyph grown outwards by the outline thickness.
    OutlinePositive,
    /// The glyph shrunk inwards by the outline thickness.
    OutlineNegative,
    /// A signed distance field of the filled glyph.
    SignedDistanceField,
}

impl RenderMode {
    /// Returns `true` for the three stroked modes.
    pub fn is_outline(self) -> bool {
        matches!(
            self,
            Self::OutlineEdge | Self::OutlinePositive | Self::OutlineNegative
        )
    }
}

/// Distinguishes multiple cached images of the same codepoint.
///
/// The thickness is compared bitwise, so `0.0` and `-0.0` are different variants.
#[derive(Clone, Copy, Debug, Default)]
pub struct Variant {
    /// The render mode.
    pub mode: RenderMode,
    /// Stroke thickness in pixels for the outline modes.
    pub outline_thickness: f32,
}

impl Variant {
    /// The plain filled variant.
    pub const NORMAL: Self = Self {
        mode: RenderMode::Normal,
        outline_thickness: 0.0,
    };

    /// Creates a variant.
    pub const fn new(mode: RenderMode, outline_thickness: f32) -> Self {
        Self {
            mode,
            outline_thickness,
        }
    }

    /// A stroked variant.
    pub const fn outline(mode: RenderMode, thickness: f32) -> Self {
        Self::new(mode, thickness)
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode
            && self.outline_thickness.to_bits() == other.outline_thickness.to_bits()
    }
}

impl Eq for Variant {}

impl Hash for Variant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.outline_thickness.to_bits().hash(state);
    }
}

/// One rendered glyph image for a `(codepoint, variant)` pair of a font instance.
///
/// Records are value snapshots: copy them out of the store freely, and use a
/// [`GlyphId`](super::GlyphId) when a stable identity is needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRecord {
    /// The codepoint or, after shaping, the glyph index.
    pub codepoint: u32,
    /// Where the padded glyph image lives in the atlas.
    pub region: AtlasRegion,
    /// Width of the padded image (pixels).
    pub width: u32,
    /// Height of the padded image (pixels).
    pub height: u32,
    /// Horizontal offset from the pen position to the image's left edge.
    pub offset_x: i32,
    /// Vertical offset from the baseline up to the image's top edge.
    pub offset_y: i32,
    /// The render variant this image was produced with.
    pub variant: Variant,
}

impl GlyphRecord {
    /// Normalized texture coordinates in the atlas at its current size.
    pub fn tex_coords(&self, atlas: &Atlas) -> TexCoords {
        self.region.tex_coords(atlas.width(), atlas.height())
    }
}
