// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font contexts, font instances and the face lifecycle.

mod context;
mod instance;
mod metrics;
mod source;

pub use context::FontContext;
pub use instance::FontInstance;
pub use metrics::FontMetrics;
pub use source::{FontData, FontSource};

pub(crate) use source::SourceKey;

/// Default horizontal resolution multiplier.
pub const DEFAULT_HRES: u32 = 100;

/// Default resolution in dots per inch. At 72 dpi a point is a pixel.
pub const DEFAULT_DPI: f32 = 72.0;

/// Default weights of the 5-tap LCD filter.
pub const DEFAULT_LCD_WEIGHTS: [u8; 5] = [0x10, 0x40, 0x70, 0x40, 0x10];

/// When a font instance releases its face.
///
/// Modes are ordered: a face is closed by a request at a given mode if the instance's
/// mode is less than or equal to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaceMode {
    /// Close the face after every glyph loading batch.
    #[default]
    AutoClose,
    /// Close the face only on [`FontInstance::close_face`].
    ManualClose,
    /// Keep the face open until the instance is dropped.
    AlwaysOpen,
}

/// Lifecycle state of a font instance's face.
///
/// Dropping the instance is the destroyed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceState {
    /// The face has not been opened yet, or opening failed.
    Unopened,
    /// The face is open and sized.
    Open,
    /// The face was released and will be reopened on demand.
    Closed,
}

/// Options used every time a face is opened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceSettings {
    /// Size in points.
    pub size: f32,
    /// Resolution in dots per inch.
    pub dpi: f32,
    /// Horizontal resolution multiplier for shaping positions.
    pub hres: u32,
    /// Whether glyphs are hinted.
    pub hinting: bool,
    /// Whether the LCD filter is applied to subpixel glyphs.
    pub filtering: bool,
    /// LCD filter weights.
    pub lcd_weights: [u8; 5],
    /// Face index within a font collection.
    pub collection_index: u32,
}

impl FaceSettings {
    /// Default settings for a size in points.
    pub fn new(size: f32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// The size in pixels.
    pub fn pixel_size(&self) -> f32 {
        self.size * self.dpi / DEFAULT_DPI
    }
}

impl Default for FaceSettings {
    fn default() -> Self {
        Self {
            size: 12.0,
            dpi: DEFAULT_DPI,
            hres: DEFAULT_HRES,
            hinting: true,
            filtering: true,
            lcd_weights: DEFAULT_LCD_WEIGHTS,
            collection_index: 0,
        }
    }
}
