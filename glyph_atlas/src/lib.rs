// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Atlas rasterizes glyphs once and packs them into a shared, growable texture atlas.
//!
//! The crate is organised around four pieces:
//!
//! - [`Atlas`]: a single growable bitmap (`width × height × depth`) with a skyline
//!   rectangle packer. Regions handed out by the atlas never move, even when it grows.
//! - [`GlyphStore`]: a sparse two-level index from codepoint to cached [`GlyphRecord`]s,
//!   with one entry per render [`Variant`] of a codepoint.
//! - [`FontContext`] and [`FontInstance`]: the explicit, reference-counted font engine
//!   context and the per-size font instances created from it, including the face
//!   open/close lifecycle.
//! - [`FontInstance::ensure_glyphs`]: the load pipeline that shapes text, rasterizes
//!   missing glyphs, packs them into the atlas and records them.
//!
//! The external font engines sit behind the [`FontBackend`] and [`Face`] traits.
//!
//! ## Features
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc), and load fonts from file paths.
//! - `libm`: Use floating point implementations from [libm].
//! - `fontdue`: Enables [`backends::fontdue::FontdueBackend`], which shapes with `harfrust`,
//!   reads metrics with `skrifa` and rasterizes with `fontdue`.
//! - `testing`: Enables the [`testing`] module with a deterministic box-drawing backend.
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//!
//! [libm]: https://crates.io/crates/libm

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("glyph_atlas requires either the `std` or `libm` feature to be enabled");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use core_maths as _;

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod atlas;
mod distance_field;
mod error;
mod font;
mod glyph;
mod manager;
mod math;
mod pipeline;
mod raster;

pub mod backends;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use atlas::{
    Atlas, AtlasConfig, AtlasId, AtlasRegion, Growth, SkylineAllocator, SkylineNode, TexCoords,
    DEFAULT_MAX_ATLAS_SIZE,
};
pub use backends::{Face, FontBackend};
pub use distance_field::{distance_map, stroke};
pub use error::{Error, ErrorKind};
pub use font::{
    FaceMode, FaceSettings, FaceState, FontContext, FontData, FontInstance, FontMetrics,
    FontSource, DEFAULT_DPI, DEFAULT_HRES, DEFAULT_LCD_WEIGHTS,
};
pub use glyph::{GlyphId, GlyphRecord, GlyphStore, InsertOutcome, RenderMode, Variant};
pub use manager::{FontId, FontManager};
pub use pipeline::LoadReport;
pub use raster::{
    Direction, FaceMetrics, GlyphBitmap, PixelFormat, RasterRequest, ShapeOptions, ShapedGlyph,
};

/// The codepoint used for the "no character" glyph.
///
/// Its record samples an opaque white block of the atlas and is used to draw
/// decorations such as underlines, strikethroughs and backgrounds.
pub const NO_CHARACTER: u32 = u32::MAX;
