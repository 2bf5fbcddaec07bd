// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable texture atlas with skyline packing.
//!
//! This module provides:
//! - [`Atlas`]: the pixel surface, which owns a [`SkylineAllocator`] and grows in place
//! - [`AtlasRegion`]: the rectangle handed out for each packed bitmap
//! - [`TexCoords`]: normalized coordinates derived from a region on demand

mod region;
mod skyline;
mod surface;

pub use region::{AtlasRegion, TexCoords};
pub use skyline::{SkylineAllocator, SkylineNode};
pub use surface::{Atlas, AtlasConfig, AtlasId, Growth, DEFAULT_MAX_ATLAS_SIZE};
