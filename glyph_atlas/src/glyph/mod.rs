// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph records and the per-font store that indexes them.

mod record;
mod store;

pub use record::{GlyphRecord, RenderMode, Variant};
pub use store::{GlyphId, GlyphStore, InsertOutcome};
