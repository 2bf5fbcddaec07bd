// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `glyph_atlas`.
//!
//! - The `util` module holds the fixtures shared by the topic modules.
//! - Tests are grouped by topic: packing into the atlas, the glyph cache, the face
//!   lifecycle and the font manager. Put the topic at the start of a test's name, so
//!   `cache_reuses_glyphs` rather than `reuses_cached_glyphs`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]
#![allow(
    clippy::missing_assert_message,
    reason = "the asserted values are printed on failure"
)]

mod cache;
mod manager;
mod util;
