// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::math::round;
use crate::FaceMetrics;

/// Line metrics of a font instance, in pixels, y up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the tallest glyphs.
    pub ascender: f32,
    /// Distance from the baseline to the bottom of the lowest glyphs, usually negative.
    pub descender: f32,
    /// Baseline to baseline distance.
    pub height: f32,
    /// Extra spacing between lines: `height - ascender + descender`.
    pub linegap: f32,
    /// Underline offset from the baseline, rounded and at most `-2`.
    pub underline_position: f32,
    /// Underline thickness, rounded and at least `1`.
    pub underline_thickness: f32,
}

impl FontMetrics {
    /// Derives line metrics from the metrics reported by a face.
    pub fn from_face(face: &FaceMetrics) -> Self {
        let underline_position = round(face.underline_position).min(-2.0);
        let underline_thickness = round(face.underline_thickness).max(1.0);
        Self {
            ascender: face.ascender,
            descender: face.descender,
            height: face.height,
            linegap: face.height - face.ascender + face.descender,
            underline_position,
            underline_thickness,
        }
    }
}
