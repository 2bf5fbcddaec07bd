// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signed distance fields and distance based stroking of coverage bitmaps.
//!
//! Distances are computed with the separable exact Euclidean distance transform of
//! Felzenszwalb and Huttenlocher, on the pixels at or above half coverage.

use alloc::vec;
use alloc::vec::Vec;

use crate::math::{ceil, sqrt};
use crate::{GlyphBitmap, PixelFormat, RenderMode};

/// Stand-in for infinity that keeps the parabola arithmetic finite.
const FAR: f32 = 1e20;

/// Coverage at or above which a pixel counts as inside the glyph.
const INSIDE: u8 = 128;

/// Squared distance from every pixel to the nearest pixel for which `feature` is true.
fn squared_distances(width: usize, height: usize, feature: impl Fn(usize) -> bool) -> Vec<f32> {
    let mut grid: Vec<f32> = (0..width * height)
        .map(|i| if feature(i) { 0.0 } else { FAR })
        .collect();
    let n = width.max(height);
    let mut line = vec![0.0; n];
    let mut out = vec![0.0; n];
    let mut hull = vec![0_usize; n];
    let mut bounds = vec![0.0; n + 1];

    for x in 0..width {
        for y in 0..height {
            line[y] = grid[y * width + x];
        }
        transform_line(&line[..height], &mut out, &mut hull, &mut bounds);
        for y in 0..height {
            grid[y * width + x] = out[y];
        }
    }
    for y in 0..height {
        let row = &mut grid[y * width..(y + 1) * width];
        line[..width].copy_from_slice(row);
        transform_line(&line[..width], &mut out, &mut hull, &mut bounds);
        row.copy_from_slice(&out[..width]);
    }
    grid
}

/// One dimensional squared distance transform of the sampled function `f`.
fn transform_line(f: &[f32], out: &mut [f32], hull: &mut [usize], bounds: &mut [f32]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0;
    hull[0] = 0;
    bounds[0] = f32::NEG_INFINITY;
    bounds[1] = f32::INFINITY;
    for q in 1..n {
        let qf = q as f32;
        let mut s;
        loop {
            let v = hull[k];
            let vf = v as f32;
            s = ((f[q] + qf * qf) - (f[v] + vf * vf)) / (2.0 * qf - 2.0 * vf);
            if s <= bounds[k] && k > 0 {
                k -= 1;
            } else {
                break;
            }
        }
        k += 1;
        hull[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f32::INFINITY;
    }
    k = 0;
    for (q, d) in out.iter_mut().enumerate().take(n) {
        let qf = q as f32;
        while bounds[k + 1] < qf {
            k += 1;
        }
        let v = hull[k];
        let dx = qf - v as f32;
        *d = dx * dx + f[v];
    }
}

/// Signed distance in pixels from each pixel centre to the glyph edge, negative inside.
fn signed_distances(gray: &[u8], width: usize, height: usize) -> Vec<f32> {
    let to_inside = squared_distances(width, height, |i| gray[i] >= INSIDE);
    let to_outside = squared_distances(width, height, |i| gray[i] < INSIDE);
    to_inside
        .iter()
        .zip(&to_outside)
        .map(|(&din, &dout)| {
            // The edge sits half a pixel from the centre of the nearest pixel across it.
            if din > 0.0 {
                sqrt(din) - 0.5
            } else {
                0.5 - sqrt(dout)
            }
        })
        .collect()
}

/// Converts a coverage bitmap into a signed distance field of the same size.
///
/// The signed distance `d` is clamped to `[-m, m]`, where `m` is the largest distance
/// found inside the glyph, and mapped to `255 - 255 * (d + m) / 2m`. The result is 255
/// deep inside the glyph, 127 on its edge and falls to 0 away from it.
///
/// # Panics
///
/// Panics if `gray` holds fewer than `width * height` bytes.
pub fn distance_map(gray: &[u8], width: u32, height: u32) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    assert!(gray.len() >= w * h, "coverage bitmap too short");
    let gray = &gray[..w * h];
    if !gray.iter().any(|&v| v >= INSIDE) {
        return vec![0; w * h];
    }
    if gray.iter().all(|&v| v >= INSIDE) {
        return vec![255; w * h];
    }
    let distances = signed_distances(gray, w, h);
    let m = distances.iter().fold(0.0_f32, |m, &d| m.min(d)).abs();
    if m == 0.0 {
        return vec![0; w * h];
    }
    distances
        .iter()
        .map(|&d| {
            let v = (d.clamp(-m, m) + m) / (2.0 * m);
            to_byte(255.0 - v * 255.0)
        })
        .collect()
}

/// Derives an outline variant from a grayscale glyph bitmap.
///
/// The result is grown by enough pixels on every side to hold the stroke, with the
/// bearings adjusted to match. [`RenderMode::OutlineEdge`] draws a band of
/// `thickness` pixels on both sides of the edge, [`RenderMode::OutlinePositive`] grows
/// the glyph outwards by `thickness` and [`RenderMode::OutlineNegative`] shrinks it by
/// `thickness`. Other modes return the bitmap unchanged.
pub fn stroke(bitmap: &GlyphBitmap, mode: RenderMode, thickness: f32) -> GlyphBitmap {
    if !mode.is_outline() || bitmap.format != PixelFormat::Gray {
        return bitmap.clone();
    }
    let thickness = thickness.max(0.0);
    #[expect(
        clippy::cast_possible_truncation,
        reason = "outline thicknesses are a few pixels"
    )]
    let margin = ceil(thickness) as u32 + 1;
    let width = bitmap.width + 2 * margin;
    let height = bitmap.height + 2 * margin;
    let (w, m) = (width as usize, margin as usize);

    let mut padded = vec![0_u8; w * height as usize];
    for (y, row) in bitmap.rows().enumerate() {
        let start = (y + m) * w + m;
        padded[start..start + row.len()].copy_from_slice(row);
    }

    let distances = signed_distances(&padded, w, height as usize);
    let data = distances
        .iter()
        .map(|&d| {
            let reach = match mode {
                RenderMode::OutlineEdge => thickness - d.abs(),
                RenderMode::OutlinePositive => thickness - d,
                _ => -thickness - d,
            };
            coverage(reach + 0.5)
        })
        .collect();

    let shift = margin as i32;
    GlyphBitmap {
        width,
        height,
        pitch: w,
        left: bitmap.left - shift,
        top: bitmap.top + shift,
        format: PixelFormat::Gray,
        data,
    }
}

fn coverage(v: f32) -> u8 {
    to_byte(v.clamp(0.0, 1.0) * 255.0 + 0.5)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "callers keep the value within the byte range"
)]
fn to_byte(v: f32) -> u8 {
    v as u8
}
