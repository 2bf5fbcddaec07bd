// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating point helpers that work with either `std` or `libm`.

#[cfg(all(not(feature = "std"), feature = "libm"))]
use core_maths::CoreFloat as _;

#[inline(always)]
pub(crate) fn sqrt(v: f32) -> f32 {
    v.sqrt()
}

#[inline(always)]
pub(crate) fn round(v: f32) -> f32 {
    v.round()
}

#[inline(always)]
pub(crate) fn ceil(v: f32) -> f32 {
    v.ceil()
}
