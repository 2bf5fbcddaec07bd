// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The atlas pixel surface.

use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicU64, Ordering};

use super::{AtlasRegion, SkylineAllocator};
use crate::{Error, ErrorKind};

/// Side of the square region reserved for the opaque white block.
const WHITE_REGION_SIZE: u32 = 5;

/// Side of the opaque white block written into the reserved region.
const WHITE_BLOCK_SIZE: u32 = 4;

/// Default upper bound for atlas dimensions when growing.
pub const DEFAULT_MAX_ATLAS_SIZE: u32 = 8192;

/// How an atlas grows when a glyph does not fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Growth {
    /// Never grow automatically.
    None,
    /// Double both dimensions.
    #[default]
    Double,
    /// Add a fixed number of pixels to both dimensions.
    Step(u32),
}

/// Options for an [`Atlas`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Policy used by [`Atlas::grow_for`] when an allocation fails.
    pub growth: Growth,
    /// Automatic growth never exceeds this size in either dimension.
    pub max_size: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            growth: Growth::Double,
            max_size: DEFAULT_MAX_ATLAS_SIZE,
        }
    }
}

/// Unique identifier of an atlas.
///
/// Font instances remember the id of the atlas they pack into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtlasId(u64);

impl AtlasId {
    fn next() -> Self {
        static ID_COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying integer.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

/// A growable bitmap of `width × height × depth` bytes into which glyphs are packed.
///
/// A one pixel border is kept free around the whole surface. Regions returned by
/// [`allocate`](Self::allocate) keep their coordinates and contents when the atlas
/// grows; they are only invalidated by [`clear`](Self::clear).
pub struct Atlas {
    id: AtlasId,
    width: u32,
    height: u32,
    depth: u32,
    data: Vec<u8>,
    skyline: SkylineAllocator,
    config: AtlasConfig,
    /// Bumped whenever all regions are invalidated.
    generation: u32,
    white: AtlasRegion,
    /// Bounding box of pixels written since the last [`Atlas::take_dirty`].
    dirty: Option<AtlasRegion>,
}

impl Atlas {
    /// Creates an atlas with the default [`AtlasConfig`].
    ///
    /// `depth` is the number of bytes per pixel: 1 (gray), 3 (LCD subpixels) or 4 (RGBA).
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self, Error> {
        Self::with_config(width, height, depth, AtlasConfig::default())
    }

    /// Creates an atlas with the given options.
    pub fn with_config(
        width: u32,
        height: u32,
        depth: u32,
        config: AtlasConfig,
    ) -> Result<Self, Error> {
        if !matches!(depth, 1 | 3 | 4) {
            return Err(Error::new(ErrorKind::UnsupportedFormat)
                .with_detail(alloc::format!("atlas depth {depth}")));
        }
        if width < WHITE_REGION_SIZE + 2 || height < WHITE_REGION_SIZE + 2 {
            return Err(Error::invalid_size(width, height));
        }
        let mut atlas = Self {
            id: AtlasId::next(),
            width,
            height,
            depth,
            data: zeroed(width, height, depth)?,
            skyline: SkylineAllocator::new(width, height),
            config,
            generation: 0,
            white: AtlasRegion::default(),
            dirty: None,
        };
        atlas.reserve_white()?;
        log::debug!(
            "created atlas {:?} ({width}x{height}x{depth})",
            atlas.id
        );
        Ok(atlas)
    }

    fn reserve_white(&mut self) -> Result<(), Error> {
        let region = self
            .skyline
            .allocate(WHITE_REGION_SIZE, WHITE_REGION_SIZE)
            .ok_or_else(|| Error::atlas_full(WHITE_REGION_SIZE, WHITE_REGION_SIZE))?;
        let row = alloc::vec![0xFF_u8; (WHITE_BLOCK_SIZE * self.depth) as usize];
        self.set_region(
            AtlasRegion::new(region.x, region.y, WHITE_BLOCK_SIZE, WHITE_BLOCK_SIZE),
            &row,
            0,
        );
        self.white = region;
        Ok(())
    }

    /// The identifier of this atlas.
    pub fn id(&self) -> AtlasId {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The raw pixel data, row-major with a stride of `width * depth` bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The packing state.
    pub fn skyline(&self) -> &SkylineAllocator {
        &self.skyline
    }

    /// The options this atlas was created with.
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Incremented every time the atlas is cleared.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Total area of allocated regions, including the reserved white region.
    pub fn used(&self) -> u64 {
        self.skyline.used()
    }

    /// The reserved region whose top-left 4×4 pixels are opaque white.
    pub fn white_region(&self) -> AtlasRegion {
        self.white
    }

    /// Allocates a `width × height` region.
    ///
    /// Returns `None` if the atlas has no room; the caller may [`grow`](Self::grow) it and
    /// try again.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<AtlasRegion> {
        self.skyline.allocate(width, height)
    }

    /// Copies pixel rows into `region`.
    ///
    /// `data` holds `region.height` rows of `region.width * depth` bytes, each starting
    /// `stride` bytes after the previous one. A stride of zero repeats the first row.
    ///
    /// # Panics
    ///
    /// Panics if the region is outside the atlas or `data` is too short.
    pub fn set_region(&mut self, region: AtlasRegion, data: &[u8], stride: usize) {
        assert!(
            region.right() <= self.width && region.bottom() <= self.height,
            "region {region:?} outside of {}x{} atlas",
            self.width,
            self.height
        );
        if region.is_empty() {
            return;
        }
        let depth = self.depth as usize;
        let row_len = region.width as usize * depth;
        let atlas_stride = self.width as usize * depth;
        let needed = (region.height as usize - 1) * stride + row_len;
        assert!(
            data.len() >= needed,
            "pixel data too short: {} bytes, need {needed}",
            data.len()
        );
        for row in 0..region.height as usize {
            let src = row * stride;
            let dst = (region.y as usize + row) * atlas_stride + region.x as usize * depth;
            self.data[dst..dst + row_len].copy_from_slice(&data[src..src + row_len]);
        }
        self.mark_dirty(region);
    }

    /// Reads back the pixels of `region`, tightly packed.
    ///
    /// # Panics
    ///
    /// Panics if the region is outside the atlas.
    pub fn region_pixels(&self, region: AtlasRegion) -> Vec<u8> {
        assert!(
            region.right() <= self.width && region.bottom() <= self.height,
            "region {region:?} outside of {}x{} atlas",
            self.width,
            self.height
        );
        let depth = self.depth as usize;
        let row_len = region.width as usize * depth;
        let atlas_stride = self.width as usize * depth;
        let mut out = Vec::with_capacity(row_len * region.height as usize);
        for row in 0..region.height as usize {
            let start = (region.y as usize + row) * atlas_stride + region.x as usize * depth;
            out.extend_from_slice(&self.data[start..start + row_len]);
        }
        out
    }

    /// Grows the atlas to `width × height`.
    ///
    /// Both dimensions must be at least the current ones and one of them must increase.
    /// Pixel data is copied to the same origin in the new buffer, so every region
    /// allocated so far keeps its coordinates and contents.
    pub fn grow(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width < self.width
            || height < self.height
            || (width == self.width && height == self.height)
        {
            return Err(Error::invalid_size(width, height).with_detail(alloc::format!(
                "atlas is {}x{} and can only grow",
                self.width,
                self.height
            )));
        }
        let mut data = zeroed(width, height, self.depth)?;
        let depth = self.depth as usize;
        let old_stride = self.width as usize * depth;
        let new_stride = width as usize * depth;
        for (row, src) in self.data.chunks_exact(old_stride).enumerate() {
            let dst = row * new_stride;
            data[dst..dst + old_stride].copy_from_slice(src);
        }
        log::debug!(
            "growing atlas {:?} from {}x{} to {width}x{height}",
            self.id,
            self.width,
            self.height
        );
        self.data = data;
        self.skyline.grow(width, height);
        self.width = width;
        self.height = height;
        self.dirty = Some(AtlasRegion::new(0, 0, width, height));
        Ok(())
    }

    /// Grows the atlas once according to its [`Growth`] policy.
    ///
    /// Returns `Ok(false)` if the policy or the maximum size does not allow growing.
    pub fn grow_for(&mut self) -> Result<bool, Error> {
        let max = self.config.max_size.max(self.width).max(self.height);
        let (width, height) = match self.config.growth {
            Growth::None => return Ok(false),
            Growth::Double => (
                self.width.saturating_mul(2).min(max),
                self.height.saturating_mul(2).min(max),
            ),
            Growth::Step(step) => (
                self.width.saturating_add(step).min(max),
                self.height.saturating_add(step).min(max),
            ),
        };
        if width == self.width && height == self.height {
            return Ok(false);
        }
        self.grow(width, height)?;
        Ok(true)
    }

    /// Removes all allocations and zeroes the pixels.
    ///
    /// Every region handed out so far becomes invalid; the generation counter is bumped
    /// so that font instances can drop their cached glyphs.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.skyline.clear();
        self.generation = self.generation.wrapping_add(1);
        self.dirty = Some(AtlasRegion::new(0, 0, self.width, self.height));
        // Cannot fail: the atlas was large enough for it when created.
        if self.reserve_white().is_err() {
            log::warn!("atlas {:?} has no room for the white region", self.id);
        }
        log::debug!("cleared atlas {:?}", self.id);
    }

    /// Returns and resets the bounding box of pixels modified since the last call.
    ///
    /// After growth or clearing this is the whole atlas.
    pub fn take_dirty(&mut self) -> Option<AtlasRegion> {
        self.dirty.take()
    }

    fn mark_dirty(&mut self, region: AtlasRegion) {
        self.dirty = Some(match self.dirty {
            None => region,
            Some(d) => {
                let x = d.x.min(region.x);
                let y = d.y.min(region.y);
                AtlasRegion::new(
                    x,
                    y,
                    d.right().max(region.right()) - x,
                    d.bottom().max(region.bottom()) - y,
                )
            }
        });
    }
}

/// Allocates a zeroed pixel buffer, reporting allocation failure instead of aborting.
fn zeroed(width: u32, height: u32, depth: u32) -> Result<Vec<u8>, Error> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(depth as usize))
        .ok_or_else(|| Error::out_of_memory(width, height))?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::out_of_memory(width, height))?;
    data.resize(len, 0);
    Ok(data)
}

impl Debug for Atlas {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Atlas")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .field("generation", &self.generation)
            .field("used", &self.skyline.used())
            .finish_non_exhaustive()
    }
}
