// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skyline rectangle packing.

use alloc::vec;
use alloc::vec::Vec;

use super::AtlasRegion;

/// A horizontal segment of the skyline.
///
/// Every column in `x..x + width` is free from row `y` down to the bottom border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkylineNode {
    /// First column of the segment.
    pub x: u32,
    /// Lowest unused row in the segment.
    pub y: u32,
    /// Number of columns in the segment.
    pub width: u32,
}

/// Skyline bin-packing allocator for a surface with a one pixel border.
///
/// Nodes are kept sorted by `x` and together span the columns between the left and
/// right border. New rectangles go where they add the least height to the skyline.
#[derive(Clone, Debug)]
pub struct SkylineAllocator {
    width: u32,
    height: u32,
    nodes: Vec<SkylineNode>,
    used: u64,
}

impl SkylineAllocator {
    /// Creates an allocator for a surface of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            nodes: vec![Self::initial_node(width)],
            used: 0,
        }
    }

    fn initial_node(width: u32) -> SkylineNode {
        SkylineNode {
            x: 1,
            y: 1,
            width: width.saturating_sub(2),
        }
    }

    /// Surface width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The current skyline segments, ordered by `x`.
    pub fn nodes(&self) -> &[SkylineNode] {
        &self.nodes
    }

    /// Total area of all allocated regions.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Finds room for a `width × height` rectangle.
    ///
    /// Returns `None` if no segment can host the rectangle inside the border.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<AtlasRegion> {
        if width == 0 || height == 0 {
            return Some(AtlasRegion::new(0, 0, width, height));
        }

        // (bottom, y, node width, index)
        let mut best: Option<(u32, u32, u32, usize)> = None;
        for index in 0..self.nodes.len() {
            let Some(y) = self.fit(index, width, height) else {
                continue;
            };
            let node_width = self.nodes[index].width;
            let candidate = (y + height, y, node_width, index);
            if best.is_none_or(|b| (candidate.0, candidate.1, candidate.2) < (b.0, b.1, b.2)) {
                best = Some(candidate);
            }
        }

        let (_, y, _, index) = best?;
        let x = self.nodes[index].x;
        self.nodes.insert(
            index,
            SkylineNode {
                x,
                y: y + height,
                width,
            },
        );

        // Shrink or remove the segments now covered by the new one.
        let i = index + 1;
        while i < self.nodes.len() {
            let prev = self.nodes[i - 1];
            let prev_right = prev.x + prev.width;
            let node = &mut self.nodes[i];
            if node.x >= prev_right {
                break;
            }
            let shrink = prev_right - node.x;
            if node.width <= shrink {
                self.nodes.remove(i);
            } else {
                node.x += shrink;
                node.width -= shrink;
                break;
            }
        }

        self.merge();
        self.used += u64::from(width) * u64::from(height);
        Some(AtlasRegion::new(x, y, width, height))
    }

    /// Returns the row at which a rectangle starting at node `index` would sit.
    fn fit(&self, index: usize, width: u32, height: u32) -> Option<u32> {
        let node = self.nodes[index];
        if node.x + width > self.width.saturating_sub(1) {
            return None;
        }
        let mut y = node.y;
        let mut width_left = width;
        let mut i = index;
        while width_left > 0 {
            let node = self.nodes.get(i)?;
            y = y.max(node.y);
            if y + height > self.height.saturating_sub(1) {
                return None;
            }
            width_left = width_left.saturating_sub(node.width);
            i += 1;
        }
        Some(y)
    }

    /// Joins neighbouring segments at the same height.
    fn merge(&mut self) {
        let mut i = 0;
        while i + 1 < self.nodes.len() {
            if self.nodes[i].y == self.nodes[i + 1].y {
                self.nodes[i].width += self.nodes[i + 1].width;
                self.nodes.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    /// Extends the packing area to a larger surface.
    ///
    /// Existing segments keep their positions; space below them becomes usable through
    /// the larger height, and the gained strip on the right is added as one new segment.
    /// The old right border column becomes part of that strip.
    pub(crate) fn grow(&mut self, width: u32, height: u32) {
        debug_assert!(
            width >= self.width && height >= self.height,
            "skyline can only grow"
        );
        if width > self.width {
            self.nodes.push(SkylineNode {
                x: self.width - 1,
                y: 1,
                width: width - self.width,
            });
        }
        self.width = width;
        self.height = height;
    }

    /// Forgets all allocations.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Self::initial_node(self.width));
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint(regions: &[AtlasRegion]) {
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn first_allocation_respects_border() {
        let mut skyline = SkylineAllocator::new(64, 64);
        let region = skyline.allocate(10, 10).unwrap();
        assert_eq!(region, AtlasRegion::new(1, 1, 10, 10));
        let next = skyline.allocate(10, 10).unwrap();
        assert_eq!(next, AtlasRegion::new(11, 1, 10, 10));
    }

    #[test]
    fn fills_up_and_reports_full() {
        let mut skyline = SkylineAllocator::new(16, 16);
        assert_eq!(
            skyline.allocate(14, 14),
            Some(AtlasRegion::new(1, 1, 14, 14))
        );
        assert_eq!(skyline.allocate(1, 1), None);
        assert_eq!(skyline.used(), 196);
    }

    #[test]
    fn too_large_fails() {
        let mut skyline = SkylineAllocator::new(64, 64);
        assert_eq!(skyline.allocate(63, 1), None);
        assert_eq!(skyline.allocate(1, 63), None);
        assert!(skyline.allocate(62, 62).is_some());
    }

    #[test]
    fn prefers_lowest_resulting_height() {
        let mut skyline = SkylineAllocator::new(32, 64);
        let tall = skyline.allocate(10, 20).unwrap();
        let short = skyline.allocate(10, 5).unwrap();
        assert_eq!(tall.y, 1);
        assert_eq!(short, AtlasRegion::new(11, 1, 10, 5));
        let beside = skyline.allocate(10, 5).unwrap();
        assert_eq!(beside, AtlasRegion::new(21, 1, 10, 5));
        // Stacks on the two short ones rather than the tall one.
        let next = skyline.allocate(10, 5).unwrap();
        assert_eq!(next, AtlasRegion::new(11, 6, 10, 5));
    }

    #[test]
    fn many_allocations_never_overlap() {
        let mut skyline = SkylineAllocator::new(128, 128);
        let mut regions = Vec::new();
        let mut seed = 7_u32;
        loop {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let w = 1 + (seed >> 16) % 17;
            let h = 1 + (seed >> 8) % 13;
            match skyline.allocate(w, h) {
                Some(region) => {
                    assert!(region.x >= 1 && region.y >= 1, "{region:?} inside border");
                    assert!(region.right() <= 127 && region.bottom() <= 127);
                    regions.push(region);
                }
                None => break,
            }
        }
        assert!(regions.len() > 20, "only {} regions fit", regions.len());
        assert_disjoint(&regions);
    }

    #[test]
    fn nodes_stay_sorted_and_cover_width() {
        let mut skyline = SkylineAllocator::new(100, 100);
        for (w, h) in [(30, 4), (10, 9), (25, 2), (30, 4), (7, 7), (40, 3)] {
            skyline.allocate(w, h).unwrap();
            let nodes = skyline.nodes();
            assert_eq!(nodes[0].x, 1);
            for pair in nodes.windows(2) {
                assert_eq!(pair[0].x + pair[0].width, pair[1].x);
                assert_ne!(pair[0].y, pair[1].y, "equal heights should be merged");
            }
            let last = nodes.last().unwrap();
            assert_eq!(last.x + last.width, 99);
        }
    }

    #[test]
    fn wide_region_swallows_covered_segments() {
        let mut skyline = SkylineAllocator::new(32, 64);
        let mut regions = vec![
            skyline.allocate(10, 5).unwrap(),
            skyline.allocate(10, 8).unwrap(),
            skyline.allocate(10, 3).unwrap(),
        ];
        let wide = skyline.allocate(25, 2).unwrap();
        assert_eq!(wide, AtlasRegion::new(1, 9, 25, 2));
        assert_eq!(
            skyline.nodes(),
            [
                SkylineNode {
                    x: 1,
                    y: 11,
                    width: 25
                },
                SkylineNode {
                    x: 26,
                    y: 4,
                    width: 5
                },
            ]
        );
        regions.push(wide);
        assert_disjoint(&regions);
    }

    #[test]
    fn grow_adds_right_strip() {
        let mut skyline = SkylineAllocator::new(16, 16);
        let first = skyline.allocate(14, 14).unwrap();
        assert!(skyline.allocate(10, 10).is_none());

        skyline.grow(32, 32);
        assert_eq!(
            skyline.nodes().last(),
            Some(&SkylineNode {
                x: 15,
                y: 1,
                width: 16
            })
        );
        let second = skyline.allocate(16, 30).unwrap();
        assert_eq!(second, AtlasRegion::new(15, 1, 16, 30));
        // Below the first region is usable too now.
        let third = skyline.allocate(14, 14).unwrap();
        assert_eq!(third, AtlasRegion::new(1, 15, 14, 14));
        assert_disjoint(&[first, second, third]);
    }

    #[test]
    fn clear_resets_packing() {
        let mut skyline = SkylineAllocator::new(16, 16);
        skyline.allocate(14, 14).unwrap();
        skyline.clear();
        assert_eq!(skyline.used(), 0);
        assert_eq!(
            skyline.allocate(14, 14),
            Some(AtlasRegion::new(1, 1, 14, 14))
        );
    }
}
