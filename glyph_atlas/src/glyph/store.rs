// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse codepoint index over an arena of glyph records.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::{GlyphRecord, Variant};
use crate::NO_CHARACTER;

/// Number of slots in a second level page.
const PAGE_SIZE: usize = 256;

/// Codepoints above this go to the overflow map rather than the paged index.
const MAX_PAGED_CODEPOINT: u32 = 0x10_FFFF;

/// Stable handle of a record in a [`GlyphStore`].
///
/// Handles stay valid across insertions of further glyphs and variants. They are
/// invalidated by [`GlyphStore::clear`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphId(u32);

impl GlyphId {
    /// Returns the arena index of this handle.
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// The records cached for one codepoint, one per variant, in insertion order.
type Chain = SmallVec<[GlyphId; 1]>;

/// One second level table, indexed by the low byte of the codepoint.
type Page = [Chain; PAGE_SIZE];

/// Result of [`GlyphStore::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Handle of the inserted record.
    pub id: GlyphId,
    /// The codepoint already had records for other variants; the new one was appended.
    pub appended: bool,
    /// A record with the same variant existed and was overwritten in place.
    pub replaced: bool,
}

/// Per-font cache of glyph records.
///
/// Records live in an arena addressed by [`GlyphId`]. Lookup goes through a two level
/// table: the top level is indexed by `codepoint >> 8` and only allocates a 256 slot page
/// for ranges that are in use. Each slot holds the variant chain of one codepoint.
/// The [`NO_CHARACTER`] codepoint has a dedicated chain outside the index.
#[derive(Clone, Default)]
pub struct GlyphStore {
    records: Vec<GlyphRecord>,
    pages: Vec<Option<Box<Page>>>,
    special: Chain,
    overflow: HashMap<u32, Chain>,
}

impl GlyphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached records, counting each variant.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of allocated second level pages.
    pub fn page_count(&self) -> usize {
        self.pages.iter().filter(|page| page.is_some()).count()
    }

    fn chain(&self, codepoint: u32) -> Option<&Chain> {
        if codepoint == NO_CHARACTER {
            return Some(&self.special);
        }
        if codepoint > MAX_PAGED_CODEPOINT {
            return self.overflow.get(&codepoint);
        }
        let page = self.pages.get((codepoint >> 8) as usize)?.as_ref()?;
        Some(&page[(codepoint & 0xFF) as usize])
    }

    fn chain_mut(&mut self, codepoint: u32) -> &mut Chain {
        if codepoint == NO_CHARACTER {
            return &mut self.special;
        }
        if codepoint > MAX_PAGED_CODEPOINT {
            return self.overflow.entry(codepoint).or_default();
        }
        let index = (codepoint >> 8) as usize;
        if self.pages.len() <= index {
            self.pages.resize_with(index + 1, || None);
        }
        let page = self.pages[index]
            .get_or_insert_with(|| Box::new(core::array::from_fn(|_| Chain::new())));
        &mut page[(codepoint & 0xFF) as usize]
    }

    /// Returns the handle of the record for `codepoint` rendered as `variant`.
    pub fn find_id(&self, codepoint: u32, variant: Variant) -> Option<GlyphId> {
        self.chain(codepoint)?
            .iter()
            .copied()
            .find(|id| self.records[id.0 as usize].variant == variant)
    }

    /// Returns the record for `codepoint` rendered as `variant`.
    pub fn find(&self, codepoint: u32, variant: Variant) -> Option<&GlyphRecord> {
        self.find_id(codepoint, variant).and_then(|id| self.get(id))
    }

    /// Returns `true` if `codepoint` is cached as `variant`.
    pub fn contains(&self, codepoint: u32, variant: Variant) -> bool {
        self.find_id(codepoint, variant).is_some()
    }

    /// Returns the record behind a handle.
    pub fn get(&self, id: GlyphId) -> Option<&GlyphRecord> {
        self.records.get(id.0 as usize)
    }

    /// Iterates over all variants cached for `codepoint`, in insertion order.
    pub fn variants(&self, codepoint: u32) -> impl Iterator<Item = &GlyphRecord> + '_ {
        self.chain(codepoint)
            .into_iter()
            .flatten()
            .map(|id| &self.records[id.0 as usize])
    }

    /// Iterates over all records with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId, &GlyphRecord)> + '_ {
        (0_u32..).zip(&self.records).map(|(i, record)| (GlyphId(i), record))
    }

    /// Iterates over the distinct codepoints with at least one cached record.
    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        let special = (!self.special.is_empty()).then_some(NO_CHARACTER);
        let paged = self
            .pages
            .iter()
            .zip(0_u32..)
            .filter_map(|(page, hi)| Some((page.as_ref()?, hi)))
            .flat_map(|(page, hi)| {
                page.iter()
                    .zip(0_u32..)
                    .filter(|(chain, _)| !chain.is_empty())
                    .map(move |(_, lo)| (hi << 8) | lo)
            });
        paged
            .chain(self.overflow.keys().copied())
            .chain(special)
    }

    /// Stores `record` under its codepoint.
    ///
    /// A record with a new variant is appended to the codepoint's chain; a record with
    /// an already cached variant overwrites it, keeping its handle.
    pub fn insert(&mut self, record: GlyphRecord) -> InsertOutcome {
        if let Some(id) = self.find_id(record.codepoint, record.variant) {
            self.records[id.0 as usize] = record;
            return InsertOutcome {
                id,
                appended: false,
                replaced: true,
            };
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "a font never caches anywhere near u32::MAX glyphs"
        )]
        let next = GlyphId(self.records.len() as u32);
        let chain = self.chain_mut(record.codepoint);
        let existing = chain.len();
        chain.push(next);
        self.records.push(record);
        log::trace!(
            "cached glyph {:#x} ({:?}) as {next:?}",
            record.codepoint,
            record.variant
        );
        InsertOutcome {
            id: next,
            appended: existing > 0,
            replaced: false,
        }
    }

    /// Removes every record and releases the index pages.
    pub fn clear(&mut self) {
        self.records.clear();
        self.pages.clear();
        self.special.clear();
        self.overflow.clear();
    }
}

impl Debug for GlyphStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphStore")
            .field("records", &self.records.len())
            .field("pages", &self.page_count())
            .field("special", &self.special.len())
            .finish_non_exhaustive()
    }
}
