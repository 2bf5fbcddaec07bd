// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font data and where it comes from.

use alloc::sync::Arc;
use alloc::vec::Vec;
use linebender_resource_handle::Blob;

use crate::Error;

#[cfg(feature = "std")]
use std::path::Path;

/// Shared, immutable font file contents.
///
/// Cloning is cheap; every clone refers to the same bytes and has the same [`id`](Self::id).
#[derive(Clone)]
pub struct FontData {
    blob: Blob<u8>,
}

impl FontData {
    /// Takes ownership of font file contents.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            blob: Blob::new(Arc::new(data)),
        }
    }

    /// Wraps an existing blob.
    pub fn from_blob(blob: Blob<u8>) -> Self {
        Self { blob }
    }

    /// The font file contents.
    pub fn data(&self) -> &[u8] {
        self.blob.data()
    }

    /// The underlying blob.
    pub fn blob(&self) -> &Blob<u8> {
        &self.blob
    }

    /// An identifier shared by all clones of this data.
    pub fn id(&self) -> u64 {
        self.blob.id()
    }
}

impl PartialEq for FontData {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for FontData {}

impl core::fmt::Debug for FontData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FontData({} bytes, id {})", self.data().len(), self.id())
    }
}

/// Where a font instance gets its data from.
#[derive(Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Data already in memory.
    Memory(FontData),
    #[cfg(feature = "std")]
    /// A font file, read when the instance is created.
    Path(Arc<Path>),
}

impl FontSource {
    /// Returns the font data, reading the file for path sources.
    pub fn load(&self) -> Result<FontData, Error> {
        match self {
            Self::Memory(data) => Ok(data.clone()),
            #[cfg(feature = "std")]
            Self::Path(path) => std::fs::read(path).map(FontData::new).map_err(|err| {
                Error::cannot_load_font(alloc::format!("{}: {err}", path.display()))
            }),
        }
    }

    /// A hashable key identifying the source.
    pub(crate) fn key(&self) -> SourceKey {
        match self {
            Self::Memory(data) => SourceKey::Memory(data.id()),
            #[cfg(feature = "std")]
            Self::Path(path) => SourceKey::Path(path.clone()),
        }
    }
}

impl core::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Memory(data) => write!(f, "Memory({data:?})"),
            #[cfg(feature = "std")]
            Self::Path(path) => write!(f, "Path({path:?})"),
        }
    }
}

#[cfg(feature = "std")]
impl From<&Path> for FontSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.into())
    }
}

impl From<FontData> for FontSource {
    fn from(data: FontData) -> Self {
        Self::Memory(data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SourceKey {
    Memory(u64),
    #[cfg(feature = "std")]
    Path(Arc<Path>),
}
