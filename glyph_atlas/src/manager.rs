// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font context, one atlas and the fonts packed into it.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

#[cfg(feature = "std")]
use std::path::Path;

use crate::font::SourceKey;
use crate::{
    Atlas, Error, ErrorKind, FaceSettings, FontContext, FontData, FontInstance, FontSource,
    LoadReport,
};

/// Handle of a font owned by a [`FontManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(u32);

impl FontId {
    /// Returns the underlying integer.
    pub fn to_u32(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns a [`FontContext`], a single [`Atlas`] and every font packed into it.
///
/// Asking twice for the same source at the same size returns the same [`FontId`]. Every
/// new font has the manager's cache string loaded into the atlas before it is returned.
pub struct FontManager {
    context: FontContext,
    atlas: Atlas,
    fonts: Vec<Option<FontInstance>>,
    keys: HashMap<(SourceKey, u32), FontId>,
    cache: String,
}

impl FontManager {
    /// Creates a manager with an empty font list and the cache string `" "`.
    pub fn new(context: FontContext, atlas: Atlas) -> Self {
        Self {
            context,
            atlas,
            fonts: Vec::new(),
            keys: HashMap::new(),
            cache: String::from(" "),
        }
    }

    /// The shared atlas.
    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    /// The shared atlas, for uploading or clearing it.
    pub fn atlas_mut(&mut self) -> &mut Atlas {
        &mut self.atlas
    }

    /// The context fonts are created from.
    pub fn context(&self) -> &FontContext {
        &self.context
    }

    /// Text whose glyphs are loaded into every new font.
    pub fn cache(&self) -> &str {
        &self.cache
    }

    /// Changes the text loaded into fonts created from now on.
    pub fn set_cache(&mut self, cache: impl Into<String>) {
        self.cache = cache.into();
    }

    /// Returns the font for a file at a size, creating it if needed.
    #[cfg(feature = "std")]
    pub fn font_from_file(
        &mut self,
        path: impl AsRef<Path>,
        size: f32,
        language: &str,
    ) -> Result<FontId, Error> {
        self.font_from_source(
            FontSource::from(path.as_ref()),
            FaceSettings::new(size),
            language,
        )
    }

    /// Returns the font for in-memory data at a size, creating it if needed.
    pub fn font_from_memory(
        &mut self,
        data: FontData,
        size: f32,
        language: &str,
    ) -> Result<FontId, Error> {
        self.font_from_source(FontSource::Memory(data), FaceSettings::new(size), language)
    }

    /// Returns the font for a source and settings, creating it if needed.
    ///
    /// Fonts are told apart by their source and size only.
    pub fn font_from_source(
        &mut self,
        source: FontSource,
        settings: FaceSettings,
        language: &str,
    ) -> Result<FontId, Error> {
        let key = (source.key(), settings.size.to_bits());
        if let Some(&id) = self.keys.get(&key) {
            return Ok(id);
        }

        let mut font = self
            .context
            .font_from_source(&self.atlas, source, settings, language)?;
        if !self.cache.is_empty() {
            match font.ensure_glyphs(&mut self.atlas, &self.cache) {
                Ok(report) if !report.is_complete() => log::warn!(
                    "{} of the cached glyphs could not be loaded for {:?}",
                    report.missing,
                    font.source()
                ),
                Ok(_) => {}
                Err(err) => log::warn!("cannot preload glyphs for {:?}: {err}", font.source()),
            }
        }

        let id = self.push(font)?;
        self.keys.insert(key, id);
        Ok(id)
    }

    fn push(&mut self, font: FontInstance) -> Result<FontId, Error> {
        let slot = match self.fonts.iter().position(Option::is_none) {
            Some(slot) => {
                self.fonts[slot] = Some(font);
                slot
            }
            None => {
                self.fonts.push(Some(font));
                self.fonts.len() - 1
            }
        };
        u32::try_from(slot)
            .map(FontId)
            .map_err(|_| Error::new(ErrorKind::OutOfMemory).with_detail("too many fonts"))
    }

    /// The font with the given id, if it was not deleted.
    pub fn font(&self, id: FontId) -> Option<&FontInstance> {
        self.fonts.get(id.index())?.as_ref()
    }

    /// The font with the given id, for changing its variant or shaping options.
    pub fn font_mut(&mut self, id: FontId) -> Option<&mut FontInstance> {
        self.fonts.get_mut(id.index())?.as_mut()
    }

    /// Loads the glyphs of `text` for a font into the shared atlas.
    ///
    /// Fails with [`ErrorKind::CannotLoadFont`] if the font was deleted.
    pub fn ensure_glyphs(&mut self, id: FontId, text: &str) -> Result<LoadReport, Error> {
        let Some(font) = self.fonts.get_mut(id.index()).and_then(Option::as_mut) else {
            return Err(Error::cannot_load_font(alloc::format!(
                "no font with id {}",
                id.0
            )));
        };
        font.ensure_glyphs(&mut self.atlas, text)
    }

    /// Drops a font. Its glyphs stay in the atlas until it is cleared.
    ///
    /// Returns `false` if there was no such font.
    pub fn delete_font(&mut self, id: FontId) -> bool {
        let Some(font) = self.fonts.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };
        self.keys.retain(|_, &mut other| other != id);
        log::debug!("deleted font {:?} at {}pt", font.source(), font.size());
        true
    }

    /// Iterates over the live fonts.
    pub fn fonts(&self) -> impl Iterator<Item = (FontId, &FontInstance)> + '_ {
        (0_u32..)
            .zip(&self.fonts)
            .filter_map(|(id, font)| Some((FontId(id), font.as_ref()?)))
    }
}

impl core::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontManager")
            .field("context", &self.context)
            .field("atlas", &self.atlas)
            .field("fonts", &self.fonts().count())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
