// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use super::context::Library;
use super::{FaceMode, FaceSettings, FaceState, FontData, FontMetrics, FontSource};
use crate::{
    Atlas, AtlasId, AtlasRegion, Direction, Error, ErrorKind, Face, GlyphRecord, GlyphStore,
    RenderMode, ShapeOptions, ShapedGlyph, Variant, NO_CHARACTER,
};

/// Which atlas an instance packs into, and which of its generations the cache matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AtlasBinding {
    pub(crate) id: AtlasId,
    pub(crate) generation: u32,
}

/// One font source at one size, with its glyph cache.
///
/// An instance packs glyphs into the atlas it was created with; passing another atlas
/// fails with [`ErrorKind::AtlasMismatch`]. Cached records stay valid while the face is
/// closed, so only loading new glyphs needs the face. When the atlas is cleared, the
/// cache is emptied the next time the instance is used with it.
pub struct FontInstance {
    pub(crate) library: Rc<Library>,
    pub(crate) source: FontSource,
    pub(crate) data: FontData,
    pub(crate) settings: FaceSettings,
    pub(crate) shape_options: ShapeOptions,
    pub(crate) mode: FaceMode,
    pub(crate) face: Option<Box<dyn Face>>,
    pub(crate) state: FaceState,
    pub(crate) face_opens: u32,
    pub(crate) glyphs: GlyphStore,
    pub(crate) variant: Variant,
    pub(crate) metrics: FontMetrics,
    pub(crate) atlas: AtlasBinding,
    pub(crate) white: AtlasRegion,
}

impl FontInstance {
    pub(crate) fn open(
        library: Rc<Library>,
        atlas: &Atlas,
        source: FontSource,
        settings: FaceSettings,
        language: &str,
    ) -> Result<Self, Error> {
        if settings.size.is_nan() || settings.size <= 0.0 {
            return Err(Error::cannot_load_font(alloc::format!(
                "invalid font size {}",
                settings.size
            )));
        }
        let data = source.load()?;
        let mode = library.default_mode.get();
        let shape_options = ShapeOptions {
            language: (!language.is_empty()).then(|| language.to_string()),
            ..ShapeOptions::default()
        };
        Self::init(
            library,
            atlas,
            source,
            data,
            settings,
            shape_options,
            mode,
            Variant::NORMAL,
        )
    }

    /// Opens the face, reads the metrics and seeds the cache.
    fn init(
        library: Rc<Library>,
        atlas: &Atlas,
        source: FontSource,
        data: FontData,
        settings: FaceSettings,
        shape_options: ShapeOptions,
        mode: FaceMode,
        variant: Variant,
    ) -> Result<Self, Error> {
        let mut font = Self {
            library,
            source,
            data,
            settings,
            shape_options,
            mode,
            face: None,
            state: FaceState::Unopened,
            face_opens: 0,
            glyphs: GlyphStore::new(),
            variant,
            metrics: FontMetrics::default(),
            atlas: AtlasBinding {
                id: atlas.id(),
                generation: atlas.generation(),
            },
            white: atlas.white_region(),
        };
        let face = font.face().map_err(|err| match err.kind() {
            ErrorKind::CannotLoadFont => err,
            _ => Error::cannot_load_font(err.to_string()),
        })?;
        let metrics = face.metrics();
        font.metrics = FontMetrics::from_face(&metrics);
        font.insert_special(Variant::NORMAL);
        font.release(FaceMode::AutoClose);
        Ok(font)
    }

    /// Creates an instance of the same source and configuration at another size.
    ///
    /// The clone has its own empty cache; it shares nothing with `self` but the context
    /// and the atlas it packs into.
    pub fn clone_with_size(&self, atlas: &Atlas, size: f32) -> Result<Self, Error> {
        self.check_atlas_id(atlas)?;
        let settings = FaceSettings {
            size,
            ..self.settings
        };
        if size.is_nan() || size <= 0.0 {
            return Err(Error::cannot_load_font(alloc::format!(
                "invalid font size {size}"
            )));
        }
        Self::init(
            self.library.clone(),
            atlas,
            self.source.clone(),
            self.data.clone(),
            settings,
            self.shape_options.clone(),
            self.mode,
            self.variant,
        )
    }

    /// Where the font data came from.
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// The settings every face of this instance is opened with.
    pub fn settings(&self) -> &FaceSettings {
        &self.settings
    }

    /// Size in points.
    pub fn size(&self) -> f32 {
        self.settings.size
    }

    /// The language tag used for shaping.
    pub fn language(&self) -> Option<&str> {
        self.shape_options.language.as_deref()
    }

    /// Sets the language tag used for shaping.
    pub fn set_language(&mut self, language: Option<String>) {
        self.shape_options.language = language;
    }

    /// Sets the script used for shaping, or `None` to guess it from the text.
    pub fn set_script(&mut self, script: Option<[u8; 4]>) {
        self.shape_options.script = script;
    }

    /// Sets the direction used for shaping.
    pub fn set_direction(&mut self, direction: Direction) {
        self.shape_options.direction = direction;
    }

    /// Line metrics at this instance's size.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// The current lifecycle state of the face.
    pub fn state(&self) -> FaceState {
        self.state
    }

    /// When the face is released.
    pub fn mode(&self) -> FaceMode {
        self.mode
    }

    /// Changes when the face is released.
    pub fn set_mode(&mut self, mode: FaceMode) {
        self.mode = mode;
    }

    /// How many times the face has been opened.
    pub fn face_opens(&self) -> u32 {
        self.face_opens
    }

    /// The variant used by loading and [`find_current`](Self::find_current).
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Sets the variant used for loading and lookups.
    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
    }

    /// Sets the render mode of the current variant.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.variant.mode = mode;
    }

    /// Sets the outline thickness of the current variant, in pixels.
    pub fn set_outline_thickness(&mut self, thickness: f32) {
        self.variant.outline_thickness = thickness;
    }

    /// The glyph cache.
    pub fn glyphs(&self) -> &GlyphStore {
        &self.glyphs
    }

    /// Looks up a cached glyph.
    ///
    /// [`NO_CHARACTER`] always resolves: to the record of `variant` if one was loaded,
    /// otherwise to the plain record sampling the atlas's white block.
    pub fn find_glyph(&self, codepoint: u32, variant: Variant) -> Option<&GlyphRecord> {
        let found = self.glyphs.find(codepoint, variant);
        if found.is_none() && codepoint == NO_CHARACTER {
            return self.glyphs.variants(NO_CHARACTER).next();
        }
        found
    }

    /// Looks up a cached glyph in the current variant.
    pub fn find_current(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.find_glyph(codepoint, self.variant)
    }

    /// Releases the face if the mode allows manual closing.
    ///
    /// Cached glyphs remain usable; the face is reopened when new glyphs are loaded.
    pub fn close_face(&mut self) {
        self.release(FaceMode::ManualClose);
    }

    /// Drops every cached glyph.
    ///
    /// The atlas space they used is not reclaimed; clear the atlas for that.
    pub fn clear_glyphs(&mut self) {
        self.glyphs.clear();
        self.insert_special(Variant::NORMAL);
    }

    /// Shapes `text` with this instance's language, script and direction.
    pub fn shape(&mut self, text: &str) -> Result<Vec<ShapedGlyph>, Error> {
        let mut out = Vec::new();
        self.shape_into(text, &mut out)?;
        Ok(out)
    }

    pub(crate) fn shape_into(
        &mut self,
        text: &str,
        out: &mut Vec<ShapedGlyph>,
    ) -> Result<(), Error> {
        let options = self.shape_options.clone();
        self.face()?.shape(text, &options, out)
    }

    /// Returns the open face, opening it first if needed.
    ///
    /// A failed open leaves the instance [`FaceState::Unopened`].
    pub(crate) fn face(&mut self) -> Result<&mut (dyn Face + 'static), Error> {
        if self.face.is_none() {
            let opened = self
                .library
                .backend
                .borrow_mut()
                .open_face(&self.data, &self.settings);
            let face = match opened {
                Ok(face) => face,
                Err(err) => {
                    self.state = FaceState::Unopened;
                    return Err(err);
                }
            };
            self.face_opens += 1;
            log::debug!(
                "opened face for {:?} at {}pt (open #{})",
                self.source,
                self.settings.size,
                self.face_opens
            );
            self.face = Some(face);
            self.state = FaceState::Open;
        }
        self.face
            .as_deref_mut()
            .ok_or_else(|| Error::new(ErrorKind::NativeLibrary))
    }

    /// Closes the face if this instance's mode is at most `requested`.
    pub(crate) fn release(&mut self, requested: FaceMode) {
        if self.mode <= requested && self.face.take().is_some() {
            self.state = FaceState::Closed;
            log::debug!(
                "closed face for {:?} at {}pt",
                self.source,
                self.settings.size
            );
        }
    }

    fn check_atlas_id(&self, atlas: &Atlas) -> Result<(), Error> {
        if atlas.id() == self.atlas.id {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::AtlasMismatch).with_detail(alloc::format!(
                "bound to {:?}, got {:?}",
                self.atlas.id,
                atlas.id()
            )))
        }
    }

    /// Checks that `atlas` is ours and drops the cache if it was cleared since.
    pub(crate) fn bind(&mut self, atlas: &Atlas) -> Result<(), Error> {
        self.check_atlas_id(atlas)?;
        if atlas.generation() != self.atlas.generation {
            log::debug!(
                "atlas {:?} was cleared, dropping {} cached glyphs",
                atlas.id(),
                self.glyphs.len()
            );
            self.atlas.generation = atlas.generation();
            self.white = atlas.white_region();
            self.clear_glyphs();
        }
        Ok(())
    }

    /// Caches the "no character" record for `variant`, sampling the white block.
    pub(crate) fn insert_special(&mut self, variant: Variant) {
        self.glyphs.insert(GlyphRecord {
            codepoint: NO_CHARACTER,
            region: AtlasRegion::new(self.white.x + 2, self.white.y + 2, 1, 1),
            width: 0,
            height: 0,
            offset_x: 0,
            offset_y: 0,
            variant,
        });
    }
}

impl Debug for FontInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontInstance")
            .field("source", &self.source)
            .field("size", &self.settings.size)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("variant", &self.variant)
            .field("glyphs", &self.glyphs)
            .finish_non_exhaustive()
    }
}
