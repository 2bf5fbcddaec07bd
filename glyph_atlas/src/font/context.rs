// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt::{Debug, Formatter};

#[cfg(feature = "std")]
use std::path::Path;

use super::{FaceMode, FaceSettings, FontData, FontInstance, FontSource};
use crate::{Atlas, Error, FontBackend};

/// State shared by a context and every font instance created from it.
pub(crate) struct Library {
    pub(crate) backend: RefCell<Box<dyn FontBackend>>,
    pub(crate) default_mode: Cell<FaceMode>,
}

/// The font engine context that font instances are created from.
///
/// A context owns a [`FontBackend`] and is shared by reference counting with the
/// instances it creates. Independent contexts share nothing, so each thread that loads
/// glyphs should use its own context and atlas.
///
/// The context is not `Clone`. Only its instances share its state, and
/// [`close`](Self::close) refuses while any of them is alive.
///
/// ```
/// # #[cfg(feature = "testing")] {
/// use glyph_atlas::testing::BoxBackend;
/// use glyph_atlas::{Atlas, FontContext, FontData};
///
/// let mut atlas = Atlas::new(256, 256, 1).unwrap();
/// let context = FontContext::new(BoxBackend::default());
/// let mut font = context
///     .font_from_memory(&atlas, FontData::new(vec![0; 4]), 16.0, "en")
///     .unwrap();
/// let report = font.ensure_glyphs(&mut atlas, "Hello").unwrap();
/// assert_eq!(report.loaded, 4);
/// assert!(font.find_current('l' as u32).is_some());
/// # }
/// ```
pub struct FontContext {
    library: Rc<Library>,
}

impl FontContext {
    /// Creates a context around a backend.
    pub fn new(backend: impl FontBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    /// Creates a context around a boxed backend.
    pub fn from_boxed(backend: Box<dyn FontBackend>) -> Self {
        log::debug!("created font context for {}", backend.name());
        Self {
            library: Rc::new(Library {
                backend: RefCell::new(backend),
                default_mode: Cell::new(FaceMode::default()),
            }),
        }
    }

    /// The face mode given to new font instances.
    pub fn default_mode(&self) -> FaceMode {
        self.library.default_mode.get()
    }

    /// Sets the face mode given to font instances created from now on.
    pub fn set_default_mode(&self, mode: FaceMode) {
        self.library.default_mode.set(mode);
    }

    /// Number of live font instances created from this context.
    pub fn instance_count(&self) -> usize {
        Rc::strong_count(&self.library) - 1
    }

    /// Creates a font instance from a font file.
    ///
    /// The face is opened immediately to read the font's metrics. A missing or
    /// unreadable file fails with [`ErrorKind::CannotLoadFont`](crate::ErrorKind).
    #[cfg(feature = "std")]
    pub fn font_from_file(
        &self,
        atlas: &Atlas,
        path: impl AsRef<Path>,
        size: f32,
        language: &str,
    ) -> Result<FontInstance, Error> {
        self.font_from_source(
            atlas,
            FontSource::from(path.as_ref()),
            FaceSettings::new(size),
            language,
        )
    }

    /// Creates a font instance from font data in memory.
    pub fn font_from_memory(
        &self,
        atlas: &Atlas,
        data: FontData,
        size: f32,
        language: &str,
    ) -> Result<FontInstance, Error> {
        self.font_from_source(atlas, FontSource::Memory(data), FaceSettings::new(size), language)
    }

    /// Creates a font instance with explicit face settings.
    pub fn font_from_source(
        &self,
        atlas: &Atlas,
        source: FontSource,
        settings: FaceSettings,
        language: &str,
    ) -> Result<FontInstance, Error> {
        FontInstance::open(self.library.clone(), atlas, source, settings, language)
    }

    /// Releases the context.
    ///
    /// Fails and hands the context back while font instances created from it are alive.
    pub fn close(self) -> Result<(), Self> {
        match Rc::try_unwrap(self.library) {
            Ok(library) => {
                log::debug!(
                    "closed font context for {}",
                    library.backend.borrow().name()
                );
                Ok(())
            }
            Err(library) => Err(Self { library }),
        }
    }
}

impl Debug for FontContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontContext")
            .field("backend", &self.library.backend.borrow().name())
            .field("default_mode", &self.default_mode())
            .finish_non_exhaustive()
    }
}
