// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Error type for atlas, font and glyph loading operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus contextual information about the
/// glyph or allocation that failed, when available.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The glyph (codepoint or glyph index) being processed, if any.
    codepoint: Option<u32>,

    /// The requested pixel size, for allocation failures.
    size: Option<(u32, u32)>,

    /// Message reported by an external engine or describing the source.
    detail: Option<String>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The glyph that was being processed when the error occurred.
    pub fn codepoint(&self) -> Option<u32> {
        self.codepoint
    }

    /// The requested `(width, height)` for allocation related errors.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Additional detail, typically from a font engine.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Creates an error of the given kind with no context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            codepoint: None,
            size: None,
            detail: None,
        }
    }

    /// Creates a [`ErrorKind::CannotLoadFont`] error with a description of the failure.
    pub fn cannot_load_font(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::CannotLoadFont).with_detail(detail)
    }

    /// Creates a [`ErrorKind::NativeLibrary`] error for the given glyph.
    pub fn native(codepoint: u32, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NativeLibrary)
            .with_codepoint(codepoint)
            .with_detail(detail)
    }

    pub(crate) fn atlas_full(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::new(ErrorKind::TextureAtlasFull)
        }
    }

    pub(crate) fn out_of_memory(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::new(ErrorKind::OutOfMemory)
        }
    }

    pub(crate) fn invalid_size(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::new(ErrorKind::InvalidSize)
        }
    }

    /// Attaches the glyph being processed.
    pub fn with_codepoint(mut self, codepoint: u32) -> Self {
        self.codepoint = Some(codepoint);
        self
    }

    /// Attaches a free-form description.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::OutOfMemory => f.write_str("out of memory")?,
            ErrorKind::CannotLoadFont => f.write_str("cannot load font")?,
            ErrorKind::TextureAtlasFull => f.write_str("texture atlas is full")?,
            ErrorKind::NativeLibrary => f.write_str("font engine error")?,
            ErrorKind::UnsupportedFormat => {
                f.write_str("render variant is not supported by the atlas format")?;
            }
            ErrorKind::AtlasMismatch => {
                f.write_str("font instance used with an atlas it was not created for")?;
            }
            ErrorKind::InvalidSize => f.write_str("invalid atlas dimensions")?,
        }
        if let Some((width, height)) = self.size {
            write!(f, ", asked for {width}x{height}")?;
        }
        if let Some(codepoint) = self.codepoint {
            write!(f, " (glyph {codepoint:#x})")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A host allocation failed. Fatal to the call, not to the process.
    OutOfMemory,

    /// The font file could not be read or its data is corrupt or unsupported.
    ///
    /// The instance was not created; retrying with another source is safe.
    CannotLoadFont,

    /// No free space was found in the atlas, even after growing it once.
    TextureAtlasFull,

    /// The external shaper or rasterizer reported a failure for a glyph.
    NativeLibrary,

    /// The requested render variant cannot be stored in the atlas's pixel format.
    UnsupportedFormat,

    /// A font instance was used with a different atlas than the one it packs into.
    AtlasMismatch,

    /// Atlas dimensions were zero, too small for the border, or shrinking.
    InvalidSize,
}
