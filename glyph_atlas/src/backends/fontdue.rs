// Copyright 2025 the Glyph Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A pure Rust backend: `harfrust` shapes, `skrifa` reads metrics, `fontdue` rasterizes.
//!
//! `fontdue` has no hinter, so [`RasterRequest::hinting`] is ignored. Outline variants
//! are derived from the filled glyph with [`stroke`]. Color glyphs are not supported;
//! RGBA atlases receive white glyphs with coverage in the alpha channel.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;

use ::fontdue::{Font, FontSettings, Metrics};
use skrifa::instance::{LocationRef, Size};
use skrifa::MetadataProvider;

use crate::distance_field::stroke;
use crate::math::round;
use crate::{
    Direction, Error, ErrorKind, Face, FaceMetrics, FaceSettings, FontBackend, FontData, GlyphBitmap,
    PixelFormat, RasterRequest, ShapeOptions, ShapedGlyph,
};

/// Opens faces with `fontdue`, shaping them with `harfrust`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FontdueBackend;

impl FontdueBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl FontBackend for FontdueBackend {
    fn open_face(
        &mut self,
        data: &FontData,
        settings: &FaceSettings,
    ) -> Result<Box<dyn Face>, Error> {
        Ok(Box::new(FontdueFace::new(data, settings)?))
    }

    fn name(&self) -> &str {
        "fontdue"
    }
}

struct FontdueFace {
    data: FontData,
    index: u32,
    font: Font,
    shaper_data: harfrust::ShaperData,
    pixel_size: f32,
    hres: u32,
    metrics: FaceMetrics,
    /// Pixels per font unit.
    scale: f32,
}

impl FontdueFace {
    fn new(data: &FontData, settings: &FaceSettings) -> Result<Self, Error> {
        let index = settings.collection_index;
        let font_ref = skrifa::FontRef::from_index(data.data(), index)
            .map_err(|err| Error::cannot_load_font(err.to_string()))?;
        let pixel_size = settings.pixel_size();
        let metrics = font_ref.metrics(Size::new(pixel_size), LocationRef::default());
        let units_per_em = f32::from(metrics.units_per_em.max(1));
        let (underline_position, underline_thickness) = metrics
            .underline
            .map_or((-pixel_size / 10.0, pixel_size / 20.0), |d| {
                (d.offset, d.thickness)
            });
        let face_metrics = FaceMetrics {
            ascender: metrics.ascent,
            descender: metrics.descent,
            height: metrics.ascent - metrics.descent + metrics.leading,
            underline_position,
            underline_thickness,
        };

        let font = Font::from_bytes(
            data.data(),
            FontSettings {
                collection_index: index,
                scale: pixel_size,
                ..FontSettings::default()
            },
        )
        .map_err(Error::cannot_load_font)?;

        let shaper_font = harfrust::FontRef::from_index(data.data(), index)
            .map_err(|err| Error::cannot_load_font(alloc::format!("{err:?}")))?;
        let shaper_data = harfrust::ShaperData::new(&shaper_font);

        Ok(Self {
            data: data.clone(),
            index,
            font,
            shaper_data,
            pixel_size,
            hres: settings.hres.max(1),
            metrics: face_metrics,
            scale: pixel_size / units_per_em,
        })
    }

    /// Converts font units to 26.6 fixed point pixels, times `multiplier`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "glyph positions are far from the i32 range"
    )]
    fn to_fixed(&self, units: i32, multiplier: u32) -> i32 {
        round(units as f32 * self.scale * 64.0 * multiplier as f32) as i32
    }

    fn coverage(&self, glyph: u16) -> (Metrics, Vec<u8>) {
        self.font.rasterize_indexed(glyph, self.pixel_size)
    }
}

impl Face for FontdueFace {
    fn metrics(&self) -> FaceMetrics {
        self.metrics
    }

    fn shape(
        &mut self,
        text: &str,
        options: &ShapeOptions,
        out: &mut Vec<ShapedGlyph>,
    ) -> Result<(), Error> {
        out.clear();
        let font_ref = harfrust::FontRef::from_index(self.data.data(), self.index).map_err(|err| {
            Error::new(ErrorKind::NativeLibrary).with_detail(alloc::format!("{err:?}"))
        })?;
        let shaper = self
            .shaper_data
            .shaper(&font_ref)
            .point_size(Some(self.pixel_size))
            .build();

        let mut buffer = harfrust::UnicodeBuffer::new();
        buffer.push_str(text);
        if let Some(script) = options
            .script
            .and_then(|tag| harfrust::Script::from_iso15924_tag(harfrust::Tag::new(&tag)))
        {
            buffer.set_script(script);
        }
        if let Some(language) = options
            .language
            .as_deref()
            .and_then(|lang| lang.parse::<harfrust::Language>().ok())
        {
            buffer.set_language(language);
        }
        match options.direction {
            Direction::Auto => {}
            Direction::LeftToRight => buffer.set_direction(harfrust::Direction::LeftToRight),
            Direction::RightToLeft => buffer.set_direction(harfrust::Direction::RightToLeft),
            Direction::TopToBottom => buffer.set_direction(harfrust::Direction::TopToBottom),
            Direction::BottomToTop => buffer.set_direction(harfrust::Direction::BottomToTop),
        }
        buffer.guess_segment_properties();

        let glyphs = shaper.shape(buffer, &[]);
        out.extend(
            glyphs
                .glyph_infos()
                .iter()
                .zip(glyphs.glyph_positions())
                .map(|(info, pos)| ShapedGlyph {
                    glyph: info.glyph_id,
                    cluster: info.cluster,
                    x_advance: self.to_fixed(pos.x_advance, self.hres),
                    y_advance: self.to_fixed(pos.y_advance, 1),
                    x_offset: self.to_fixed(pos.x_offset, self.hres),
                    y_offset: self.to_fixed(pos.y_offset, 1),
                }),
        );
        Ok(())
    }

    fn glyph_index(&self, codepoint: u32) -> Option<u32> {
        let ch = char::from_u32(codepoint)?;
        Some(u32::from(self.font.lookup_glyph_index(ch)))
    }

    fn rasterize(&mut self, glyph: u32, request: &RasterRequest) -> Result<GlyphBitmap, Error> {
        let index = u16::try_from(glyph)
            .map_err(|_| Error::native(glyph, "glyph index out of range"))?;
        if u32::from(index) >= u32::from(self.font.glyph_count()) {
            return Err(Error::native(glyph, "no such glyph in font"));
        }

        if request.format == PixelFormat::Lcd && !request.variant.mode.is_outline() {
            let (metrics, mut data) = self.font.rasterize_indexed_subpixel(index, self.pixel_size);
            if request.filtering {
                lcd_filter(&mut data, metrics.width, metrics.height, request.lcd_weights);
            }
            return Ok(bitmap(&metrics, PixelFormat::Lcd, data));
        }

        let (metrics, coverage) = self.coverage(index);
        let mut gray = bitmap(&metrics, PixelFormat::Gray, coverage);
        if request.variant.mode.is_outline() && !gray.is_empty() {
            gray = stroke(
                &gray,
                request.variant.mode,
                request.variant.outline_thickness,
            );
        }
        Ok(convert(gray, request.format))
    }
}

fn bitmap(metrics: &Metrics, format: PixelFormat, data: Vec<u8>) -> GlyphBitmap {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "glyph bitmaps are far smaller than 4 gigapixels"
    )]
    let (width, height) = (metrics.width as u32, metrics.height as u32);
    let top = metrics.ymin + height as i32;
    GlyphBitmap {
        width,
        height,
        pitch: metrics.width * format.depth() as usize,
        left: metrics.xmin,
        top,
        format,
        data,
    }
}

/// Expands a grayscale bitmap to the atlas format.
fn convert(gray: GlyphBitmap, format: PixelFormat) -> GlyphBitmap {
    let data: Vec<u8> = match format {
        PixelFormat::Gray => return gray,
        PixelFormat::Lcd => gray.rows().flatten().flat_map(|&v| [v; 3]).collect(),
        PixelFormat::Rgba => gray
            .rows()
            .flatten()
            .flat_map(|&v| [0xFF, 0xFF, 0xFF, v])
            .collect(),
    };
    GlyphBitmap {
        pitch: gray.width as usize * format.depth() as usize,
        format,
        data,
        ..gray
    }
}

/// Applies the 5-tap FIR filter across the subpixels of each row.
fn lcd_filter(data: &mut [u8], width: usize, height: usize, weights: [u8; 5]) {
    let row_len = width * 3;
    let mut source = Vec::with_capacity(row_len);
    for row in data.chunks_exact_mut(row_len.max(1)).take(height) {
        source.clear();
        source.extend_from_slice(row);
        for (i, out) in row.iter_mut().enumerate() {
            let sum: u32 = weights
                .iter()
                .enumerate()
                .filter_map(|(k, &w)| {
                    let j = (i + k).checked_sub(2)?;
                    source.get(j).map(|&v| u32::from(w) * u32::from(v))
                })
                .sum();
            *out = u8::try_from(sum >> 8).unwrap_or(u8::MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcd_filter_spreads_energy() {
        let mut row = [0, 0, 0, 0, 255, 0, 0, 0, 0];
        lcd_filter(&mut row, 3, 1, crate::font::DEFAULT_LCD_WEIGHTS);
        assert_eq!(row, [0, 0, 15, 63, 111, 63, 15, 0, 0]);
    }

    #[test]
    fn convert_expands_gray() {
        let gray = GlyphBitmap {
            width: 2,
            height: 1,
            pitch: 4,
            left: 0,
            top: 1,
            format: PixelFormat::Gray,
            data: alloc::vec![10, 20, 0, 0],
        };
        let rgba = convert(gray.clone(), PixelFormat::Rgba);
        assert_eq!(rgba.pitch, 8);
        assert_eq!(rgba.data, [255, 255, 255, 10, 255, 255, 255, 20]);
        let lcd = convert(gray, PixelFormat::Lcd);
        assert_eq!(lcd.data, [10, 10, 10, 20, 20, 20]);
    }
}
