// this_file: src/shaping.rs

//! Text shaping and measurement using HarfBuzz.
//!
//! Measurement and painting share this one shaping path, so a wrapped line
//! is measured with exactly the font that will paint it.

use crate::error::{Error, Result};
use crate::fonts::FontInstance;
use crate::layout::MeasureText;
use harfbuzz_rs::UnicodeBuffer;
use read_fonts::TableProvider;

/// A single positioned glyph in pixel units.
#[derive(Debug, Clone, Copy)]
pub struct ShapedGlyph {
    /// Glyph ID in the font
    pub id: u32,
    /// Horizontal advance in pixels
    pub x_advance: f32,
    /// Horizontal offset from the pen position in pixels
    pub x_offset: f32,
    /// Vertical offset from the baseline in pixels
    pub y_offset: f32,
}

/// A shaped run of text at a fixed pixel size.
#[derive(Debug, Clone)]
pub struct ShapedLine {
    /// Positioned glyphs in visual order
    pub glyphs: Vec<ShapedGlyph>,
    /// Total advance width in pixels
    pub width: f32,
    /// Pixel size the run was shaped at
    pub size: f32,
}

/// Shape one line of text at `size` pixels.
///
/// HarfBuzz reports advances in font units at the face's units-per-em
/// scale; they are converted to pixels here so every caller works in
/// canvas space.
pub fn shape_line(font: &FontInstance, text: &str, size: f32) -> Result<ShapedLine> {
    let head = font
        .font_ref()
        .head()
        .map_err(|e| Error::Shaping(format!("Failed to read head table: {}", e)))?;
    let upem = head.units_per_em().max(1);
    let scale = size / upem as f32;

    let hb_font = font
        .hb_font()
        .lock()
        .map_err(|_| Error::Shaping("font lock poisoned".to_string()))?;

    let buffer = UnicodeBuffer::new().add_str(text);
    let output = harfbuzz_rs::shape(&hb_font, buffer, &[]);

    let infos = output.get_glyph_infos();
    let positions = output.get_glyph_positions();

    let mut glyphs = Vec::with_capacity(infos.len());
    let mut width = 0.0f32;
    for (info, pos) in infos.iter().zip(positions.iter()) {
        let x_advance = pos.x_advance as f32 * scale;
        glyphs.push(ShapedGlyph {
            id: info.codepoint,
            x_advance,
            x_offset: pos.x_offset as f32 * scale,
            y_offset: pos.y_offset as f32 * scale,
        });
        width += x_advance;
    }

    log::debug!(
        "Shaped '{}' at {}px: {} glyphs, {:.1}px wide",
        text,
        size,
        glyphs.len(),
        width
    );

    Ok(ShapedLine {
        glyphs,
        width,
        size,
    })
}

/// [`MeasureText`] implementation backed by a loaded font at a fixed size.
pub struct FontMeasurer<'a> {
    font: &'a FontInstance,
    size: f32,
}

impl<'a> FontMeasurer<'a> {
    pub fn new(font: &'a FontInstance, size: f32) -> Self {
        Self { font, size }
    }
}

impl MeasureText for FontMeasurer<'_> {
    fn measure(&self, text: &str) -> Result<f32> {
        Ok(shape_line(self.font, text, self.size)?.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontInstance, FontLoader};
    use camino::Utf8PathBuf;
    use std::sync::Arc;

    /// Best-effort lookup of a real font for shaping tests; shaping needs
    /// actual font tables, so these tests skip on fontless systems.
    pub(crate) fn system_font() -> Option<Arc<FontInstance>> {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/Library/Fonts/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ];
        let loader = FontLoader::new(4);
        for path in candidates {
            if std::path::Path::new(path).exists() {
                if let Ok(font) = loader.load_font(&Utf8PathBuf::from(path)) {
                    return Some(font);
                }
            }
        }
        None
    }

    #[test]
    fn shaping_is_deterministic() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let a = shape_line(&font, "Silent dawn", 24.0).unwrap();
        let b = shape_line(&font, "Silent dawn", 24.0).unwrap();
        assert_eq!(a.glyphs.len(), b.glyphs.len());
        assert_eq!(a.width, b.width);
    }

    #[test]
    fn wider_text_measures_wider() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let measurer = FontMeasurer::new(&font, 24.0);
        let short = measurer.measure("dawn").unwrap();
        let long = measurer.measure("dawn breaks gold").unwrap();
        assert!(long > short);
        assert!(short > 0.0);
    }

    #[test]
    fn measurement_scales_with_size() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let at_12 = FontMeasurer::new(&font, 12.0).measure("gold").unwrap();
        let at_24 = FontMeasurer::new(&font, 24.0).measure("gold").unwrap();
        // Advances scale linearly with pixel size
        assert!((at_24 - 2.0 * at_12).abs() < 0.5);
    }

    #[test]
    fn empty_text_measures_zero() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let shaped = shape_line(&font, "", 24.0).unwrap();
        assert!(shaped.glyphs.is_empty());
        assert_eq!(shaped.width, 0.0);
    }
}
