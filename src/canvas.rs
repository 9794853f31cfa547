// this_file: src/canvas.rs

//! RGBA drawing surface: image blit, background rect fill, and glyph
//! compositing using skrifa outlines rasterized with zeno.

use crate::error::{Error, Result};
use crate::fonts::FontInstance;
use crate::shaping::ShapedLine;
use crate::style::Rgba;
use image::RgbaImage;
use read_fonts::types::GlyphId;
use read_fonts::TableProvider;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::MetadataProvider;
use zeno::{Command, Mask, Transform};

/// RGBA canvas in row-major order.
///
/// The canvas is always fully covered by the scaled source image before any
/// caption painting, so compositing treats the destination as opaque.
#[derive(Debug)]
pub struct Canvas {
    inner: RgbaImage,
}

impl Canvas {
    /// Allocate a canvas, validating dimensions.
    ///
    /// Zero-sized dimensions are a fatal configuration error for the render
    /// call, never a silent no-op.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Canvas(format!(
                "Canvas dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            inner: RgbaImage::new(width, height),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Access the raw pixel buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.inner
    }

    /// Consume the canvas and return the owned pixel buffer.
    pub fn into_image(self) -> RgbaImage {
        self.inner
    }

    /// Draw `source` scaled to cover the full canvas.
    pub fn draw_image_scaled(&mut self, source: &RgbaImage) {
        if source.dimensions() == (self.width(), self.height()) {
            self.inner.copy_from_slice(source);
            return;
        }
        let scaled = image::imageops::resize(
            source,
            self.width(),
            self.height(),
            image::imageops::FilterType::Triangle,
        );
        self.inner.copy_from_slice(&scaled);
    }

    /// Source-over fill a rectangle with an RGBA color.
    ///
    /// Coordinates are clamped to the canvas bounds.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let width = self.width() as i64;
        let height = self.height() as i64;
        let x0 = (x.floor() as i64).clamp(0, width);
        let y0 = (y.floor() as i64).clamp(0, height);
        let x1 = ((x + w).ceil() as i64).clamp(0, width);
        let y1 = ((y + h).ceil() as i64).clamp(0, height);

        for py in y0..y1 {
            for px in x0..x1 {
                blend_pixel(
                    self.inner.get_pixel_mut(px as u32, py as u32),
                    color,
                    color.a,
                );
            }
        }
    }

    /// Paint a shaped line with its baseline at `baseline_y`, pen starting
    /// at `origin_x`.
    pub fn draw_text_line(
        &mut self,
        font: &FontInstance,
        shaped: &ShapedLine,
        origin_x: f32,
        baseline_y: f32,
        color: Rgba,
    ) -> Result<()> {
        if shaped.glyphs.is_empty() {
            return Ok(());
        }

        let head = font
            .font_ref()
            .head()
            .map_err(|e| Error::Canvas(format!("Failed to read head table: {}", e)))?;
        let upem = head.units_per_em().max(1);
        let scale = shaped.size / upem as f32;

        let outlines = font.font_ref().outline_glyphs();
        let mut cursor_x = origin_x;

        for glyph in &shaped.glyphs {
            let glyph_id = GlyphId::new(glyph.id);
            let Some(outline) = outlines.get(glyph_id) else {
                log::warn!("Glyph ID {} not found in font", glyph.id);
                cursor_x += glyph.x_advance;
                continue;
            };

            let mut commands = Vec::new();
            let mut pen = ZenoPen::new(&mut commands);
            let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
            outline
                .draw(settings, &mut pen)
                .map_err(|e| Error::Canvas(format!("Failed to draw outline: {}", e)))?;

            let glyph_x = cursor_x + glyph.x_offset;
            let glyph_y = baseline_y - glyph.y_offset;
            self.composite_glyph(&commands, glyph_x, glyph_y, scale, color);

            cursor_x += glyph.x_advance;
        }

        Ok(())
    }

    /// Rasterize a glyph path and alpha-blend it onto the canvas.
    fn composite_glyph(&mut self, path: &[Command], x: f32, y: f32, scale: f32, color: Rgba) {
        let transform = Transform::scale(scale, scale).then_translate(x, y);

        let mut mask = Mask::new(path);
        mask.transform(Some(transform));
        let (alpha_data, placement) = mask.render();

        let width = self.width() as i32;
        let height = self.height() as i32;
        let top = placement.top.max(0);
        let left = placement.left.max(0);
        let bottom = (placement.top + placement.height as i32).min(height);
        let right = (placement.left + placement.width as i32).min(width);

        for py in top..bottom {
            for px in left..right {
                let mask_y = (py - placement.top) as u32;
                let mask_x = (px - placement.left) as u32;
                let mask_idx = (mask_y * placement.width + mask_x) as usize;
                if mask_idx >= alpha_data.len() {
                    continue;
                }
                let coverage = alpha_data[mask_idx];
                if coverage == 0 {
                    continue;
                }
                // Coverage attenuated by the color's own opacity
                let alpha = (coverage as u16 * color.a as u16 / 255) as u8;
                blend_pixel(self.inner.get_pixel_mut(px as u32, py as u32), color, alpha);
            }
        }
    }
}

/// Source-over blend of `color` at `alpha` onto an opaque destination pixel.
fn blend_pixel(dst: &mut image::Rgba<u8>, color: Rgba, alpha: u8) {
    let a = alpha as u16;
    let inv = 255 - a;
    dst.0[0] = ((color.r as u16 * a + dst.0[0] as u16 * inv) / 255) as u8;
    dst.0[1] = ((color.g as u16 * a + dst.0[1] as u16 * inv) / 255) as u8;
    dst.0[2] = ((color.b as u16 * a + dst.0[2] as u16 * inv) / 255) as u8;
    dst.0[3] = 255;
}

/// Adapter converting skrifa's OutlinePen calls to a zeno command vector.
struct ZenoPen<'a> {
    commands: &'a mut Vec<Command>,
}

impl<'a> ZenoPen<'a> {
    fn new(commands: &'a mut Vec<Command>) -> Self {
        Self { commands }
    }
}

impl OutlinePen for ZenoPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(Command::MoveTo([x, -y].into())); // Flip Y for raster coordinates
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(Command::LineTo([x, -y].into()));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.commands
            .push(Command::QuadTo([cx0, -cy0].into(), [x, -y].into()));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.commands.push(Command::CurveTo(
            [cx0, -cy0].into(),
            [cx1, -cy1].into(),
            [x, -y].into(),
        ));
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}

/// Font ascent in pixels at the given size; used to convert a line's top
/// edge to its baseline (top-baseline text placement).
pub fn ascent_px(font: &FontInstance, size: f32) -> f32 {
    let metrics = font
        .font_ref()
        .metrics(Size::new(size), LocationRef::default());
    metrics.ascent
}
