// this_file: src/compose.rs

//! Composite rendering: scale the photo onto a canvas, wrap and place the
//! poem, paint the background tint and caption text.
//!
//! Every render fully repeats the same recipe from the immutable inputs;
//! there is no incremental patching, so retrying a failed render is just
//! calling the same function again.

use crate::canvas::{ascent_px, Canvas};
use crate::decode::SourceImage;
use crate::error::Result;
use crate::fonts::{FontCatalog, FontLoader};
use crate::layout::wrap;
use crate::logging::Timer;
use crate::place::{place, LayoutMetrics};
use crate::shaping::{shape_line, FontMeasurer};
use crate::style::{HAlign, StyleSpec};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fraction of the viewport height a preview canvas may occupy.
const PREVIEW_HEIGHT_FRACTION: f32 = 0.5;

/// Base font size divisors against the native image dimensions.
const BASE_FONT_WIDTH_DIVISOR: f32 = 35.0;
const BASE_FONT_HEIGHT_DIVISOR: f32 = 28.0;

/// Floor for the resolution-derived base font size.
const MIN_BASE_FONT_PX: f32 = 12.0;

/// Available space the preview canvas is sized against.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Where a render is headed: a capped on-screen preview or a native-
/// resolution export. The compositor branches on this variant, never on a
/// canvas identifier.
#[derive(Debug, Clone, Copy)]
pub enum RenderTarget {
    /// Sized to the viewport width, height capped at a fraction of the
    /// viewport height
    Preview { viewport: Viewport },
    /// The source image's native pixel dimensions, no downscaling
    Export,
}

/// Draw dimensions for a target, preserving the source aspect ratio.
pub fn draw_dimensions(image: &SourceImage, target: RenderTarget) -> (f32, f32) {
    match target {
        RenderTarget::Export => (
            image.natural_width() as f32,
            image.natural_height() as f32,
        ),
        RenderTarget::Preview { viewport } => {
            let aspect = image.aspect_ratio();
            let mut draw_width = viewport.width;
            let mut draw_height = draw_width / aspect;
            let max_height = viewport.height * PREVIEW_HEIGHT_FRACTION;
            if draw_height > max_height {
                draw_height = max_height;
                draw_width = draw_height * aspect;
            }
            (draw_width, draw_height)
        }
    }
}

/// Base font size derived from the native image resolution: the smaller of
/// two resolution-derived candidates, floored.
pub fn base_font_size(natural_width: u32, natural_height: u32) -> f32 {
    let by_width = natural_width as f32 / BASE_FONT_WIDTH_DIVISOR;
    let by_height = natural_height as f32 / BASE_FONT_HEIGHT_DIVISOR;
    by_width.min(by_height).max(MIN_BASE_FONT_PX)
}

/// Orchestrates one full composite render.
pub struct Compositor {
    loader: FontLoader,
    catalog: FontCatalog,
}

impl Compositor {
    pub fn new(catalog: FontCatalog) -> Self {
        Self {
            loader: FontLoader::new(8),
            catalog,
        }
    }

    /// Render `image` with the poem overlaid, at the target's resolution.
    ///
    /// Synchronous with respect to the already-decoded `image`; the output
    /// canvas is fully painted when this returns, which is the completion
    /// signal export encoding waits on.
    pub fn render(
        &self,
        image: &SourceImage,
        poem_text: &str,
        style: &StyleSpec,
        target: RenderTarget,
    ) -> Result<Canvas> {
        let _timer = Timer::new(format!("render {:?}", target));
        style.validate()?;

        // Step 1: draw dimensions, aspect ratio preserved
        let (draw_width, draw_height) = draw_dimensions(image, target);
        let canvas_width = (draw_width.round() as u32).max(1);
        let canvas_height = (draw_height.round() as u32).max(1);

        let mut canvas = Canvas::new(canvas_width, canvas_height)?;
        canvas.draw_image_scaled(image.pixels());

        // Zero-content wrap: the output is just the scaled image
        if poem_text.trim().is_empty() {
            log::debug!("Empty poem, skipping caption paint");
            return Ok(canvas);
        }

        // Steps 2-4: scale-consistent font sizing off the native resolution
        let scale_factor = canvas.width() as f32 / image.natural_width() as f32;
        let font_size = base_font_size(image.natural_width(), image.natural_height())
            * style.font_size_multiplier
            * scale_factor;
        let metrics = LayoutMetrics::from_font_size(font_size);

        let font_path = self.catalog.resolve(&style.font_family)?;
        let font = self.loader.load_font(&font_path)?;

        // Step 5: wrap against the width budget
        let max_width = canvas.width() as f32 - 2.0 * metrics.edge_padding;
        let measurer = FontMeasurer::new(&font, font_size);
        let lines = wrap(poem_text, &measurer, max_width)?;

        // Step 6: anchor the block
        let Some(block) = place(
            &lines,
            &metrics,
            style.position,
            canvas.width() as f32,
            canvas.height() as f32,
        ) else {
            return Ok(canvas);
        };

        // Step 7: paint tint, then lines top-down from the block's top edge
        canvas.fill_rect(
            block.x,
            block.y,
            block.width,
            block.height,
            style.background_color,
        );

        let ascent = ascent_px(&font, font_size);
        let halign = style.position.horizontal();
        for (index, line) in lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            let shaped = shape_line(&font, &line.text, font_size)?;
            let origin_x = match halign {
                HAlign::Left => block.x + metrics.background_padding,
                HAlign::Center => block.x + (block.width - shaped.width) / 2.0,
                HAlign::Right => {
                    block.x + block.width - metrics.background_padding - shaped.width
                }
            };
            let line_top = block.y + metrics.background_padding + index as f32 * metrics.line_height;
            canvas.draw_text_line(&font, &shaped, origin_x, line_top + ascent, style.text_color)?;
        }

        Ok(canvas)
    }

    /// Dedicated decode-then-render cycle for a source path or data URI.
    pub fn render_from_source(
        &self,
        source: &str,
        poem_text: &str,
        style: &StyleSpec,
        target: RenderTarget,
    ) -> Result<Canvas> {
        let image = SourceImage::open(source)?;
        self.render(&image, poem_text, style, target)
    }
}

/// Last-write-wins ordering for renders aimed at the same surface.
///
/// Each render claims a ticket before it starts; a finished frame is
/// published only if no later render has claimed one since. A superseded
/// frame is simply dropped, never an error.
#[derive(Default)]
pub struct RenderGate {
    latest: AtomicU64,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a ticket for a render that is about to start.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while no later render has begun.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Publish a finished frame unless it has been superseded.
    pub fn publish<T>(&self, ticket: u64, frame: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(frame)
        } else {
            log::debug!("Dropping superseded frame (ticket {})", ticket);
            None
        }
    }
}
