// this_file: src/place.rs

//! Caption block placement: bounding box of the wrapped text block for a
//! given anchor and canvas size.

use crate::layout::{content_width, WrappedLine};
use crate::style::{Anchor, HAlign, VAlign};

/// Layout distances derived from the on-canvas font size.
///
/// The ratios are fixed so a preview canvas and a full-resolution export
/// produce visually identical proportions.
#[derive(Debug, Clone, Copy)]
pub struct LayoutMetrics {
    /// On-canvas font size in pixels
    pub font_size: f32,
    /// Vertical distance between successive line tops
    pub line_height: f32,
    /// Margin between the block and the canvas edge
    pub edge_padding: f32,
    /// Padding between the background rect and the text it holds
    pub background_padding: f32,
}

impl LayoutMetrics {
    /// Derive all distances from an on-canvas font size.
    pub fn from_font_size(font_size: f32) -> Self {
        Self {
            font_size,
            line_height: font_size * 1.3,
            edge_padding: font_size,
            background_padding: font_size * 0.3,
        }
    }
}

/// Computed bounding box of the caption block, in canvas pixel space.
///
/// Transient: recomputed on every render, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Place the wrapped block on the canvas.
///
/// Returns `None` for zero wrapped lines; callers treat that as "skip
/// paint", not an error.
pub fn place(
    lines: &[WrappedLine],
    metrics: &LayoutMetrics,
    anchor: Anchor,
    canvas_width: f32,
    canvas_height: f32,
) -> Option<TextBlock> {
    if lines.is_empty() {
        return None;
    }

    let width = content_width(lines) + 2.0 * metrics.background_padding;
    // The last term removes one line's worth of inter-line leading so the
    // block hugs single-line content tightly.
    let height = lines.len() as f32 * metrics.line_height + 2.0 * metrics.background_padding
        - (metrics.line_height - metrics.font_size);

    let x = match anchor.horizontal() {
        HAlign::Left => metrics.edge_padding,
        HAlign::Center => (canvas_width - width) / 2.0,
        HAlign::Right => canvas_width - width - metrics.edge_padding,
    };

    let y = match anchor.vertical() {
        VAlign::Top => metrics.edge_padding,
        VAlign::Bottom => canvas_height - height - metrics.edge_padding,
        VAlign::Middle => (canvas_height - height) / 2.0,
    };

    Some(TextBlock {
        x,
        y,
        width,
        height,
    })
}
