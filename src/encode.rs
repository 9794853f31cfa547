// this_file: src/encode.rs

//! Export encoding: serialize a fully-painted canvas to PNG bytes or a
//! data URI, and name the download.
//!
//! Callers hand in a canvas only after [`Compositor::render`] has returned
//! for it, so the pixel read here can never observe a partially-drawn
//! frame: the completion signal is the render call itself, not a delay.
//!
//! [`Compositor::render`]: crate::compose::Compositor::render

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use base64::Engine;
use image::ImageEncoder;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Application name used as the download filename prefix.
pub const APP_NAME: &str = "photo-poet";

/// Encode the canvas losslessly as PNG.
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            canvas.pixels().as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::Encode(format!("PNG encoding failed: {}", e)))?;
    Ok(out)
}

/// Wrap PNG bytes as a `data:image/png;base64,` URI.
pub fn to_data_uri(png_bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes)
    )
}

/// Download filename for an export made at `timestamp`:
/// `photo-poet-<ISO8601 with ':' and '.' replaced by '-'>.png`.
pub fn export_filename(timestamp: OffsetDateTime) -> Result<String> {
    let stamp = timestamp
        .format(&Rfc3339)
        .map_err(|e| Error::Encode(format!("Timestamp formatting failed: {}", e)))?;
    let stamp: String = stamp
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    Ok(format!("{}-{}.png", APP_NAME, stamp))
}

/// Download filename stamped with the current UTC time.
pub fn export_filename_now() -> Result<String> {
    export_filename(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::style::Rgba;

    fn painted_canvas() -> Canvas {
        let mut canvas = Canvas::new(16, 12).unwrap();
        canvas.fill_rect(2.0, 2.0, 6.0, 6.0, Rgba::new(200, 100, 50, 255));
        canvas
    }

    #[test]
    fn png_round_trips_pixels() {
        let canvas = painted_canvas();
        let bytes = encode_png(&canvas).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 12);
        assert_eq!(decoded.get_pixel(3, 3).0, [200, 100, 50, 255]);
    }

    #[test]
    fn encoding_is_idempotent() {
        let canvas = painted_canvas();
        let first = encode_png(&canvas).unwrap();
        let second = encode_png(&canvas).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn data_uri_carries_png_payload() {
        let canvas = painted_canvas();
        let bytes = encode_png(&canvas).unwrap();
        let uri = to_data_uri(&bytes);
        assert!(uri.starts_with("data:image/png;base64,"));
        let decoded = crate::decode::SourceImage::from_data_uri(&uri).unwrap();
        assert_eq!(decoded.natural_width(), 16);
    }

    #[test]
    fn filename_replaces_separator_characters() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let name = export_filename(at).unwrap();
        assert!(name.starts_with("photo-poet-"), "{}", name);
        assert!(name.ends_with(".png"), "{}", name);
        let stamp = &name["photo-poet-".len()..name.len() - ".png".len()];
        assert!(!stamp.contains(':'), "{}", stamp);
        assert!(!stamp.contains('.'), "{}", stamp);
    }

    #[test]
    fn filenames_differ_across_timestamps() {
        let a = export_filename(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap());
        let b = export_filename(OffsetDateTime::from_unix_timestamp(1_700_000_001).unwrap());
        assert_ne!(a.unwrap(), b.unwrap());
    }
}
