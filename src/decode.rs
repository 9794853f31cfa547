// this_file: src/decode.rs

//! Source image decoding.
//!
//! Decoding is the one suspension point ahead of compositing: a render never
//! starts until a [`SourceImage`] exists, and the `Result` of these
//! constructors is the decode completion/failure channel. A failed decode
//! aborts the render for that target with no partial paint.

use crate::error::{Error, Result};
use base64::Engine;
use image::RgbaImage;
use std::path::Path;

/// A fully decoded source raster, immutable once loaded.
#[derive(Debug)]
pub struct SourceImage {
    image: RgbaImage,
}

impl SourceImage {
    /// Decode from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| Error::Decode {
            reason: format!("Failed to decode {}: {}", path.display(), e),
        })?;
        Self::from_dynamic(image)
    }

    /// Decode from an in-memory encoded image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::Decode {
            reason: format!("Failed to decode image bytes: {}", e),
        })?;
        Self::from_dynamic(image)
    }

    /// Decode from a `data:<mime>;base64,<payload>` URI, the form the
    /// capture UI produces.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix("data:").ok_or_else(|| Error::Decode {
            reason: "Not a data URI".to_string(),
        })?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| Error::Decode {
            reason: "Data URI is missing the ',' separator".to_string(),
        })?;
        if !header.ends_with(";base64") {
            return Err(Error::Decode {
                reason: "Only base64 data URIs are supported".to_string(),
            });
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Decode {
                reason: format!("Invalid base64 payload: {}", e),
            })?;
        Self::from_bytes(&bytes)
    }

    /// Decode from either a data URI or a filesystem path.
    pub fn open(source: &str) -> Result<Self> {
        if source.starts_with("data:") {
            Self::from_data_uri(source)
        } else {
            Self::from_path(source)
        }
    }

    fn from_dynamic(image: image::DynamicImage) -> Result<Self> {
        let image = image.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Decode {
                reason: "Image has zero dimensions".to_string(),
            });
        }
        Ok(Self { image })
    }

    /// Native width of the decoded raster.
    pub fn natural_width(&self) -> u32 {
        self.image.width()
    }

    /// Native height of the decoded raster.
    pub fn natural_height(&self) -> u32 {
        self.image.height()
    }

    /// Aspect ratio (width over height).
    pub fn aspect_ratio(&self) -> f32 {
        self.image.width() as f32 / self.image.height() as f32
    }

    /// Access the decoded pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.image
    }
}

/// Read an image file and wrap it as a base64 data URI, sniffing the MIME
/// type from the encoded bytes.
pub fn file_to_data_uri(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::Decode {
        reason: format!("Failed to read {}: {}", path.display(), e),
    })?;
    let format = image::guess_format(&bytes).map_err(|e| Error::Decode {
        reason: format!("Unrecognized image format in {}: {}", path.display(), e),
    })?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    ))
}
