// this_file: src/poem.rs

//! Poem source boundary.
//!
//! The compositing core treats poem text purely as an input value; how it
//! was produced (a remote text-generation service, a file, a test fixture)
//! stays behind this trait. A failed generation surfaces as an error with a
//! human-readable message.

use crate::error::Result;

/// Supplies a poem for an image.
pub trait PoemSource {
    /// Generate a poem for the image in `image_data_uri`, optionally in the
    /// language named by `language_hint` (a code like "en" or "es").
    fn poem_for_image(&self, image_data_uri: &str, language_hint: Option<&str>) -> Result<String>;
}

/// Full language name for a hint code; unknown codes pass through, and no
/// hint means English.
pub fn language_name(hint: Option<&str>) -> &str {
    match hint {
        None => "English",
        Some("en") => "English",
        Some("es") => "Spanish",
        Some("fr") => "French",
        Some("de") => "German",
        Some("ja") => "Japanese",
        Some("it") => "Italian",
        Some(other) => other,
    }
}

/// A source that returns a fixed poem; used where a real generator is not
/// wired in (tests, offline CLI runs with `--poem`).
pub struct FixedPoemSource {
    poem: String,
}

impl FixedPoemSource {
    pub fn new(poem: impl Into<String>) -> Self {
        Self { poem: poem.into() }
    }
}

impl PoemSource for FixedPoemSource {
    fn poem_for_image(&self, _image_data_uri: &str, _language_hint: Option<&str>) -> Result<String> {
        Ok(self.poem.clone())
    }
}
