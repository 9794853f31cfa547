// this_file: src/lib.rs
//! PhotoPoet - A Rust library for compositing poems onto photos
//!
//! This library provides functionality for:
//! - Greedy line wrapping of poem text against a pixel width budget
//! - Anchor-based placement of the caption block on the canvas
//! - Scale-consistent compositing at preview and export resolutions
//! - PNG export with timestamped download filenames
//! - A JSON-file collection store for saved creations

pub mod canvas;
pub mod collection;
pub mod compose;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod logging;
pub mod place;
pub mod poem;
pub mod shaping;
pub mod style;

// Re-export commonly used types
pub use compose::{Compositor, RenderGate, RenderTarget, Viewport};
pub use decode::SourceImage;
pub use error::{Error, Result};
pub use fonts::{FontCatalog, FontLoader};
pub use layout::{wrap, MeasureText, WrappedLine};
pub use style::{Anchor, Rgba, StyleSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
