// this_file: src/error.rs
//! Error types for the photopoet library

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for photopoet operations
#[derive(Debug, Error)]
pub enum Error {
    /// Source image could not be decoded into a raster
    #[error("Decode error: {reason}")]
    Decode { reason: String },

    /// Font file loading, parsing, or resolution error
    #[error("Font error: {0}")]
    Font(String),

    /// Font file not found on disk
    #[error("Font not found: {path}")]
    FontNotFound { path: PathBuf },

    /// Text shaping or measurement error
    #[error("Shaping error: {0}")]
    Shaping(String),

    /// Drawing surface could not be allocated or written
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// Raster could not be serialized to an image format
    #[error("Encode error: {0}")]
    Encode(String),

    /// Collection store backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Result type alias for photopoet operations
pub type Result<T> = std::result::Result<T, Error>;
