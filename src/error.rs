//! Structured error types for the grid renderer.
//!
//! Every fatal condition of a run maps to one variant: unreadable or invalid
//! input, collaborator failures (rasterizer, text extraction), invalid
//! configuration, and output-write failures. Degenerate-but-valid inputs
//! (zero pages, zero-area crops, zero rows/columns) are not errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by all public pagegrid API functions.
#[derive(Debug, Error)]
pub enum GridError {
    /// The input path is missing or unreadable.
    #[error("cannot read input '{}': {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    /// The input could be read but is not a valid PDF.
    #[error("'{}' is not a valid PDF document: {source}", path.display())]
    InvalidDocument { path: PathBuf, source: lopdf::Error },

    /// Text extraction failed on a specific page (1-based).
    #[error("text extraction failed on page {page}: {source}")]
    Extract { page: u32, source: lopdf::Error },

    /// The rasterizer ran but did not produce usable pages.
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    /// The rasterizer program could not be started.
    #[error("rasterizer '{0}' not found; install poppler-utils or pass --pdftoppm")]
    RasterizerMissing(String),

    /// A rasterized page could not be decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The rasterizer and the text extractor disagree on the page count,
    /// so pages cannot be paired positionally.
    #[error("page count mismatch: rasterizer produced {images} pages, text extraction produced {texts}")]
    PageCountMismatch { images: usize, texts: usize },

    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The output artifact could not be written.
    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The placement manifest could not be serialized.
    #[error("cannot serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
