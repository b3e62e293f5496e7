//! # Text Extraction
//!
//! Source PDF → one text string per page, in page-tree order.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, info};

use crate::error::GridError;

/// Extracts the text of every page of a document.
///
/// Implementations must return pages in ascending page-number order, the
/// same order a [`crate::raster::Rasterizer`] renders them in. A page with
/// no text yields an empty string, not an error.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>, GridError>;
}

/// Text extractor backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>, GridError> {
        let bytes = std::fs::read(path).map_err(|source| GridError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Document::load_mem(&bytes).map_err(|source| GridError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        })?;
        extract_pages(&document)
    }
}

/// Text of each page of an already-loaded document.
pub fn extract_pages(document: &Document) -> Result<Vec<String>, GridError> {
    // BTreeMap keyed by 1-based page number: iteration is page order.
    let pages = document.get_pages();
    info!(pages = pages.len(), "extracting page text");

    let mut texts = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        let text = document
            .extract_text(&[page_number])
            .map_err(|source| GridError::Extract {
                page: page_number,
                source,
            })?;
        debug!(page = page_number, chars = text.chars().count(), "extracted page text");
        texts.push(text);
    }
    Ok(texts)
}
