//! # Page Pipeline
//!
//! Source document → labeled, cropped page images, then the stable sort
//! that decides their order in the grid.
//!
//! Rasterization and text extraction are independent passes over the same
//! document. They are paired by position, so both collaborators must
//! enumerate pages in the same ascending page-number order; a length
//! disagreement is reported instead of silently truncated.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};

use crate::config::CropOffsets;
use crate::crop::crop;
use crate::error::GridError;
use crate::extract::TextExtractor;
use crate::label::label_for;
use crate::raster::Rasterizer;

/// One page's cropped image and its sort label.
#[derive(Debug, Clone)]
pub struct LabeledUnit {
    pub image: DynamicImage,
    pub label: String,
    /// 0-based page index in the source document.
    pub source_page: usize,
}

/// Runs rasterization, extraction, cropping and labeling for a document.
pub struct PagePipeline<R, E> {
    rasterizer: R,
    extractor: E,
    crop: CropOffsets,
    max_label_len: usize,
}

impl<R: Rasterizer, E: TextExtractor> PagePipeline<R, E> {
    pub fn new(rasterizer: R, extractor: E, crop: CropOffsets, max_label_len: usize) -> Self {
        Self {
            rasterizer,
            extractor,
            crop,
            max_label_len,
        }
    }

    /// Produce one unit per source page, in source page order.
    ///
    /// Text is extracted before pages are rasterized. Either failure aborts
    /// the run, so the order only decides which error surfaces first, and a
    /// document with no pages never starts the rasterizer.
    pub fn process(&self, path: &Path) -> Result<Vec<LabeledUnit>, GridError> {
        // Extraction parses the document, so an unreadable or invalid input
        // fails here before the rasterizer is started.
        let texts = self.extractor.extract(path)?;
        let images = if texts.is_empty() {
            Vec::new()
        } else {
            self.rasterizer.rasterize(path)?
        };
        info!(pages = images.len(), "source pages loaded");
        label_units(images, texts, self.crop, self.max_label_len)
    }
}

/// Pair page images with page texts by position, crop each image and
/// derive its label.
pub fn label_units(
    images: Vec<DynamicImage>,
    texts: Vec<String>,
    offsets: CropOffsets,
    max_label_len: usize,
) -> Result<Vec<LabeledUnit>, GridError> {
    if images.len() != texts.len() {
        return Err(GridError::PageCountMismatch {
            images: images.len(),
            texts: texts.len(),
        });
    }

    let units = images
        .into_iter()
        .zip(texts)
        .enumerate()
        .map(|(source_page, (image, text))| {
            let label = label_for(&text, max_label_len);
            debug!(page = source_page, label = %label, "labeled page");
            LabeledUnit {
                image: crop(&image, offsets),
                label,
                source_page,
            }
        })
        .collect();
    Ok(units)
}

/// Sort units by label, ascending. The sort is stable: units sharing a
/// label keep their relative input order.
pub fn order(mut units: Vec<LabeledUnit>) -> Vec<LabeledUnit> {
    units.sort_by(|a, b| a.label.cmp(&b.label));
    units
}
